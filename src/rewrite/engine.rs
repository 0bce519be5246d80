//! Drives registered passes over a set of classes.

use std::{
    fmt,
    sync::{
        atomic::{AtomicBool, AtomicUsize, Ordering},
        Arc,
    },
    time::Instant,
};

use rayon::prelude::*;

use crate::{
    host::ClassNode,
    plugin::PluginContext,
    rewrite::{DecompilePass, DerivedStats, EventLog, RootContext},
    Result,
};

/// Outcome of a [`RewriteEngine::run`].
#[derive(Debug, Clone)]
pub struct RewriteSummary {
    /// Classes whose processing started
    pub classes_visited: usize,
    /// Methods visited by every pass
    pub methods_visited: usize,
    /// Call sites rewritten during this run
    pub strings_replaced: usize,
    /// Counters derived from the events of this run
    pub stats: DerivedStats,
    /// Events recorded since the engine was created
    pub events: Arc<EventLog>,
}

impl fmt::Display for RewriteSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} classes, {} methods: {}",
            self.classes_visited, self.methods_visited, self.stats
        )
    }
}

/// Runs decompilation passes over classes, in parallel or in order.
///
/// Every pass is initialized once when the engine is built. A run then visits each class with
/// every pass ([`DecompilePass::visit_class`]) and afterwards each of its methods
/// ([`DecompilePass::visit_method`]).
///
/// The first fatal error stops the run: no class or method starts after it, and the error is
/// returned as is. Work already finished on other threads is kept; the failing method itself is
/// never partially rewritten.
///
/// # Examples
///
/// ```rust,no_run
/// use strscope::ir::ClassDef;
/// use strscope::plugin::{Plugin, PluginContext, PluginOptions, StringsPlugin};
/// use strscope::rewrite::RewriteEngine;
///
/// let options = PluginOptions::default().with_table_path("resources/string_db.txt");
/// let mut ctx = PluginContext::<ClassDef>::new(options);
/// StringsPlugin.init(&mut ctx)?;
///
/// let engine = RewriteEngine::new(ctx)?;
/// let mut classes: Vec<ClassDef> = Vec::new();
/// let summary = engine.run(&mut classes)?;
/// println!("{summary}");
/// # Ok::<(), strscope::Error>(())
/// ```
pub struct RewriteEngine<C: ClassNode> {
    passes: Vec<Box<dyn DecompilePass<C>>>,
    root: RootContext,
    parallel: bool,
}

impl<C> RewriteEngine<C>
where
    C: ClassNode + Send,
{
    /// Builds an engine from the passes a plugin registered on `ctx`.
    ///
    /// # Errors
    ///
    /// Returns the first error raised by a pass's `initialize`, for example
    /// [`crate::Error::TableUnavailable`] when the string table cannot be loaded.
    pub fn new(ctx: PluginContext<C>) -> Result<Self> {
        let parallel = ctx.options().parallel;
        Self::with_passes(ctx.into_passes(), parallel)
    }

    /// Builds an engine from an explicit pass list.
    ///
    /// # Errors
    ///
    /// See [`RewriteEngine::new`].
    pub fn with_passes(mut passes: Vec<Box<dyn DecompilePass<C>>>, parallel: bool) -> Result<Self> {
        let root = RootContext::new();
        for pass in &mut passes {
            log::debug!("initializing pass {}", pass.name());
            pass.initialize(&root)?;
        }

        Ok(RewriteEngine {
            passes,
            root,
            parallel,
        })
    }

    /// Names of the registered passes, in execution order.
    #[must_use]
    pub fn pass_names(&self) -> Vec<&'static str> {
        self.passes.iter().map(|p| p.name()).collect()
    }

    /// Returns `true` if no pass is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.passes.is_empty()
    }

    /// The event log shared by all passes.
    #[must_use]
    pub fn events(&self) -> &Arc<EventLog> {
        &self.root.events
    }

    /// Whether classes are distributed over the rayon pool.
    #[must_use]
    pub fn is_parallel(&self) -> bool {
        self.parallel
    }

    /// Runs every pass over `classes`.
    ///
    /// A method is all-or-nothing across passes: when a pass fails on it, the method is restored
    /// to its state before the first pass touched it. Events recorded by the earlier passes stay
    /// in the log. The counters and [`RewriteSummary::stats`] only cover this call, so an
    /// engine can be run repeatedly.
    ///
    /// # Errors
    ///
    /// Returns the first fatal pass error, typically [`crate::Error::RewriteFailed`] carrying the
    /// class, the method and the root cause.
    pub fn run(&self, classes: &mut [C]) -> Result<RewriteSummary> {
        let start = Instant::now();
        let mark = self.root.events.len();
        let abort = AtomicBool::new(false);
        let classes_visited = AtomicUsize::new(0);
        let methods_visited = AtomicUsize::new(0);
        let strings_replaced = AtomicUsize::new(0);

        if self.passes.is_empty() {
            log::info!("no passes registered, {} classes left untouched", classes.len());
        } else {
            let process = |class: &mut C| -> Result<()> {
                if abort.load(Ordering::Acquire) {
                    log::warn!("skipping class {} after abort", class.name());
                    return Ok(());
                }
                classes_visited.fetch_add(1, Ordering::Relaxed);

                for pass in &self.passes {
                    pass.visit_class(class);
                }

                let class_name = class.name().to_string();
                for method in class.methods_mut() {
                    if abort.load(Ordering::Acquire) {
                        return Ok(());
                    }
                    // a single pass keeps its own method atomic
                    let snapshot = (self.passes.len() > 1).then(|| method.clone());
                    let mut replaced = 0;
                    for pass in &self.passes {
                        match pass.visit_method(&class_name, method) {
                            Ok(count) => replaced += count,
                            Err(error) => {
                                if let Some(snapshot) = snapshot {
                                    *method = snapshot;
                                }
                                abort.store(true, Ordering::Release);
                                return Err(error);
                            }
                        }
                    }
                    strings_replaced.fetch_add(replaced, Ordering::Relaxed);
                    methods_visited.fetch_add(1, Ordering::Relaxed);
                }
                Ok(())
            };

            let outcome = if self.parallel {
                classes.par_iter_mut().try_for_each(process)
            } else {
                classes.iter_mut().try_for_each(process)
            };

            if let Err(error) = outcome {
                log::error!("rewrite aborted: {}", error);
                return Err(error);
            }
        }

        let summary = RewriteSummary {
            classes_visited: classes_visited.into_inner(),
            methods_visited: methods_visited.into_inner(),
            strings_replaced: strings_replaced.into_inner(),
            stats: DerivedStats::from_events(self.root.events.since(mark))
                .with_time(start.elapsed()),
            events: Arc::clone(&self.root.events),
        };
        log::info!("rewrite finished: {}", summary);
        Ok(summary)
    }
}

impl<C: ClassNode> fmt::Debug for RewriteEngine<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = self.passes.iter().map(|p| p.name()).collect();
        f.debug_struct("RewriteEngine")
            .field("passes", &names)
            .field("parallel", &self.parallel)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;
    use crate::{
        host::{InvokeKind, MethodNode},
        ir::{ClassDef, Insn, InsnArg, InsnOp, MethodDef},
        rewrite::{EventKind, PassInfo, RewriteTarget, StringReplacerPass},
        Error, SharedDatabase, StringDatabase, StringTableBuilder,
    };

    fn replacer(strings: &[&str]) -> Box<dyn DecompilePass<ClassDef>> {
        let mut builder = StringTableBuilder::new();
        for s in strings {
            builder.push(s).unwrap();
        }
        let db = StringDatabase::from_mem(builder.build().unwrap()).unwrap();
        Box::new(StringReplacerPass::new(Arc::new(
            SharedDatabase::from_database(db),
        )))
    }

    fn lookup(index: i64) -> Insn {
        Insn::invoke(
            InvokeKind::Static,
            RewriteTarget::default().signature,
            vec![InsnArg::Literal(index)],
        )
    }

    fn class(name: &str, indices: &[i64]) -> ClassDef {
        let mut method = MethodDef::new("run");
        for &index in indices {
            method = method.with_insn(lookup(index));
        }
        ClassDef::new(name).with_method(method.with_insn(Insn::new(InsnOp::Return, vec![])))
    }

    #[test]
    fn sequential_run_rewrites_all_classes() {
        let engine = RewriteEngine::with_passes(vec![replacer(&["a", "b", "c"])], false).unwrap();
        let mut classes = vec![class("x.A", &[1, 2]), class("x.B", &[3])];

        let summary = engine.run(&mut classes).unwrap();
        assert_eq!(summary.classes_visited, 2);
        assert_eq!(summary.methods_visited, 2);
        assert_eq!(summary.strings_replaced, 3);
        assert_eq!(summary.stats.strings_replaced, 3);
        assert_eq!(summary.stats.classes_annotated, 2);

        let run = classes[0].method("run").unwrap();
        assert_eq!(run.instructions[0].args[0].as_const_string(), Some("a"));
        assert_eq!(run.instructions[1].args[0].as_const_string(), Some("b"));
        assert_eq!(classes[1].comments.len(), 1);
    }

    #[test]
    fn parallel_run_matches_sequential() {
        let strings: Vec<String> = (0..50).map(|i| format!("s{i}")).collect();
        let refs: Vec<&str> = strings.iter().map(String::as_str).collect();

        let make = || -> Vec<ClassDef> {
            (0..50)
                .map(|i| class(&format!("p.C{i}"), &[i + 1, 50 - i]))
                .collect()
        };

        let mut sequential = make();
        RewriteEngine::with_passes(vec![replacer(&refs)], false)
            .unwrap()
            .run(&mut sequential)
            .unwrap();

        let mut parallel = make();
        let summary = RewriteEngine::with_passes(vec![replacer(&refs)], true)
            .unwrap()
            .run(&mut parallel)
            .unwrap();

        assert_eq!(summary.strings_replaced, 100);
        assert_eq!(sequential, parallel);
    }

    #[test]
    fn failure_aborts_sequential_run() {
        let engine = RewriteEngine::with_passes(vec![replacer(&["a"])], false).unwrap();
        let mut classes = vec![class("x.A", &[1]), class("x.B", &[1, 7]), class("x.C", &[1])];
        let untouched_b = classes[1].clone();
        let untouched_c = classes[2].clone();

        let err = engine.run(&mut classes).unwrap_err();
        match &err {
            Error::RewriteFailed { class, method, .. } => {
                assert_eq!(class, "x.B");
                assert_eq!(method, "run");
            }
            other => panic!("Expected RewriteFailed, got {other:?}"),
        }
        assert!(matches!(
            err.root_cause(),
            Error::IndexOutOfRange { index: 7, count: 1 }
        ));

        assert_eq!(
            classes[0].methods[0].instructions[0].args[0].as_const_string(),
            Some("a")
        );
        assert_eq!(classes[1].methods, untouched_b.methods);
        assert_eq!(classes[2], untouched_c);
    }

    #[test]
    fn failure_aborts_parallel_run() {
        let engine = RewriteEngine::with_passes(vec![replacer(&["a"])], true).unwrap();
        let mut classes: Vec<ClassDef> = (0..20).map(|i| class(&format!("x.C{i}"), &[1])).collect();
        classes[10] = class("x.Bad", &[1, 0]);
        let bad_before = classes[10].methods.clone();

        let err = engine.run(&mut classes).unwrap_err();
        assert!(matches!(err.root_cause(), Error::IndexOutOfRange { index: 0, .. }));
        assert_eq!(classes[10].methods, bad_before);

        for class in &classes {
            for method in &class.methods {
                for insn in method.instructions() {
                    if let Some(arg) = insn.args.first() {
                        assert!(
                            matches!(arg, InsnArg::Literal(_)) || arg.as_const_string() == Some("a")
                        );
                    }
                }
            }
        }
    }

    struct Recorder {
        order: Arc<Mutex<Vec<String>>>,
    }

    impl DecompilePass<ClassDef> for Recorder {
        fn info(&self) -> PassInfo {
            PassInfo::new("Recorder", "records visit order")
        }

        fn visit_class(&self, class: &mut ClassDef) -> bool {
            self.order.lock().unwrap().push(format!("class {}", class.name));
            true
        }

        fn visit_method(&self, class_name: &str, method: &mut MethodDef) -> Result<usize> {
            self.order
                .lock()
                .unwrap()
                .push(format!("method {}::{}", class_name, method.name()));
            Ok(0)
        }
    }

    #[test]
    fn class_visited_before_its_methods() {
        let order = Arc::new(Mutex::new(Vec::new()));
        let pass = Box::new(Recorder {
            order: Arc::clone(&order),
        });
        let engine = RewriteEngine::with_passes(vec![pass], false).unwrap();
        assert_eq!(engine.pass_names(), vec!["Recorder"]);

        let mut classes = vec![ClassDef::new("x.A")
            .with_method(MethodDef::new("one"))
            .with_method(MethodDef::new("two"))];
        engine.run(&mut classes).unwrap();

        assert_eq!(
            *order.lock().unwrap(),
            vec!["class x.A", "method x.A::one", "method x.A::two"]
        );
    }

    #[test]
    fn repeated_runs_report_their_own_counts() {
        let engine = RewriteEngine::with_passes(vec![replacer(&["a"])], false).unwrap();

        let mut first = vec![class("x.A", &[1])];
        let summary = engine.run(&mut first).unwrap();
        assert_eq!(summary.strings_replaced, 1);
        assert_eq!(summary.stats.strings_replaced, 1);

        let mut second = vec![class("x.B", &[1])];
        let summary = engine.run(&mut second).unwrap();
        assert_eq!(summary.strings_replaced, 1);
        assert_eq!(summary.stats.strings_replaced, 1);
        assert_eq!(summary.stats.classes_annotated, 1);
        assert_eq!(summary.stats.methods_transformed, 1);
        assert!(summary.to_string().starts_with("1 classes, 1 methods: 1 string replaced"));

        // the shared log keeps both runs
        assert_eq!(engine.events().count(EventKind::StringReplaced), 2);
    }

    struct Refuse;

    impl DecompilePass<ClassDef> for Refuse {
        fn info(&self) -> PassInfo {
            PassInfo::new("Refuse", "fails on every method")
        }

        fn visit_class(&self, _class: &mut ClassDef) -> bool {
            false
        }

        fn visit_method(&self, _class_name: &str, method: &mut MethodDef) -> Result<usize> {
            Err(Error::Error(format!("refusing {}", method.name())))
        }
    }

    #[test]
    fn later_pass_failure_restores_method() {
        let engine =
            RewriteEngine::with_passes(vec![replacer(&["a"]), Box::new(Refuse)], false).unwrap();
        let mut classes = vec![class("x.A", &[1])];
        let before = classes[0].methods.clone();

        let err = engine.run(&mut classes).unwrap_err();
        assert!(matches!(err, Error::Error(_)));
        assert_eq!(classes[0].methods, before);
        assert_eq!(classes[0].methods[0].instructions[0], lookup(1));
    }

    #[test]
    fn empty_engine_is_noop() {
        let engine: RewriteEngine<ClassDef> = RewriteEngine::with_passes(Vec::new(), true).unwrap();
        assert!(engine.is_empty());

        let mut classes = vec![class("x.A", &[1])];
        let snapshot = classes.clone();
        let summary = engine.run(&mut classes).unwrap();
        assert_eq!(summary.classes_visited, 0);
        assert_eq!(classes, snapshot);
    }
}
