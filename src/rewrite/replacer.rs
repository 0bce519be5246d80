use std::sync::Arc;

use crate::{
    host::{ClassNode, CommentStyle, InsnNode, MethodNode},
    plugin::{PLUGIN_ID, PLUGIN_NAME},
    rewrite::{
        events::truncate_string, DecompilePass, EventKind, EventLog, PassInfo, RewriteTarget,
        RootContext,
    },
    Error, Result, SharedDatabase, StringDatabase,
};

const PASS_NAME: &str = "StringReplacePass";
const PASS_DESCRIPTION: &str = "Replace StringIndexer._getString calls with actual strings";

/// Host pass that must see the rewritten constants before control flow is structured.
pub const REGION_MAKER_PASS: &str = "RegionMakerVisitor";

struct Ready {
    db: Arc<StringDatabase>,
    comment: String,
    events: Arc<EventLog>,
}

/// Replaces `StringIndexer._getString(<literal>)` arguments with the decoded strings.
///
/// For every instruction that is a static call to the [`RewriteTarget`] and whose index argument
/// is a literal integer, the literal is resolved through the string table and the argument is
/// swapped for a string constant. Everything else is left alone. Each visited class receives a
/// marker comment.
///
/// A method is scanned completely before it is modified. Every rewrite is first applied to a
/// copy of its instruction; only when all call sites resolved and all copies were rewritten are
/// they written back and recorded. On failure the method is returned untouched together with
/// the error.
///
/// # Examples
///
/// ```rust
/// use std::sync::Arc;
/// use strscope::host::InvokeKind;
/// use strscope::ir::{ClassDef, Insn, InsnArg, MethodDef};
/// use strscope::rewrite::{DecompilePass, RewriteTarget, RootContext, StringReplacerPass};
/// use strscope::{SharedDatabase, StringDatabase, StringTableBuilder};
///
/// let mut builder = StringTableBuilder::new();
/// builder.push("Hello")?;
/// let db = SharedDatabase::from_database(StringDatabase::from_mem(builder.build()?)?);
///
/// let mut pass = StringReplacerPass::new(Arc::new(db));
/// DecompilePass::<ClassDef>::initialize(&mut pass, &RootContext::new())?;
///
/// let target = RewriteTarget::default();
/// let mut method = MethodDef::new("greet").with_insn(Insn::invoke(
///     InvokeKind::Static,
///     target.signature.clone(),
///     vec![InsnArg::Literal(1)],
/// ));
///
/// let replaced = DecompilePass::<ClassDef>::visit_method(&pass, "com.example.Main", &mut method)?;
/// assert_eq!(replaced, 1);
/// assert_eq!(method.instructions[0].args[0].as_const_string(), Some("Hello"));
/// # Ok::<(), strscope::Error>(())
/// ```
pub struct StringReplacerPass {
    source: Arc<SharedDatabase>,
    target: RewriteTarget,
    ready: Option<Ready>,
}

impl StringReplacerPass {
    /// Creates a pass for the default `StringIndexer` target.
    #[must_use]
    pub fn new(source: Arc<SharedDatabase>) -> Self {
        StringReplacerPass {
            source,
            target: RewriteTarget::default(),
            ready: None,
        }
    }

    /// Replaces the call sites this pass rewrites.
    #[must_use]
    pub fn with_target(mut self, target: RewriteTarget) -> Self {
        self.target = target;
        self
    }

    /// The call sites this pass rewrites.
    #[must_use]
    pub fn target(&self) -> &RewriteTarget {
        &self.target
    }

    /// Text of the comment attached to every visited class.
    #[must_use]
    pub fn marker_comment() -> String {
        format!("String replaced by {PLUGIN_NAME} ({PLUGIN_ID})")
    }

    /// Returns `true` once [`DecompilePass::initialize`] succeeded.
    #[must_use]
    pub fn is_initialized(&self) -> bool {
        self.ready.is_some()
    }

    fn ready(&self) -> Result<&Ready> {
        self.ready
            .as_ref()
            .ok_or(Error::PassNotInitialized(PASS_NAME))
    }

    fn rewrite<M: MethodNode>(
        &self,
        ready: &Ready,
        class_name: &str,
        method: &mut M,
    ) -> Result<usize> {
        let method_name = method.name().to_string();
        let arg_index = self.target.arg_index;

        let mut replacements = Vec::new();
        for (position, insn) in method.instructions().iter().enumerate() {
            if !self.target.matches(insn) {
                continue;
            }

            let Some(literal) = insn.literal_arg(arg_index) else {
                ready
                    .events
                    .record(EventKind::CallSkipped)
                    .at(class_name, method_name.as_str(), position)
                    .pass(PASS_NAME)
                    .message("index argument is not a literal");
                continue;
            };

            let value = ready.db.resolve_key(&literal.to_string())?;
            replacements.push((position, literal, value));
        }

        let mut staged = Vec::with_capacity(replacements.len());
        for (position, literal, value) in replacements {
            let Some(original) = method.instructions().get(position) else {
                return Err(Error::OutOfBounds);
            };
            let message = format!("#{literal} -> {:?}", truncate_string(&value, 64));
            let mut insn = original.clone();
            insn.replace_arg_with_string(arg_index, value)?;
            staged.push((position, insn, message));
        }

        let count = staged.len();
        let instructions = method.instructions_mut();
        if staged.iter().any(|(position, ..)| *position >= instructions.len()) {
            return Err(Error::OutOfBounds);
        }
        for (position, insn, message) in staged {
            instructions[position] = insn;
            log::debug!("{}::{}@{}: {}", class_name, method_name, position, message);
            ready
                .events
                .record(EventKind::StringReplaced)
                .at(class_name, method_name.as_str(), position)
                .pass(PASS_NAME)
                .message(message);
        }

        Ok(count)
    }
}

impl<C: ClassNode> DecompilePass<C> for StringReplacerPass {
    fn info(&self) -> PassInfo {
        PassInfo::new(PASS_NAME, PASS_DESCRIPTION).before(REGION_MAKER_PASS)
    }

    fn name(&self) -> &'static str {
        PASS_NAME
    }

    fn initialize(&mut self, root: &RootContext) -> Result<()> {
        let db = self.source.get()?;
        log::info!(
            "{} ready: {} strings from {}, target {}",
            PASS_NAME,
            db.entry_count(),
            self.source.source(),
            self.target
        );

        root.events
            .record(EventKind::PassInitialized)
            .pass(PASS_NAME)
            .message(format!("{} strings available", db.entry_count()));

        self.ready = Some(Ready {
            db,
            comment: Self::marker_comment(),
            events: Arc::clone(&root.events),
        });
        Ok(())
    }

    fn visit_class(&self, class: &mut C) -> bool {
        let Some(ready) = &self.ready else {
            log::warn!(
                "{} not initialized, class {} left without marker",
                PASS_NAME,
                class.name()
            );
            return false;
        };

        class.add_code_comment(&ready.comment, CommentStyle::Block);
        ready
            .events
            .record(EventKind::ClassAnnotated)
            .class(class.name())
            .pass(PASS_NAME);
        false
    }

    fn visit_method(&self, class_name: &str, method: &mut C::Method) -> Result<usize> {
        let ready = self.ready()?;
        match self.rewrite(ready, class_name, method) {
            Ok(count) => Ok(count),
            Err(source) => {
                let method_name = method.name().to_string();
                log::error!(
                    "{} failed in {}::{}: {}",
                    PASS_NAME,
                    class_name,
                    method_name,
                    source
                );
                ready
                    .events
                    .error(format!("{class_name}::{method_name}: {source}"));
                Err(Error::RewriteFailed {
                    class: class_name.to_string(),
                    method: method_name,
                    source: Box::new(source),
                })
            }
        }
    }
}
