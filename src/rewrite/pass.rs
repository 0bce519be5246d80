//! Pass trait and shared run context.

use std::sync::Arc;

use crate::{host::ClassNode, rewrite::EventLog, Result};

/// Metadata a pass reports to the host scheduler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PassInfo {
    /// Unique pass name
    pub name: &'static str,
    /// One-line description
    pub description: &'static str,
    /// Host passes this pass must run before
    pub run_before: Vec<&'static str>,
    /// Host passes this pass must run after
    pub run_after: Vec<&'static str>,
}

impl PassInfo {
    /// Creates pass metadata without ordering constraints.
    #[must_use]
    pub fn new(name: &'static str, description: &'static str) -> Self {
        PassInfo {
            name,
            description,
            run_before: Vec::new(),
            run_after: Vec::new(),
        }
    }

    /// Requires this pass to run before `pass`.
    #[must_use]
    pub fn before(mut self, pass: &'static str) -> Self {
        self.run_before.push(pass);
        self
    }

    /// Requires this pass to run after `pass`.
    #[must_use]
    pub fn after(mut self, pass: &'static str) -> Self {
        self.run_after.push(pass);
        self
    }
}

/// State shared by all passes of a run.
#[derive(Debug, Clone, Default)]
pub struct RootContext {
    /// Event log every pass records into
    pub events: Arc<EventLog>,
}

impl RootContext {
    /// Creates a context with an empty event log.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

/// A decompilation pass visiting the host's classes and methods.
///
/// Passes must be thread-safe (`Send + Sync`): the host may visit many classes concurrently
/// through a shared reference. All mutation happens on the node handed to the visit call.
///
/// # Lifecycle
///
/// 1. [`initialize`](DecompilePass::initialize) is called once, before any visit
/// 2. [`visit_class`](DecompilePass::visit_class) is called for each class
/// 3. [`visit_method`](DecompilePass::visit_method) is called for each method of the class
///
/// Visiting before initialization fails with [`crate::Error::PassNotInitialized`]. A visit error
/// is fatal for the whole run.
pub trait DecompilePass<C: ClassNode>: Send + Sync {
    /// Name, description and ordering constraints.
    fn info(&self) -> PassInfo;

    /// Unique name for logging and debugging.
    fn name(&self) -> &'static str {
        self.info().name
    }

    /// Called once before any visit.
    ///
    /// # Errors
    ///
    /// Returns an error if the pass cannot run at all.
    fn initialize(&mut self, _root: &RootContext) -> Result<()> {
        Ok(())
    }

    /// Visits a class. Returns `true` if the host should descend into the class through this
    /// callback; method visits happen regardless.
    fn visit_class(&self, class: &mut C) -> bool;

    /// Visits one method of `class_name` and returns the number of instructions rewritten.
    ///
    /// # Errors
    ///
    /// Returns an error if the method cannot be processed. The run must stop.
    fn visit_method(&self, class_name: &str, method: &mut C::Method) -> Result<usize>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pass_info_ordering() {
        let info = PassInfo::new("A", "does a")
            .before("RegionMakerVisitor")
            .after("SSATransform");
        assert_eq!(info.run_before, vec!["RegionMakerVisitor"]);
        assert_eq!(info.run_after, vec!["SSATransform"]);
    }

    #[test]
    fn root_context_clones_share_log() {
        let root = RootContext::new();
        let other = root.clone();
        other.events.info("hello");
        assert_eq!(root.events.len(), 1);
    }
}
