//! Call-site rewriting for decompiled code.
//!
//! Obfuscated code reads its string literals through a runtime lookup,
//! `StringIndexer._getString("<index>")`, compiled with the index as an integer literal. This
//! module finds those calls in a method's instruction list, resolves the literal through the
//! [`crate::StringDatabase`] and replaces the argument with a string constant, so the decompiled
//! output shows the text instead of the indirection.
//!
//! # Architecture
//!
//! ```text
//! PluginContext ──► RewriteEngine::new ──► DecompilePass::initialize (loads the table once)
//!                         │
//!                         ▼
//!                  RewriteEngine::run ──► per class: visit_class, then visit_method per method
//!                         │                 (classes in parallel on the rayon pool)
//!                         ▼
//!                  RewriteSummary + EventLog
//! ```
//!
//! # Key Components
//!
//! - [`DecompilePass`] - Visit-style contract shared with the host
//! - [`StringReplacerPass`] - The string lookup rewrite
//! - [`RewriteTarget`] - Which calls are rewritten
//! - [`RewriteEngine`] - Runs passes over a set of classes
//! - [`EventLog`] - Per call-site record of what changed

mod engine;
pub mod events;
mod pass;
mod replacer;
mod target;

pub use engine::{RewriteEngine, RewriteSummary};
pub use events::{DerivedStats, Event, EventBuilder, EventKind, EventLog, Site};
pub use pass::{DecompilePass, PassInfo, RootContext};
pub use replacer::{StringReplacerPass, REGION_MAKER_PASS};
pub use target::{
    RewriteTarget, STRING_INDEXER_DESCRIPTOR, STRING_INDEXER_METHOD, STRING_INDEXER_OWNER,
};
