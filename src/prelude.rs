//! # strscope Prelude
//!
//! Re-exports the types needed to decode a string table and rewrite decompiled code with it.
//!
//! ```rust
//! use strscope::prelude::*;
//!
//! let db = StringDatabase::from_mem(vec![0, 0, 0, 0])?;
//! assert!(db.is_empty());
//! # Ok::<(), strscope::Error>(())
//! ```

// ================================================================================================
// Core Types and Error Handling
// ================================================================================================

/// The main error type for all strscope operations
pub use crate::Error;

/// The result type used throughout strscope
pub use crate::Result;

// ================================================================================================
// String Tables
// ================================================================================================

/// Table decoding and building
pub use crate::stringdb::{SharedDatabase, StringDatabase, StringTableBuilder, TableEntry};

/// Table storage forms
pub use crate::file::TableEncoding;

// ================================================================================================
// Host Contract and Reference Model
// ================================================================================================

/// Traits a decompiler implements for its nodes
pub use crate::host::{ClassNode, CommentStyle, InsnNode, InvokeKind, MethodNode, MethodSignature};

/// Owned node model implementing the host traits
pub use crate::ir::{ClassDef, Insn, InsnArg, InsnOp, MethodDef};

// ================================================================================================
// Rewriting
// ================================================================================================

/// Passes, engine and events
pub use crate::rewrite::{
    DecompilePass, EventKind, EventLog, RewriteEngine, RewriteSummary, RewriteTarget,
    RootContext, StringReplacerPass,
};

// ================================================================================================
// Plugin
// ================================================================================================

/// Plugin registration and options
pub use crate::plugin::{Plugin, PluginContext, PluginOptions, StringsPlugin};
