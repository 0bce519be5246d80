// Copyright 2025 Johann Kempter
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
//
// SPDX-License-Identifier: Apache-2.0

#![doc(html_no_source)]
#![deny(missing_docs)]
//#![deny(unsafe_code)]
// - 'file/physical.rs' uses mmap to map a file into memory

//! # strscope
//!
//! Recovers string literals hidden behind an indexed string table.
//!
//! Some obfuscators strip every string literal out of an application, store them in a resource
//! table, and replace each literal with a runtime lookup such as
//! `StringIndexer._getString("42")`. Decompiled output then shows nothing but indices.
//! `strscope` decodes that table and rewrites the lookups in a decompiler's instruction stream,
//! so the output shows `"Hello"` again.
//!
//! ## Features
//!
//! - **Table decoding** - Bounds-checked, zero-copy resolution of 1-based indices to UTF-8 strings
//! - **Text and binary tables** - Comma-separated decimal resource files or the raw layout, memory-mapped
//! - **Load once** - [`SharedDatabase`] loads the table exactly once, even under concurrent first access
//! - **Call-site rewriting** - [`rewrite::StringReplacerPass`] swaps literal lookup arguments for string constants
//! - **Host agnostic** - Works on any decompiler node model through the traits in [`host`]
//! - **Parallel** - [`rewrite::RewriteEngine`] processes classes on the rayon pool
//!
//! ## Quick Start
//!
//! ```rust
//! use strscope::prelude::*;
//!
//! // A table holding "Hello" (#1) and "World" (#2)
//! let mut table = vec![16, 0, 0, 0, 0, 0, 0, 0, 6, 0, 0, 0, 5, 0, 0, 0, 6, 0, 0, 0];
//! table.extend_from_slice(b"HelloWorld");
//!
//! let db = StringDatabase::from_mem(table)?;
//! assert_eq!(db.resolve(1)?, "Hello");
//! assert_eq!(db.resolve_key("2")?, "World");
//! # Ok::<(), strscope::Error>(())
//! ```
//!
//! ### Rewriting Decompiled Code
//!
//! ```rust
//! use std::sync::Arc;
//! use strscope::prelude::*;
//!
//! let mut builder = StringTableBuilder::new();
//! builder.push("Hello")?;
//! let db = Arc::new(SharedDatabase::from_database(StringDatabase::from_mem(builder.build()?)?));
//!
//! let mut ctx = PluginContext::<ClassDef>::new(PluginOptions::default()).with_database(db);
//! StringsPlugin.init(&mut ctx)?;
//! let engine = RewriteEngine::new(ctx)?;
//!
//! let mut classes = vec![ClassDef::new("com.example.Main").with_method(
//!     MethodDef::new("greet").with_insn(Insn::invoke(
//!         InvokeKind::Static,
//!         RewriteTarget::default().signature,
//!         vec![InsnArg::Literal(1)],
//!     )),
//! )];
//!
//! let summary = engine.run(&mut classes)?;
//! assert_eq!(summary.strings_replaced, 1);
//! assert_eq!(
//!     classes[0].methods[0].instructions[0].args[0].as_const_string(),
//!     Some("Hello")
//! );
//! # Ok::<(), strscope::Error>(())
//! ```
//!
//! ## Architecture
//!
//! - [`stringdb`] - Table layout, decoding, building and the load-once handle
//! - [`file`] - Byte sources: memory-mapped files, owned buffers, the text encoding
//! - [`host`] - Traits a decompiler implements for its class, method and instruction nodes
//! - [`ir`] - A simple owned node model implementing those traits
//! - [`rewrite`] - The replacer pass, the engine running it, and the event log
//! - [`plugin`] - Plugin metadata, options and registration
//! - [`Error`] and [`Result`] - Error handling
//!
//! ## Table Format
//!
//! ```text
//! [0, 4)                 index size (u32 LE) = 8 × entry count
//! [4, 4 + index size)    entries: (offset u32 LE, length u32 LE), 1-indexed
//! [4 + index size, end)  UTF-8 payload; offset is relative to its start, length is bytes + 1
//! ```
//!
//! ## Error Handling
//!
//! All operations return [`Result<T, Error>`](Result). Every failure is fatal for the run it
//! happens in; the root cause is always reachable:
//!
//! ```rust
//! use strscope::{Error, StringDatabase};
//!
//! match StringDatabase::from_mem(vec![0xFF, 0, 0, 0]) {
//!     Ok(_) => println!("loaded"),
//!     Err(Error::Malformed { message, .. }) => println!("malformed table: {}", message),
//!     Err(e) => println!("other error: {}", e),
//! }
//! ```
//!
//! ## Development and Testing
//!
//! ### Fuzzing
//!
//! ```bash
//! cargo install cargo-fuzz
//! cargo +nightly fuzz run stringdb --release
//! ```
//!
//! ### Testing
//!
//! ```bash
//! cargo test
//! cargo bench
//! ```

#[macro_use]
pub(crate) mod error;

pub mod file;
pub mod host;
pub mod ir;
pub mod plugin;
pub mod prelude;
pub mod rewrite;
pub mod stringdb;

/// `strscope` Result type
///
/// A type alias for `std::result::Result<T, Error>` where the error type is always [`Error`].
///
/// # Examples
///
/// ```rust
/// use strscope::{Result, StringDatabase};
///
/// fn first_string(table: Vec<u8>) -> Result<String> {
///     StringDatabase::from_mem(table)?.resolve(1)
/// }
/// ```
pub type Result<T> = std::result::Result<T, Error>;

/// `strscope` Error type
///
/// The main error type for all operations in this crate. See [`Error`] for the categories.
pub use error::Error;

/// Main entry point for decoding string tables
///
/// See [`stringdb`] for the layout.
pub use stringdb::StringDatabase;

/// Load-once, thread-safe handle to a [`StringDatabase`]
pub use stringdb::SharedDatabase;

/// Assembles string tables
pub use stringdb::StringTableBuilder;
