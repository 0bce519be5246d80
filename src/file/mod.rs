//! Byte sources for string tables.
//!
//! A string table reaches the decoder as a flat byte buffer. This module abstracts over where
//! that buffer lives and how it is stored on disk:
//!
//! - [`Backend`] - Trait for bounds-checked access to the raw table bytes
//! - [`Physical`] - Memory-mapped file on disk
//! - [`Memory`] - Owned in-memory buffer
//! - [`text`] - The comma-separated decimal storage convention
//! - [`io`] - Little-endian primitive reads and writes
//!
//! Tables shipped inside application resources are usually stored as text, one decimal byte
//! value per comma-separated token. [`open`] maps the file and, depending on the
//! [`TableEncoding`], either hands the mapping through untouched or decodes the text into an
//! in-memory buffer. Both roads yield the identical byte buffer.
//!
//! # Examples
//!
//! ```rust,no_run
//! use strscope::file::{open, Backend, TableEncoding};
//!
//! let backend = open("resources/string_db.txt", TableEncoding::Auto)?;
//! println!("table holds {} bytes", backend.len());
//! # Ok::<(), strscope::Error>(())
//! ```

pub mod io;
pub mod memory;
pub mod physical;
pub mod text;

use std::path::Path;

use strum::{Display, EnumString};

pub use memory::Memory;
pub use physical::Physical;

use crate::Result;

/// Backend for accessing the raw bytes of a string table.
///
/// Implementations must be thread-safe: a loaded table is shared by every worker of a rewrite
/// run and read concurrently without locking.
pub trait Backend: Send + Sync {
    /// Returns the entire data buffer.
    fn data(&self) -> &[u8];

    /// Returns `len` bytes starting at `offset`.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::OutOfBounds`] if the range does not fit the buffer or
    /// `offset + len` overflows.
    fn data_slice(&self, offset: usize, len: usize) -> Result<&[u8]> {
        offset
            .checked_add(len)
            .and_then(|end| self.data().get(offset..end))
            .ok_or(crate::Error::OutOfBounds)
    }

    /// Returns the total length of the data buffer.
    fn len(&self) -> usize {
        self.data().len()
    }

    /// Returns `true` if the buffer holds no bytes.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// How a string table is stored on disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Display, EnumString)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum TableEncoding {
    /// Comma-separated decimal byte values.
    Text,
    /// The raw table layout.
    Binary,
    /// Pick [`TableEncoding::Text`] when the content only consists of text-encoding characters,
    /// [`TableEncoding::Binary`] otherwise.
    #[default]
    Auto,
}

impl TableEncoding {
    /// Resolves [`TableEncoding::Auto`] against the actual content.
    ///
    /// The other variants are returned unchanged.
    #[must_use]
    pub fn resolve(self, data: &[u8]) -> TableEncoding {
        match self {
            TableEncoding::Auto if text::looks_like_text(data) => TableEncoding::Text,
            TableEncoding::Auto => TableEncoding::Binary,
            explicit => explicit,
        }
    }
}

/// Opens a string table file and returns a backend over its decoded bytes.
///
/// Binary tables stay memory-mapped; text tables are decoded once into a [`Memory`] backend.
///
/// # Errors
///
/// Returns [`crate::Error::FileError`] if the file cannot be opened, [`crate::Error::Empty`] if
/// it holds no bytes, and [`crate::Error::Malformed`] if a text token is not a byte value.
pub fn open(path: impl AsRef<Path>, encoding: TableEncoding) -> Result<Box<dyn Backend>> {
    let physical = Physical::map(path)?;
    if physical.is_empty() {
        return Err(crate::Error::Empty);
    }

    match encoding.resolve(physical.data()) {
        TableEncoding::Text => {
            let bytes = text::decode(physical.data())?;
            Ok(Box::new(Memory::new(bytes)))
        }
        _ => Ok(Box::new(physical)),
    }
}
