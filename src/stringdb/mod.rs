//! Indexed string table decoding.
//!
//! Obfuscated applications move their string literals into a resource table and replace every
//! literal with a call such as `StringIndexer._getString("42")`. The table is a flat byte buffer
//! with three regions:
//!
//! ```text
//! ┌──────────────┬──────────────────────────────────────┬─────────────────────────┐
//! │ index_size   │ index: (offset u32, length u32) × N  │ payload: UTF-8 bytes    │
//! │ u32 LE       │ 1-indexed, 8 bytes each              │ offsets relative to     │
//! │ = 8 × N      │ length = true length + 1             │ payload start           │
//! └──────────────┴──────────────────────────────────────┴─────────────────────────┘
//!  [0, 4)         [4, 4 + index_size)                    [4 + index_size, end)
//! ```
//!
//! [`StringDatabase`] validates the header once at load time and decodes individual entries on
//! demand. It never caches resolutions: a lookup is two little-endian reads and a UTF-8 check.
//!
//! # Key Components
//!
//! - [`StringDatabase`] - The decoder
//! - [`TableEntry`] - A single index record
//! - [`SharedDatabase`] - Thread-safe, load-once handle used by the rewrite pass
//! - [`StringTableBuilder`] - Assembles valid tables from a list of strings
//!
//! # Examples
//!
//! ```rust
//! use strscope::StringDatabase;
//!
//! let mut table = vec![16, 0, 0, 0, 0, 0, 0, 0, 6, 0, 0, 0, 5, 0, 0, 0, 6, 0, 0, 0];
//! table.extend_from_slice(b"HelloWorld");
//!
//! let db = StringDatabase::from_mem(table)?;
//! assert_eq!(db.entry_count(), 2);
//! assert_eq!(db.resolve(1)?, "Hello");
//! assert_eq!(db.resolve_key("2")?, "World");
//! # Ok::<(), strscope::Error>(())
//! ```

mod builder;
mod entry;
mod shared;

use std::{fmt, path::Path};

pub use builder::StringTableBuilder;
pub use entry::{TableEntry, ENTRY_SIZE, HEADER_SIZE};
pub use shared::SharedDatabase;

use crate::{
    file::{self, io::read_le_at, Backend, Memory, TableEncoding},
    Error, Result,
};

/// Decoder for an indexed string table.
///
/// The underlying buffer is immutable after construction, so a `StringDatabase` can be shared
/// between threads (usually through [`SharedDatabase`]) and resolved concurrently without locking.
pub struct StringDatabase {
    data: Box<dyn Backend>,
    index_size: u32,
    entry_count: u32,
}

impl StringDatabase {
    /// Loads a table from any byte backend.
    ///
    /// Reads the index size header and checks that the declared index region fits in the buffer.
    /// Individual entries are validated lazily by [`StringDatabase::resolve`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::Malformed`] if the buffer, including an empty one, is too short for the
    /// header or for the declared index region.
    pub fn load(data: Box<dyn Backend>) -> Result<StringDatabase> {
        let len = data.len();
        let mut offset = 0;
        let index_size: u32 = read_le_at(data.data(), &mut offset).map_err(|_| {
            malformed_error!("Buffer of {} bytes is too short for the index header", len)
        })?;

        let fits = HEADER_SIZE
            .checked_add(index_size as usize)
            .is_some_and(|payload_start| payload_start <= len);
        if !fits {
            return Err(malformed_error!(
                "Declared index size {} exceeds buffer of {} bytes",
                index_size,
                len
            ));
        }

        let entry_count = index_size / ENTRY_SIZE as u32;
        log::debug!(
            "loaded string table: {} entries, {} payload bytes",
            entry_count,
            len - HEADER_SIZE - index_size as usize
        );

        Ok(StringDatabase {
            data,
            index_size,
            entry_count,
        })
    }

    /// Loads a table from an owned binary buffer.
    ///
    /// # Errors
    ///
    /// See [`StringDatabase::load`].
    pub fn from_mem(data: Vec<u8>) -> Result<StringDatabase> {
        Self::load(Box::new(Memory::new(data)))
    }

    /// Loads a table from its comma-separated decimal text form.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Malformed`] for invalid tokens, otherwise see [`StringDatabase::load`].
    pub fn from_text(text: &str) -> Result<StringDatabase> {
        Self::from_text_bytes(text.as_bytes())
    }

    /// Loads a table from raw bytes holding the comma-separated decimal text form.
    ///
    /// # Errors
    ///
    /// See [`StringDatabase::from_text`].
    pub fn from_text_bytes(text: &[u8]) -> Result<StringDatabase> {
        Self::from_mem(file::text::decode(text)?)
    }

    /// Loads a table file, detecting whether it is stored as text or binary.
    ///
    /// # Errors
    ///
    /// Returns [`Error::FileError`] if the file cannot be read, otherwise see
    /// [`StringDatabase::from_path_with_encoding`].
    pub fn from_file(path: impl AsRef<Path>) -> Result<StringDatabase> {
        Self::from_path_with_encoding(path, TableEncoding::Auto)
    }

    /// Loads a table file stored in the given encoding.
    ///
    /// # Errors
    ///
    /// Returns [`Error::FileError`] if the file cannot be read, [`Error::Empty`] if it is empty,
    /// and [`Error::Malformed`] if it cannot be decoded.
    pub fn from_path_with_encoding(
        path: impl AsRef<Path>,
        encoding: TableEncoding,
    ) -> Result<StringDatabase> {
        Self::load(file::open(path, encoding)?)
    }

    /// Resolves a 1-based index to its string.
    ///
    /// # Errors
    ///
    /// - [`Error::IndexOutOfRange`] if `index` is `0` or greater than [`Self::entry_count`]
    /// - [`Error::Malformed`] if the entry stores a zero length or its range exceeds the buffer
    /// - [`Error::InvalidEncoding`] if the bytes are not valid UTF-8
    pub fn resolve(&self, index: u32) -> Result<String> {
        let entry = self.entry(index)?;
        let range = entry.byte_range(self.payload_start())?;

        let bytes = self
            .data
            .data_slice(range.start, range.len())
            .map_err(|_| {
                malformed_error!(
                    "Entry {} range {}..{} exceeds buffer of {} bytes",
                    index,
                    range.start,
                    range.end,
                    self.data.len()
                )
            })?;

        std::str::from_utf8(bytes)
            .map(str::to_owned)
            .map_err(|source| Error::InvalidEncoding { index, source })
    }

    /// Resolves a textual key to its string.
    ///
    /// The key is the canonical base-10 form of the index, as passed to the obfuscated runtime
    /// lookup. Surrounding whitespace is ignored.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidKey`] if the key is not an integer and [`Error::IndexOutOfRange`] if
    /// it is outside `1..=entry_count` (negative keys included). Otherwise see [`Self::resolve`].
    pub fn resolve_key(&self, key: &str) -> Result<String> {
        let Ok(value) = key.trim().parse::<i64>() else {
            return Err(Error::InvalidKey(key.to_string()));
        };

        match u32::try_from(value) {
            Ok(index) => self.resolve(index),
            Err(_) => Err(Error::IndexOutOfRange {
                index: value,
                count: self.entry_count,
            }),
        }
    }

    /// Reads the index record for a 1-based index.
    ///
    /// # Errors
    ///
    /// Returns [`Error::IndexOutOfRange`] if `index` is `0` or greater than
    /// [`Self::entry_count`].
    pub fn entry(&self, index: u32) -> Result<TableEntry> {
        if index == 0 || index > self.entry_count {
            return Err(Error::IndexOutOfRange {
                index: i64::from(index),
                count: self.entry_count,
            });
        }

        let mut offset = TableEntry::position(index);
        let data = self.data.data();
        let payload_offset = read_le_at::<u32>(data, &mut offset)?;
        let length = read_le_at::<u32>(data, &mut offset)?;

        Ok(TableEntry {
            index,
            offset: payload_offset,
            length,
        })
    }

    /// Iterates over all index records in order.
    pub fn entries(&self) -> impl Iterator<Item = Result<TableEntry>> + '_ {
        (1..=self.entry_count).map(move |index| self.entry(index))
    }

    /// Number of entries in the index region (`index_size / 8`).
    ///
    /// A trailing partial record is not counted.
    #[must_use]
    pub fn entry_count(&self) -> u32 {
        self.entry_count
    }

    /// The declared size of the index region in bytes.
    #[must_use]
    pub fn index_size(&self) -> u32 {
        self.index_size
    }

    /// Offset of the payload region from the buffer start.
    #[must_use]
    pub fn payload_start(&self) -> usize {
        HEADER_SIZE + self.index_size as usize
    }

    /// Size of the payload region in bytes.
    #[must_use]
    pub fn payload_len(&self) -> usize {
        self.data.len() - self.payload_start()
    }

    /// Total size of the table buffer.
    #[must_use]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Returns `true` if the table has no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entry_count == 0
    }

    /// The raw table buffer.
    #[must_use]
    pub fn data(&self) -> &[u8] {
        self.data.data()
    }
}

impl fmt::Debug for StringDatabase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StringDatabase")
            .field("index_size", &self.index_size)
            .field("entry_count", &self.entry_count)
            .field("len", &self.data.len())
            .finish()
    }
}
