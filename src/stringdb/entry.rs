use std::{fmt, ops::Range};

use crate::Result;

/// Size of the index size header at the start of every table.
pub const HEADER_SIZE: usize = 4;

/// Size of a single `(offset, length)` index entry.
pub const ENTRY_SIZE: usize = 8;

/// One record of the index region.
///
/// `offset` is relative to the start of the payload region. `length` is stored as the true byte
/// length plus one, so a stored length of zero can never describe a valid string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TableEntry {
    /// 1-based index of the entry
    pub index: u32,
    /// Offset of the string bytes, relative to the payload start
    pub offset: u32,
    /// Stored length (true byte length + 1)
    pub length: u32,
}

impl TableEntry {
    /// Returns the true byte length of the string, or `None` if the stored length is zero.
    #[must_use]
    pub fn byte_len(&self) -> Option<u32> {
        self.length.checked_sub(1)
    }

    /// Computes the absolute byte range of this entry's string.
    ///
    /// The range is not checked against a buffer; callers slice through
    /// [`crate::file::Backend::data_slice`].
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::Malformed`] if the stored length is zero or the range end does not
    /// fit in `usize`.
    pub fn byte_range(&self, payload_start: usize) -> Result<Range<usize>> {
        let Some(byte_len) = self.byte_len() else {
            return Err(malformed_error!(
                "Entry {} stores a zero length",
                self.index
            ));
        };

        let start = payload_start.checked_add(self.offset as usize);
        let end = start.and_then(|start| start.checked_add(byte_len as usize));
        match (start, end) {
            (Some(start), Some(end)) => Ok(start..end),
            _ => Err(malformed_error!(
                "Entry {} range overflows (offset {}, length {})",
                self.index,
                self.offset,
                self.length
            )),
        }
    }

    /// Position of this entry inside the index region, in bytes from the buffer start.
    #[must_use]
    pub fn position(index: u32) -> usize {
        (index as usize - 1) * ENTRY_SIZE + HEADER_SIZE
    }
}

impl fmt::Display for TableEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "#{} offset={} length={}",
            self.index, self.offset, self.length
        )
    }
}
