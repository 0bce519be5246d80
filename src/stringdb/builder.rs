use std::collections::HashMap;

use super::{ENTRY_SIZE, HEADER_SIZE};
use crate::{
    file::{io::write_le_at, text},
    Result,
};

/// Assembles a string table in the layout read by [`super::StringDatabase`].
///
/// Every [`push`](StringTableBuilder::push) creates a new index entry. Identical strings share
/// their payload bytes, so pushing the same text twice yields two indices pointing at one range.
///
/// # Examples
///
/// ```rust
/// use strscope::{StringDatabase, StringTableBuilder};
///
/// let mut builder = StringTableBuilder::new();
/// let hello = builder.push("Hello")?;
/// let world = builder.push("World")?;
///
/// let db = StringDatabase::from_mem(builder.build()?)?;
/// assert_eq!(db.resolve(hello)?, "Hello");
/// assert_eq!(db.resolve(world)?, "World");
/// # Ok::<(), strscope::Error>(())
/// ```
#[derive(Debug, Default)]
pub struct StringTableBuilder {
    entries: Vec<(u32, u32)>,
    payload: Vec<u8>,
    interned: HashMap<String, (u32, u32)>,
}

impl StringTableBuilder {
    /// Creates an empty builder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a string and returns its 1-based index.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::Malformed`] if the payload or the entry count would no longer fit
    /// the 32-bit fields of the layout.
    pub fn push(&mut self, value: &str) -> Result<u32> {
        let index_fits = self
            .entries
            .len()
            .checked_add(1)
            .and_then(|count| count.checked_mul(ENTRY_SIZE))
            .is_some_and(|size| u32::try_from(size).is_ok());
        if !index_fits {
            return Err(malformed_error!("Too many entries for a string table"));
        }

        let record = match self.interned.get(value) {
            Some(&record) => record,
            None => {
                let offset = u32::try_from(self.payload.len());
                let length = u32::try_from(value.len())
                    .ok()
                    .and_then(|len| len.checked_add(1));
                let (Ok(offset), Some(length)) = (offset, length) else {
                    return Err(malformed_error!(
                        "String of {} bytes does not fit the table payload",
                        value.len()
                    ));
                };

                self.payload.extend_from_slice(value.as_bytes());
                self.interned.insert(value.to_string(), (offset, length));
                (offset, length)
            }
        };

        self.entries.push(record);
        Ok(self.entries.len() as u32)
    }

    /// Number of entries pushed so far.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if nothing was pushed yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Produces the binary table.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::OutOfBounds`] only if the computed layout is inconsistent, which
    /// cannot happen for tables assembled through [`push`](StringTableBuilder::push).
    pub fn build(&self) -> Result<Vec<u8>> {
        let index_size = self.entries.len() * ENTRY_SIZE;
        let mut data = vec![0u8; HEADER_SIZE + index_size + self.payload.len()];

        let mut offset = 0;
        write_le_at(&mut data, &mut offset, index_size as u32)?;
        for &(payload_offset, length) in &self.entries {
            write_le_at(&mut data, &mut offset, payload_offset)?;
            write_le_at(&mut data, &mut offset, length)?;
        }
        data[offset..].copy_from_slice(&self.payload);

        Ok(data)
    }

    /// Produces the table in its comma-separated decimal text form.
    ///
    /// # Errors
    ///
    /// See [`StringTableBuilder::build`].
    pub fn build_text(&self) -> Result<String> {
        Ok(text::encode(&self.build()?))
    }
}
