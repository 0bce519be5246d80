//! Little-endian, bounds-checked primitive access for string table buffers.
//!
//! The string table stores every numeric field as a little-endian integer: the 4-byte index size
//! header and the `(offset, length)` pair of each index entry. All reads go through
//! [`read_le_at`], which refuses to touch bytes past the end of the buffer and reports
//! [`crate::Error::OutOfBounds`] instead. [`write_le_at`] is the mirror used by
//! [`crate::stringdb::StringTableBuilder`].
//!
//! # Examples
//!
//! ```rust,ignore
//! use strscope::file::io::{read_le, read_le_at};
//!
//! let data = [0x10, 0x00, 0x00, 0x00, 0x05, 0x00, 0x00, 0x00];
//! let header: u32 = read_le(&data)?;
//! assert_eq!(header, 16);
//!
//! let mut offset = 4;
//! let next: u32 = read_le_at(&data, &mut offset)?;
//! assert_eq!((next, offset), (5, 8));
//! # Ok::<(), strscope::Error>(())
//! ```

use crate::{Error::OutOfBounds, Result};

/// Fixed-width integers that can be read from and written to a table buffer.
///
/// Each implementation names the byte array matching its width so the conversion can be done
/// with the standard `from_le_bytes`/`to_le_bytes` pairs.
pub trait TableIO: Sized {
    /// Byte array representation of this type.
    type Bytes: Sized + AsRef<[u8]> + for<'a> TryFrom<&'a [u8]>;

    /// Read T from a byte buffer in little-endian
    fn from_le_bytes(bytes: Self::Bytes) -> Self;

    /// Write T to a byte buffer in little-endian
    fn to_le_bytes(self) -> Self::Bytes;
}

macro_rules! impl_table_io {
    ($($ty:ty => $len:literal),* $(,)?) => {
        $(
            impl TableIO for $ty {
                type Bytes = [u8; $len];

                fn from_le_bytes(bytes: Self::Bytes) -> Self {
                    <$ty>::from_le_bytes(bytes)
                }

                fn to_le_bytes(self) -> Self::Bytes {
                    <$ty>::to_le_bytes(self)
                }
            }
        )*
    };
}

impl_table_io!(u8 => 1, u16 => 2, u32 => 4, u64 => 8, i32 => 4);

/// Safely reads a value of type `T` in little-endian byte order from the start of a buffer.
///
/// # Errors
///
/// Returns [`crate::Error::OutOfBounds`] if the buffer is shorter than `T`.
pub fn read_le<T: TableIO>(data: &[u8]) -> Result<T> {
    let mut offset = 0_usize;
    read_le_at(data, &mut offset)
}

/// Safely reads a value of type `T` in little-endian byte order at `offset`.
///
/// On success the offset is advanced past the value; on failure it is left untouched.
///
/// # Errors
///
/// Returns [`crate::Error::OutOfBounds`] if fewer than `size_of::<T>()` bytes remain, including
/// when `offset` itself lies beyond the buffer or the end position would overflow.
pub fn read_le_at<T: TableIO>(data: &[u8], offset: &mut usize) -> Result<T> {
    let type_len = std::mem::size_of::<T>();
    let Some(end) = offset.checked_add(type_len) else {
        return Err(OutOfBounds);
    };
    if end > data.len() {
        return Err(OutOfBounds);
    }

    let Ok(read) = data[*offset..end].try_into() else {
        return Err(OutOfBounds);
    };

    *offset = end;

    Ok(T::from_le_bytes(read))
}

/// Safely writes a value of type `T` in little-endian byte order at `offset`.
///
/// # Errors
///
/// Returns [`crate::Error::OutOfBounds`] if the value does not fit in the remaining buffer.
pub fn write_le_at<T: TableIO>(data: &mut [u8], offset: &mut usize, value: T) -> Result<()> {
    let type_len = std::mem::size_of::<T>();
    let Some(end) = offset.checked_add(type_len) else {
        return Err(OutOfBounds);
    };
    if end > data.len() {
        return Err(OutOfBounds);
    }

    data[*offset..end].copy_from_slice(value.to_le_bytes().as_ref());
    *offset = end;

    Ok(())
}
