//! Memory-mapped table files.

use std::{
    fs::File,
    path::{Path, PathBuf},
};

use memmap2::Mmap;

use super::Backend;
use crate::{Error, Result};

/// A table file mapped read-only into memory.
///
/// Binary tables are decoded straight out of the mapping. Text tables are mapped only long
/// enough for [`crate::file::text::decode`] to turn them into bytes.
///
/// ```rust,no_run
/// use strscope::file::{Backend, Physical};
///
/// let table = Physical::map("resources/string_db.bin")?;
/// let header = table.data_slice(0, 4)?;
/// println!("{}: index size bytes {header:?}", table.path().display());
/// # Ok::<(), strscope::Error>(())
/// ```
#[derive(Debug)]
pub struct Physical {
    path: PathBuf,
    map: Mmap,
}

impl Physical {
    /// Maps the file at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::FileError`] if the file cannot be opened and [`Error::Error`] if the
    /// mapping fails.
    pub fn map(path: impl AsRef<Path>) -> Result<Physical> {
        let path = path.as_ref();
        let file = File::open(path).map_err(Error::FileError)?;

        // SAFETY: read-only mapping, owned by `Physical` and never handed out past its lifetime.
        let map = unsafe { Mmap::map(&file) }
            .map_err(|e| Error::Error(format!("cannot map {}: {e}", path.display())))?;

        Ok(Physical {
            path: path.to_path_buf(),
            map,
        })
    }

    /// Path the table was mapped from.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Backend for Physical {
    fn data(&self) -> &[u8] {
        &self.map
    }
}

#[cfg(test)]
mod tests {
    use std::{io::ErrorKind, path::PathBuf};

    use super::*;

    fn sample_bin() -> PathBuf {
        PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/samples/string_db.bin")
    }

    #[test]
    fn maps_binary_sample() {
        let table = Physical::map(sample_bin()).unwrap();
        assert_eq!(table.path(), sample_bin());

        // five entries
        assert_eq!(table.data_slice(0, 4).unwrap(), &[40, 0, 0, 0]);
        assert!(table.len() > 44);
        assert!(matches!(table.data_slice(usize::MAX, 1), Err(Error::OutOfBounds)));
        assert!(matches!(table.data_slice(table.len(), 1), Err(Error::OutOfBounds)));
    }

    #[test]
    fn missing_file() {
        match Physical::map("/nonexistent/path/to/string_db.bin") {
            Err(Error::FileError(e)) => assert_eq!(e.kind(), ErrorKind::NotFound),
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn empty_file() {
        let path = std::env::temp_dir().join("strscope_physical_empty.bin");
        std::fs::write(&path, b"").unwrap();

        let table = Physical::map(&path).unwrap();
        assert!(table.is_empty());
        assert!(table.data_slice(0, 0).unwrap().is_empty());
        assert!(table.data_slice(0, 1).is_err());

        std::fs::remove_file(&path).unwrap();
    }
}
