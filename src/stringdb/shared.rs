use std::{
    fmt,
    path::{Path, PathBuf},
    sync::{Arc, OnceLock},
};

use super::StringDatabase;
use crate::{file::TableEncoding, Error, Result};

type Loader = Box<dyn Fn() -> Result<StringDatabase> + Send + Sync>;
type LoadOutcome = std::result::Result<Arc<StringDatabase>, Arc<Error>>;

/// Load-once handle to a [`StringDatabase`].
///
/// The first call to [`get`](SharedDatabase::get) runs the loader; concurrent callers block until
/// it finishes and then all observe the same fully-initialized instance. The outcome is final:
/// a failed load is never retried, and every caller receives the same root cause wrapped in
/// [`Error::TableUnavailable`].
///
/// # Examples
///
/// ```rust,no_run
/// use strscope::{file::TableEncoding, SharedDatabase};
///
/// let shared = SharedDatabase::from_path("resources/string_db.txt", TableEncoding::Auto);
/// let db = shared.get()?;
/// println!("{}", db.resolve(1)?);
/// # Ok::<(), strscope::Error>(())
/// ```
pub struct SharedDatabase {
    source: String,
    loader: Option<Loader>,
    cell: OnceLock<LoadOutcome>,
}

impl SharedDatabase {
    /// Creates a handle that loads the table file at `path` on first use.
    #[must_use]
    pub fn from_path(path: impl AsRef<Path>, encoding: TableEncoding) -> SharedDatabase {
        let path: PathBuf = path.as_ref().to_path_buf();
        let source = path.display().to_string();
        SharedDatabase::with_loader(source, move || {
            StringDatabase::from_path_with_encoding(&path, encoding)
        })
    }

    /// Creates a handle around a custom loader, run at most once.
    #[must_use]
    pub fn with_loader(
        source: impl Into<String>,
        loader: impl Fn() -> Result<StringDatabase> + Send + Sync + 'static,
    ) -> SharedDatabase {
        SharedDatabase {
            source: source.into(),
            loader: Some(Box::new(loader)),
            cell: OnceLock::new(),
        }
    }

    /// Creates a handle around an already loaded table.
    #[must_use]
    pub fn from_database(db: StringDatabase) -> SharedDatabase {
        SharedDatabase {
            source: "<memory>".to_string(),
            loader: None,
            cell: OnceLock::from(Ok(Arc::new(db))),
        }
    }

    /// Returns the shared table, loading it on first use.
    ///
    /// # Errors
    ///
    /// Returns [`Error::TableUnavailable`] carrying the root cause if the load failed, now or
    /// during an earlier call.
    pub fn get(&self) -> Result<Arc<StringDatabase>> {
        match self.cell.get_or_init(|| self.load()) {
            Ok(db) => Ok(Arc::clone(db)),
            Err(error) => Err(Error::TableUnavailable(Arc::clone(error))),
        }
    }

    /// Returns `true` once the table has been loaded successfully.
    #[must_use]
    pub fn is_loaded(&self) -> bool {
        matches!(self.cell.get(), Some(Ok(_)))
    }

    /// Description of where the table comes from.
    #[must_use]
    pub fn source(&self) -> &str {
        &self.source
    }

    fn load(&self) -> LoadOutcome {
        let Some(loader) = &self.loader else {
            return Err(Arc::new(Error::Error(format!(
                "no loader configured for string table {}",
                self.source
            ))));
        };

        log::info!("loading string table from {}", self.source);
        match loader() {
            Ok(db) => {
                log::info!(
                    "string table {} ready: {} entries",
                    self.source,
                    db.entry_count()
                );
                Ok(Arc::new(db))
            }
            Err(error) => {
                log::error!("failed to load string table {}: {}", self.source, error);
                Err(Arc::new(error))
            }
        }
    }
}

impl fmt::Debug for SharedDatabase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SharedDatabase")
            .field("source", &self.source)
            .field("loaded", &self.is_loaded())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::{
        sync::{
            atomic::{AtomicUsize, Ordering},
            Barrier,
        },
        thread,
    };

    use super::*;
    use crate::StringTableBuilder;

    fn table() -> StringDatabase {
        let mut builder = StringTableBuilder::new();
        builder.push("Hello").unwrap();
        builder.push("World").unwrap();
        StringDatabase::from_mem(builder.build().unwrap()).unwrap()
    }

    #[test]
    fn loads_lazily() {
        let shared = SharedDatabase::with_loader("test", || Ok(table()));
        assert!(!shared.is_loaded());

        let db = shared.get().unwrap();
        assert!(shared.is_loaded());
        assert_eq!(db.resolve(2).unwrap(), "World");
    }

    #[test]
    fn concurrent_first_access_loads_once() {
        let loads = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&loads);
        let shared = Arc::new(SharedDatabase::with_loader("test", move || {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(table())
        }));

        let barrier = Arc::new(Barrier::new(8));
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let shared = Arc::clone(&shared);
                let barrier = Arc::clone(&barrier);
                thread::spawn(move || {
                    barrier.wait();
                    shared.get().unwrap()
                })
            })
            .collect();

        let instances: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        assert_eq!(loads.load(Ordering::SeqCst), 1);
        for db in &instances[1..] {
            assert!(Arc::ptr_eq(&instances[0], db));
        }
    }

    #[test]
    fn failure_is_final() {
        let loads = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&loads);
        let shared = SharedDatabase::with_loader("broken", move || {
            counter.fetch_add(1, Ordering::SeqCst);
            StringDatabase::from_mem(vec![0xFF, 0, 0, 0])
        });

        for _ in 0..3 {
            match shared.get() {
                Err(Error::TableUnavailable(cause)) => {
                    assert!(matches!(*cause, Error::Malformed { .. }));
                }
                other => panic!("Expected TableUnavailable, got {other:?}"),
            }
        }
        assert_eq!(loads.load(Ordering::SeqCst), 1);
        assert!(!shared.is_loaded());
    }

    #[test]
    fn missing_file_surfaces_io_error() {
        let shared = SharedDatabase::from_path("/nonexistent/string_db.txt", TableEncoding::Auto);
        let err = shared.get().unwrap_err();
        assert!(matches!(err.root_cause(), Error::FileError(_)));
        assert_eq!(shared.source(), "/nonexistent/string_db.txt");
    }

    #[test]
    fn from_database_is_preloaded() {
        let shared = SharedDatabase::from_database(table());
        assert!(shared.is_loaded());
        assert_eq!(shared.get().unwrap().resolve(1).unwrap(), "Hello");
    }
}
