use std::sync::Arc;

use thiserror::Error;

macro_rules! malformed_error {
    // Single string version
    ($msg:expr) => {
        crate::Error::Malformed {
            message: $msg.to_string(),
            file: file!(),
            line: line!(),
        }
    };

    // Format string with arguments version
    ($fmt:expr, $($arg:tt)*) => {
        crate::Error::Malformed {
            message: format!($fmt, $($arg)*),
            file: file!(),
            line: line!(),
        }
    };
}

/// The generic Error type, which provides coverage for all errors this library can potentially
/// return.
///
/// Every failure is fatal for the run it occurs in. Decode errors describe structural faults in
/// the string table and are never retried; the rewrite engine surfaces the first one it hits
/// wrapped in [`Error::RewriteFailed`], with the root cause reachable through
/// [`std::error::Error::source`].
///
/// # Error Categories
///
/// ## I/O
/// - [`Error::FileError`] - The table file is missing or unreadable
/// - [`Error::Empty`] - The table file contained no bytes
/// - [`Error::Error`] - Miscellaneous failures such as a failed memory mapping
///
/// ## Table format
/// - [`Error::Malformed`] - Declared sizes or ranges do not fit the buffer, or a text token is invalid
/// - [`Error::OutOfBounds`] - A low-level read ran past the end of a buffer
/// - [`Error::InvalidEncoding`] - Payload bytes for an entry are not valid UTF-8
///
/// ## Lookup
/// - [`Error::IndexOutOfRange`] - Index outside `[1, entry_count]`
/// - [`Error::InvalidKey`] - Textual key is not a base-10 integer
///
/// ## Pipeline
/// - [`Error::TableUnavailable`] - The shared table failed its one-time load
/// - [`Error::PassNotInitialized`] - A pass was visited before `initialize`
/// - [`Error::Config`] - Unknown option key or unparseable option value
/// - [`Error::RewriteFailed`] - A rewrite run aborted on a fatal error
///
/// # Examples
///
/// ```rust
/// use strscope::{Error, StringDatabase};
///
/// let db = StringDatabase::from_mem(vec![0, 0, 0, 0])?;
/// match db.resolve(1) {
///     Err(Error::IndexOutOfRange { index, count }) => {
///         assert_eq!((index, count), (1, 0));
///     }
///     other => panic!("unexpected: {other:?}"),
/// }
/// # Ok::<(), strscope::Error>(())
/// ```
#[derive(Error, Debug)]
pub enum Error {
    /// The table is damaged and could not be parsed.
    ///
    /// Raised when the declared index size exceeds the buffer, an entry stores a zero length,
    /// an entry's string range runs past the end of the buffer, or a token of the text encoding
    /// is not a byte value. The source location where the fault was detected is recorded.
    #[error("Malformed - {file}:{line}: {message}")]
    Malformed {
        /// The message to be printed for the Malformed error
        message: String,
        /// The source file in which this error occured
        file: &'static str,
        /// The source line in which this error occured
        line: u32,
    },

    /// An out of bound access was attempted while reading a buffer.
    #[error("Out of Bound read would have occurred!")]
    OutOfBounds,

    /// The table file holds no bytes.
    #[error("Provided input was empty")]
    Empty,

    /// File I/O error.
    #[error("{0}")]
    FileError(#[from] std::io::Error),

    /// Generic error for miscellaneous failures.
    #[error("{0}")]
    Error(String),

    /// The bytes stored for a table entry are not valid UTF-8.
    #[error("Entry {index} is not valid UTF-8: {source}")]
    InvalidEncoding {
        /// The 1-based index of the entry
        index: u32,
        /// The underlying decode failure
        source: std::str::Utf8Error,
    },

    /// A lookup index fell outside the table.
    ///
    /// Valid indices are `1..=count`; index `0` is always rejected.
    #[error("Index {index} out of range (table has {count} entries)")]
    IndexOutOfRange {
        /// The requested index
        index: i64,
        /// The number of entries in the table
        count: u32,
    },

    /// A textual lookup key is not a base-10 integer.
    #[error("Invalid string table key '{0}'")]
    InvalidKey(String),

    /// The shared string table failed to load.
    ///
    /// The load is attempted exactly once; every later request observes the same root cause.
    #[error("String table unavailable: {0}")]
    TableUnavailable(#[source] Arc<Error>),

    /// A pass was asked to visit nodes before `initialize` succeeded.
    #[error("Pass '{0}' used before initialization")]
    PassNotInitialized(&'static str),

    /// A configuration key or value was rejected.
    #[error("Invalid option - {0}")]
    Config(String),

    /// A rewrite run was aborted.
    #[error("Failed to replace strings in {class}::{method}")]
    RewriteFailed {
        /// Name of the class being processed
        class: String,
        /// Name of the method being processed
        method: String,
        /// The fatal error that aborted the run
        #[source]
        source: Box<Error>,
    },
}

impl Error {
    /// Returns the innermost error of a wrapped failure.
    ///
    /// Unwraps [`Error::RewriteFailed`] and [`Error::TableUnavailable`] until a root cause is
    /// reached, so callers can match on the structural kind directly.
    #[must_use]
    pub fn root_cause(&self) -> &Error {
        match self {
            Error::RewriteFailed { source, .. } => source.root_cause(),
            Error::TableUnavailable(inner) => inner.root_cause(),
            other => other,
        }
    }
}
