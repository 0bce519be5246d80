//! Plugin options.

use std::{
    fmt,
    path::{Path, PathBuf},
};

use crate::{file::TableEncoding, plugin::PLUGIN_ID, Error, Result};

/// Default location of the string table, relative to the working directory.
pub const DEFAULT_TABLE_PATH: &str = "resources/string_db.txt";

/// Description of a single option key, for listing in host UIs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OptionDescriptor {
    /// Key without the plugin prefix
    pub name: &'static str,
    /// Human-readable description
    pub description: &'static str,
    /// Default value in string form
    pub default: &'static str,
}

const OPTIONS: &[OptionDescriptor] = &[
    OptionDescriptor {
        name: "enable",
        description: "replace string table lookups with literal strings",
        default: "yes",
    },
    OptionDescriptor {
        name: "table-path",
        description: "path of the string table file",
        default: DEFAULT_TABLE_PATH,
    },
    OptionDescriptor {
        name: "table-encoding",
        description: "storage form of the string table: auto, text or binary",
        default: "auto",
    },
    OptionDescriptor {
        name: "parallel",
        description: "process classes on multiple threads",
        default: "yes",
    },
];

/// Options of the string table plugin.
///
/// Keys are namespaced with the plugin id (`strscope.enable`, `strscope.table-path`, ...). Boolean
/// values accept `yes`/`no`, `true`/`false`, `on`/`off` and `1`/`0`.
///
/// # Examples
///
/// ```rust
/// use strscope::plugin::PluginOptions;
///
/// let options = PluginOptions::from_pairs([
///     ("strscope.enable", "no"),
///     ("strscope.table-path", "/tmp/string_db.bin"),
/// ])?;
/// assert!(!options.enable);
/// assert_eq!(options.table_path.to_str(), Some("/tmp/string_db.bin"));
/// # Ok::<(), strscope::Error>(())
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PluginOptions {
    /// Register the replacer pass (default: true).
    pub enable: bool,

    /// Path of the string table file.
    pub table_path: PathBuf,

    /// Storage form of the string table file (default: auto-detect).
    pub table_encoding: TableEncoding,

    /// Distribute classes over the rayon pool (default: true).
    pub parallel: bool,
}

impl Default for PluginOptions {
    fn default() -> Self {
        Self {
            enable: true,
            table_path: PathBuf::from(DEFAULT_TABLE_PATH),
            table_encoding: TableEncoding::Auto,
            parallel: true,
        }
    }
}

impl PluginOptions {
    /// Creates the default options.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Options with the plugin switched off.
    #[must_use]
    pub fn disabled() -> Self {
        Self {
            enable: false,
            ..Self::default()
        }
    }

    /// Describes every supported key.
    #[must_use]
    pub fn descriptors() -> &'static [OptionDescriptor] {
        OPTIONS
    }

    /// Full key (with plugin prefix) of an option name.
    #[must_use]
    pub fn key(name: &str) -> String {
        format!("{PLUGIN_ID}.{name}")
    }

    /// Sets whether the plugin registers its pass.
    #[must_use]
    pub fn with_enable(mut self, enable: bool) -> Self {
        self.enable = enable;
        self
    }

    /// Sets the string table location.
    #[must_use]
    pub fn with_table_path(mut self, path: impl AsRef<Path>) -> Self {
        self.table_path = path.as_ref().to_path_buf();
        self
    }

    /// Sets the string table storage form.
    #[must_use]
    pub fn with_table_encoding(mut self, encoding: TableEncoding) -> Self {
        self.table_encoding = encoding;
        self
    }

    /// Sets whether classes are processed in parallel.
    #[must_use]
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Applies a single `key = value` setting.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] for an unknown key or a value that cannot be parsed.
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        let Some(name) = key
            .strip_prefix(PLUGIN_ID)
            .and_then(|rest| rest.strip_prefix('.'))
        else {
            return Err(Error::Config(format!("unknown option '{key}'")));
        };

        let value = value.trim();
        match name {
            "enable" => self.enable = parse_bool(key, value)?,
            "table-path" => {
                if value.is_empty() {
                    return Err(Error::Config(format!("option '{key}' needs a path")));
                }
                self.table_path = PathBuf::from(value);
            }
            "table-encoding" => {
                self.table_encoding = value.parse().map_err(|_| {
                    Error::Config(format!(
                        "option '{key}' expects auto, text or binary, got '{value}'"
                    ))
                })?;
            }
            "parallel" => self.parallel = parse_bool(key, value)?,
            _ => return Err(Error::Config(format!("unknown option '{key}'"))),
        }
        Ok(())
    }

    /// Builds options from `key = value` pairs applied over the defaults.
    ///
    /// # Errors
    ///
    /// See [`PluginOptions::set`].
    pub fn from_pairs<I, K, V>(pairs: I) -> Result<Self>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut options = Self::default();
        for (key, value) in pairs {
            options.set(key.as_ref(), value.as_ref())?;
        }
        Ok(options)
    }

    /// Current values as `(key, value)` pairs, in the order of [`PluginOptions::descriptors`].
    #[must_use]
    pub fn to_pairs(&self) -> Vec<(String, String)> {
        let yes_no = |v: bool| if v { "yes" } else { "no" }.to_string();
        vec![
            (Self::key("enable"), yes_no(self.enable)),
            (Self::key("table-path"), self.table_path.display().to_string()),
            (Self::key("table-encoding"), self.table_encoding.to_string()),
            (Self::key("parallel"), yes_no(self.parallel)),
        ]
    }
}

impl fmt::Display for PluginOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (key, value)) in self.to_pairs().iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{key}={value}")?;
        }
        Ok(())
    }
}

fn parse_bool(key: &str, value: &str) -> Result<bool> {
    match value.to_ascii_lowercase().as_str() {
        "yes" | "true" | "on" | "1" => Ok(true),
        "no" | "false" | "off" | "0" => Ok(false),
        _ => Err(Error::Config(format!(
            "option '{key}' expects yes or no, got '{value}'"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let options = PluginOptions::default();
        assert!(options.enable);
        assert!(options.parallel);
        assert_eq!(options.table_encoding, TableEncoding::Auto);
        assert_eq!(options.table_path, PathBuf::from(DEFAULT_TABLE_PATH));
        assert!(!PluginOptions::disabled().enable);
    }

    #[test]
    fn set_parses_values() {
        let mut options = PluginOptions::default();
        options.set("strscope.enable", "no").unwrap();
        options.set("strscope.parallel", "FALSE").unwrap();
        options.set("strscope.table-encoding", "Binary").unwrap();
        options.set("strscope.table-path", " db.bin ").unwrap();

        assert!(!options.enable);
        assert!(!options.parallel);
        assert_eq!(options.table_encoding, TableEncoding::Binary);
        assert_eq!(options.table_path, PathBuf::from("db.bin"));
    }

    #[test]
    fn set_rejects_bad_input() {
        let mut options = PluginOptions::default();
        for (key, value) in [
            ("strscope.enable", "maybe"),
            ("strscope.table-encoding", "hex"),
            ("strscope.table-path", ""),
            ("strscope.unknown", "yes"),
            ("other.enable", "yes"),
            ("strscopeenable", "yes"),
        ] {
            assert!(
                matches!(options.set(key, value), Err(Error::Config(_))),
                "{key}={value} should be rejected"
            );
        }
        assert_eq!(options, PluginOptions::default());
    }

    #[test]
    fn pairs_round_trip() {
        let options = PluginOptions::default()
            .with_enable(false)
            .with_table_path("x/y.txt")
            .with_table_encoding(TableEncoding::Text)
            .with_parallel(false);

        let rebuilt = PluginOptions::from_pairs(options.to_pairs()).unwrap();
        assert_eq!(rebuilt, options);
        assert_eq!(
            options.to_string(),
            "strscope.enable=no, strscope.table-path=x/y.txt, strscope.table-encoding=text, strscope.parallel=no"
        );
    }

    #[test]
    fn descriptors_cover_keys() {
        let names: Vec<_> = PluginOptions::descriptors().iter().map(|d| d.name).collect();
        assert_eq!(names, vec!["enable", "table-path", "table-encoding", "parallel"]);
    }
}
