//! Plugin surface for decompiler hosts.
//!
//! A host creates a [`PluginContext`] from the user's [`PluginOptions`], lets every plugin
//! register its passes through [`Plugin::init`], and then drives those passes (usually through
//! [`crate::rewrite::RewriteEngine`]).
//!
//! [`StringsPlugin`] registers a single [`StringReplacerPass`] when `strscope.enable` is set.
//! When it is not, nothing is created: no pass, no table handle, no file access.
//!
//! # Examples
//!
//! ```rust
//! use strscope::ir::ClassDef;
//! use strscope::plugin::{Plugin, PluginContext, PluginOptions, StringsPlugin};
//!
//! let mut ctx = PluginContext::<ClassDef>::new(PluginOptions::disabled());
//! StringsPlugin.init(&mut ctx)?;
//! assert_eq!(ctx.pass_count(), 0);
//! # Ok::<(), strscope::Error>(())
//! ```

mod options;

use std::{fmt, sync::Arc};

pub use options::{OptionDescriptor, PluginOptions, DEFAULT_TABLE_PATH};

use crate::{
    host::ClassNode,
    rewrite::{DecompilePass, StringReplacerPass},
    Result, SharedDatabase,
};

/// Identifier of the plugin, also the prefix of its option keys.
pub const PLUGIN_ID: &str = "strscope";

/// Display name of the plugin.
pub const PLUGIN_NAME: &str = "strscope string table plugin";

/// Descriptive metadata of a plugin.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PluginInfo {
    /// Unique identifier
    pub id: &'static str,
    /// Display name
    pub name: &'static str,
    /// One-line description
    pub description: &'static str,
    /// Project homepage, empty if none
    pub homepage: &'static str,
}

impl fmt::Display for PluginInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({}): {}", self.name, self.id, self.description)
    }
}

/// Registration context handed to [`Plugin::init`].
pub struct PluginContext<C: ClassNode> {
    options: PluginOptions,
    database: Option<Arc<SharedDatabase>>,
    passes: Vec<Box<dyn DecompilePass<C>>>,
}

impl<C: ClassNode> PluginContext<C> {
    /// Creates a context for the given options.
    #[must_use]
    pub fn new(options: PluginOptions) -> Self {
        PluginContext {
            options,
            database: None,
            passes: Vec::new(),
        }
    }

    /// Supplies the string table handle instead of opening `table_path`.
    #[must_use]
    pub fn with_database(mut self, database: Arc<SharedDatabase>) -> Self {
        self.database = Some(database);
        self
    }

    /// The options plugins are configured with.
    #[must_use]
    pub fn options(&self) -> &PluginOptions {
        &self.options
    }

    /// The string table handle supplied through [`PluginContext::with_database`].
    #[must_use]
    pub fn database(&self) -> Option<&Arc<SharedDatabase>> {
        self.database.as_ref()
    }

    /// Registers a pass. Passes run in registration order.
    pub fn add_pass(&mut self, pass: impl DecompilePass<C> + 'static) {
        log::debug!("registered pass {}", pass.name());
        self.passes.push(Box::new(pass));
    }

    /// Number of registered passes.
    #[must_use]
    pub fn pass_count(&self) -> usize {
        self.passes.len()
    }

    /// Names of the registered passes.
    #[must_use]
    pub fn pass_names(&self) -> Vec<&'static str> {
        self.passes.iter().map(|p| p.name()).collect()
    }

    /// Consumes the context and returns the registered passes.
    #[must_use]
    pub fn into_passes(self) -> Vec<Box<dyn DecompilePass<C>>> {
        self.passes
    }
}

impl<C: ClassNode> fmt::Debug for PluginContext<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PluginContext")
            .field("options", &self.options)
            .field("database", &self.database)
            .field("passes", &self.pass_names())
            .finish()
    }
}

/// A decompiler plugin.
pub trait Plugin<C: ClassNode> {
    /// Descriptive metadata.
    fn info(&self) -> PluginInfo;

    /// Registers the plugin's passes on `ctx` according to its options.
    ///
    /// # Errors
    ///
    /// Returns an error if registration fails.
    fn init(&self, ctx: &mut PluginContext<C>) -> Result<()>;
}

/// Replaces obfuscated string table lookups with the strings they return.
#[derive(Debug, Clone, Copy, Default)]
pub struct StringsPlugin;

impl<C: ClassNode> Plugin<C> for StringsPlugin {
    fn info(&self) -> PluginInfo {
        PluginInfo {
            id: PLUGIN_ID,
            name: PLUGIN_NAME,
            description: "Replaces StringIndexer._getString lookups with the decoded strings",
            homepage: "",
        }
    }

    fn init(&self, ctx: &mut PluginContext<C>) -> Result<()> {
        let options = ctx.options();
        if !options.enable {
            log::info!("{PLUGIN_ID} disabled, no pass registered");
            return Ok(());
        }

        let database = match ctx.database() {
            Some(database) => Arc::clone(database),
            None => Arc::new(SharedDatabase::from_path(
                &options.table_path,
                options.table_encoding,
            )),
        };
        log::info!("{PLUGIN_ID} enabled, string table {}", database.source());

        ctx.add_pass(StringReplacerPass::new(database));
        Ok(())
    }
}
