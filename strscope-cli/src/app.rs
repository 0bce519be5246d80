use std::path::PathBuf;

use clap::{Parser, Subcommand};
use strscope::file::TableEncoding;

/// strscope - inspect, verify and build indexed string tables
#[derive(Debug, Parser)]
#[command(name = "strscope", version, about, long_about = None)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOptions,

    #[command(subcommand)]
    pub command: Command,
}

/// Options shared across all subcommands.
#[derive(Debug, Parser)]
pub struct GlobalOptions {
    /// Emit output as JSON instead of human-readable text.
    #[arg(long, global = true)]
    pub json: bool,

    /// Enable verbose (debug-level) logging output.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Storage form of table arguments: auto, text or binary.
    #[arg(long, global = true, default_value = "auto", value_name = "ENCODING")]
    pub encoding: TableEncoding,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Display table layout: index size, entry count, payload and file size.
    Info {
        /// Path to the string table.
        #[arg(value_name = "TABLE")]
        path: PathBuf,
    },

    /// List every entry with its offset, length and value.
    Dump {
        /// Path to the string table.
        #[arg(value_name = "TABLE")]
        path: PathBuf,

        /// Show at most this many entries.
        #[arg(long, value_name = "N")]
        limit: Option<usize>,
    },

    /// Decode the strings at the given 1-based indices.
    Resolve {
        /// Path to the string table.
        #[arg(value_name = "TABLE")]
        path: PathBuf,

        /// Indices as written at the call site (e.g. 42).
        #[arg(value_name = "INDEX", required = true)]
        indices: Vec<String>,
    },

    /// Decode every entry and report structural and encoding failures.
    Check {
        /// Path to the string table.
        #[arg(value_name = "TABLE")]
        path: PathBuf,
    },

    /// Build a table from a newline-separated strings file.
    Pack {
        /// Input file, one string per line.
        #[arg(value_name = "STRINGS")]
        input: PathBuf,

        /// Output table file.
        #[arg(short, long, value_name = "OUT")]
        output: PathBuf,

        /// Write the raw binary layout instead of comma-separated decimal text.
        #[arg(long)]
        binary: bool,
    },
}
