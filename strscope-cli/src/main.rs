mod app;
mod commands;
mod output;

use clap::Parser;

use crate::app::{Cli, Command};

fn init_logging(verbose: bool) {
    let level = if verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };
    // RUST_LOG takes precedence over -v
    env_logger::Builder::new()
        .filter_module("strscope", level)
        .parse_default_env()
        .format_timestamp(None)
        .format_target(false)
        .init();
}

fn main() -> anyhow::Result<()> {
    ctrlc::set_handler(|| {
        eprintln!("\ninterrupted");
        std::process::exit(130);
    })?;

    let cli = Cli::parse();
    // keep stderr quiet so --json output can be piped
    if !cli.global.json {
        init_logging(cli.global.verbose);
    }

    let global = &cli.global;
    match &cli.command {
        Command::Info { path } => commands::info::run(path, global),
        Command::Dump { path, limit } => commands::dump::run(path, *limit, global),
        Command::Resolve { path, indices } => commands::resolve::run(path, indices, global),
        Command::Check { path } => commands::check::run(path, global),
        Command::Pack {
            input,
            output,
            binary,
        } => commands::pack::run(input, output, *binary, global),
    }
}
