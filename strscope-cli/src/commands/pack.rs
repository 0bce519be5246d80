use std::path::Path;

use anyhow::Context;
use serde::Serialize;
use strscope::{StringDatabase, StringTableBuilder};

use crate::{
    app::GlobalOptions,
    commands::common::file_display_name,
    output::print_output,
};

#[derive(Debug, Serialize)]
struct PackResult {
    output: String,
    format: &'static str,
    entry_count: u32,
    table_size: usize,
    written: usize,
}

pub fn run(input: &Path, output: &Path, binary: bool, opts: &GlobalOptions) -> anyhow::Result<()> {
    let strings = std::fs::read_to_string(input)
        .with_context(|| format!("failed to read strings file: {}", input.display()))?;

    let mut builder = StringTableBuilder::new();
    for (line_no, line) in strings.lines().enumerate() {
        builder
            .push(line)
            .with_context(|| format!("{}:{}: cannot add string", input.display(), line_no + 1))?;
    }

    let table = builder.build().context("failed to build string table")?;
    // re-read what was built so a broken layout never reaches disk
    let db = StringDatabase::from_mem(table.clone()).context("built table does not decode")?;

    let contents = if binary {
        table.clone()
    } else {
        strscope::file::text::encode(&table).into_bytes()
    };
    std::fs::write(output, &contents)
        .with_context(|| format!("failed to write: {}", output.display()))?;
    log::info!("packed {} strings into {}", db.entry_count(), output.display());

    let result = PackResult {
        output: file_display_name(output),
        format: if binary { "binary" } else { "text" },
        entry_count: db.entry_count(),
        table_size: table.len(),
        written: contents.len(),
    };

    print_output(&result, opts, |r| {
        println!("Output:   {}", r.output);
        println!("Format:   {}", r.format);
        println!("Entries:  {}", r.entry_count);
        println!("Table:    {} bytes", r.table_size);
        println!("Written:  {} bytes", r.written);
    })
}
