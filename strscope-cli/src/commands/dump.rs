use std::path::Path;

use serde::Serialize;

use crate::{
    app::GlobalOptions,
    commands::common::load_table,
    output::{display_value, print_output, print_table, table},
};

#[derive(Debug, Serialize)]
struct DumpEntry {
    index: u32,
    offset: u32,
    length: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    value: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

#[derive(Debug, Serialize)]
struct DumpOutput {
    entry_count: u32,
    shown: usize,
    entries: Vec<DumpEntry>,
}

pub fn run(path: &Path, limit: Option<usize>, opts: &GlobalOptions) -> anyhow::Result<()> {
    let db = load_table(path, opts.encoding)?;
    let limit = limit.unwrap_or(usize::MAX);

    let mut entries = Vec::new();
    for entry in db.entries().take(limit) {
        let entry = entry?;
        let (value, error) = match db.resolve(entry.index) {
            Ok(value) => (Some(value), None),
            Err(e) => (None, Some(e.to_string())),
        };
        entries.push(DumpEntry {
            index: entry.index,
            offset: entry.offset,
            length: entry.length,
            value,
            error,
        });
    }

    let output = DumpOutput {
        entry_count: db.entry_count(),
        shown: entries.len(),
        entries,
    };

    print_output(&output, opts, |out| {
        let mut rows = table(&["Index", "Offset", "Length", "Value"], &[0, 1, 2]);
        for e in &out.entries {
            let value = match (&e.value, &e.error) {
                (Some(value), _) => display_value(value, 80),
                (None, Some(error)) => format!("<{error}>"),
                (None, None) => String::new(),
            };
            rows.add_row(vec![
                e.index.to_string(),
                format!("0x{:x}", e.offset),
                e.length.to_string(),
                value,
            ]);
        }
        print_table(&rows, "");

        if out.shown < out.entry_count as usize {
            println!("\n{} of {} entries shown", out.shown, out.entry_count);
        }
    })
}
