use std::path::Path;

use anyhow::Context;
use serde::Serialize;

use crate::{
    app::GlobalOptions,
    commands::common::{detect_encoding, file_display_name, load_table},
    output::print_output,
};

#[derive(Debug, Serialize)]
pub struct TableInfo {
    pub file: String,
    pub encoding: String,
    pub file_size: u64,
    pub table_size: usize,
    pub index_size: u32,
    pub entry_count: u32,
    pub payload_start: usize,
    pub payload_size: usize,
}

pub fn run(path: &Path, opts: &GlobalOptions) -> anyhow::Result<()> {
    let db = load_table(path, opts.encoding)?;
    let file_size = std::fs::metadata(path)
        .with_context(|| format!("failed to stat: {}", path.display()))?
        .len();

    let info = TableInfo {
        file: file_display_name(path),
        encoding: detect_encoding(path, opts.encoding)?.to_string(),
        file_size,
        table_size: db.len(),
        index_size: db.index_size(),
        entry_count: db.entry_count(),
        payload_start: db.payload_start(),
        payload_size: db.payload_len(),
    };

    print_output(&info, opts, |info| {
        println!("File:           {}", info.file);
        println!("Encoding:       {}", info.encoding);
        println!("File size:      {} bytes", info.file_size);
        if info.table_size as u64 != info.file_size {
            println!("Decoded size:   {} bytes", info.table_size);
        }
        println!("Index size:     {} bytes", info.index_size);
        println!("Entries:        {}", info.entry_count);
        println!("Payload start:  0x{:x}", info.payload_start);
        println!("Payload size:   {} bytes", info.payload_size);
    })
}
