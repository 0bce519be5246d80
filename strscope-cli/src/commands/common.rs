use std::path::Path;

use anyhow::Context;
use strscope::{file::TableEncoding, StringDatabase};

/// Load a string table in the requested storage form.
pub fn load_table(path: &Path, encoding: TableEncoding) -> anyhow::Result<StringDatabase> {
    StringDatabase::from_path_with_encoding(path, encoding)
        .with_context(|| format!("failed to load string table: {}", path.display()))
}

/// Storage form the table at `path` actually uses.
pub fn detect_encoding(path: &Path, requested: TableEncoding) -> anyhow::Result<TableEncoding> {
    if requested != TableEncoding::Auto {
        return Ok(requested);
    }
    let data =
        std::fs::read(path).with_context(|| format!("failed to read: {}", path.display()))?;
    Ok(requested.resolve(&data))
}

/// Extract a display-friendly filename from a path.
pub fn file_display_name(path: &Path) -> String {
    path.file_name().map_or_else(
        || path.display().to_string(),
        |f| f.to_string_lossy().to_string(),
    )
}
