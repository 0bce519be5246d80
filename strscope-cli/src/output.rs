use comfy_table::{presets, CellAlignment, ContentArrangement, Table};
use serde::Serialize;

use crate::app::GlobalOptions;

/// Emits `report` as pretty JSON under `--json`, otherwise hands it to `render`.
pub fn print_output<T: Serialize>(
    report: &T,
    global: &GlobalOptions,
    render: impl FnOnce(&T),
) -> anyhow::Result<()> {
    if !global.json {
        render(report);
        return Ok(());
    }
    println!("{}", serde_json::to_string_pretty(report)?);
    Ok(())
}

/// Render a decoded string for a single terminal line.
///
/// Control characters, quotes and backslashes are escaped; everything else, including
/// non-ASCII text, is shown as is. Values longer than `max_chars` end in `...`.
pub fn display_value(value: &str, max_chars: usize) -> String {
    let escaped: String = value.escape_debug().collect();
    if escaped.chars().count() <= max_chars {
        return format!("\"{escaped}\"");
    }
    let cut: String = escaped.chars().take(max_chars.saturating_sub(3)).collect();
    format!("\"{cut}...\"")
}

/// Borderless table with `headers`; columns listed in `numeric` are right-aligned.
pub fn table(headers: &[&str], numeric: &[usize]) -> Table {
    let mut table = Table::new();
    table
        .load_preset(presets::NOTHING)
        .set_content_arrangement(ContentArrangement::Disabled)
        .set_header(headers.iter().copied());

    let last = headers.len().saturating_sub(1);
    for (index, column) in table.column_iter_mut().enumerate() {
        if numeric.contains(&index) {
            column.set_cell_alignment(CellAlignment::Right);
        }
        // two spaces between columns, none at the edges
        column.set_padding((u16::from(index > 0), u16::from(index < last)));
    }
    table
}

/// Prints `table` line by line, each prefixed with `indent`.
pub fn print_table(table: &Table, indent: &str) {
    for line in table.lines() {
        println!("{indent}{}", line.trim_end());
    }
}
