use std::path::Path;

use anyhow::bail;
use serde::Serialize;
use strscope::Error;

use crate::{
    app::GlobalOptions,
    commands::common::{file_display_name, load_table},
    output::{print_output, print_table, table},
};

#[derive(Debug, Serialize)]
struct Failure {
    index: u32,
    kind: &'static str,
    message: String,
}

#[derive(Debug, Serialize)]
struct CheckResult {
    file: String,
    valid: bool,
    entry_count: u32,
    decoded: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    error_message: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    failures: Vec<Failure>,
}

fn failure_kind(error: &Error) -> &'static str {
    match error {
        Error::Malformed { .. } | Error::OutOfBounds => "structure",
        Error::InvalidEncoding { .. } => "encoding",
        Error::IndexOutOfRange { .. } => "range",
        _ => "other",
    }
}

pub fn run(path: &Path, opts: &GlobalOptions) -> anyhow::Result<()> {
    let mut result = CheckResult {
        file: file_display_name(path),
        valid: true,
        entry_count: 0,
        decoded: 0,
        error_message: None,
        failures: Vec::new(),
    };

    match load_table(path, opts.encoding) {
        Ok(db) => {
            result.entry_count = db.entry_count();
            for index in 1..=db.entry_count() {
                match db.resolve(index) {
                    Ok(_) => result.decoded += 1,
                    Err(e) => result.failures.push(Failure {
                        index,
                        kind: failure_kind(&e),
                        message: e.to_string(),
                    }),
                }
            }
            result.valid = result.failures.is_empty();
        }
        Err(e) => {
            result.valid = false;
            result.error_message = Some(format!("{e:#}"));
        }
    }

    print_output(&result, opts, |r| {
        let status = if r.valid { "PASS" } else { "FAIL" };
        println!(
            "{status}  {file}  ({decoded}/{count} entries decoded)",
            file = r.file,
            decoded = r.decoded,
            count = r.entry_count
        );
        if let Some(err) = &r.error_message {
            println!("  Error: {err}");
        }
        if !r.failures.is_empty() {
            let mut failures = table(&["Index", "Kind", "Error"], &[0]);
            for f in &r.failures {
                failures.add_row(vec![f.index.to_string(), f.kind.to_string(), f.message.clone()]);
            }
            print_table(&failures, "  ");
        }
    })?;

    if !result.valid {
        bail!("{} failed the check", path.display());
    }
    Ok(())
}
