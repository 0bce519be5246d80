use std::path::Path;

use anyhow::bail;
use serde::Serialize;

use crate::{app::GlobalOptions, commands::common::load_table, output::print_output};

#[derive(Debug, Serialize)]
struct Resolved {
    key: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    value: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

#[derive(Debug, Serialize)]
struct ResolveOutput {
    results: Vec<Resolved>,
}

pub fn run(path: &Path, keys: &[String], opts: &GlobalOptions) -> anyhow::Result<()> {
    let db = load_table(path, opts.encoding)?;

    let results: Vec<Resolved> = keys
        .iter()
        .map(|key| match db.resolve_key(key) {
            Ok(value) => Resolved {
                key: key.clone(),
                value: Some(value),
                error: None,
            },
            Err(e) => {
                log::debug!("{key}: {e:?}");
                Resolved {
                    key: key.clone(),
                    value: None,
                    error: Some(e.to_string()),
                }
            }
        })
        .collect();

    let failed = results.iter().filter(|r| r.error.is_some()).count();
    let output = ResolveOutput { results };

    print_output(&output, opts, |out| {
        for r in &out.results {
            match (&r.value, &r.error) {
                (Some(value), _) => println!("{}\t{value}", r.key),
                (None, Some(error)) => eprintln!("{}\terror: {error}", r.key),
                (None, None) => {}
            }
        }
    })?;

    if failed > 0 {
        bail!("{failed} of {} indices could not be resolved", keys.len());
    }
    Ok(())
}
