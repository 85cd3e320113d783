//! Persisting run results for downstream consumers.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Serialize;
use serde_json::ser::PrettyFormatter;

use crate::core::trace::RunResult;

/// File written inside the output directory of a development run.
pub const OUTPUT_FILE_NAME: &str = "output.txt";

/// Write `result` to `<dir>/output.txt` as 4-space indented JSON.
///
/// Creates `dir` (and parents) if needed. Returns the written path.
pub fn write_run_output(dir: &Path, result: &RunResult) -> Result<PathBuf> {
    fs::create_dir_all(dir).with_context(|| format!("create output dir {}", dir.display()))?;
    let path = dir.join(OUTPUT_FILE_NAME);
    let buf = to_indented_json(result)?;
    fs::write(&path, buf).with_context(|| format!("write {}", path.display()))?;
    Ok(path)
}

fn to_indented_json<T: Serialize>(value: &T) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    let mut serializer =
        serde_json::Serializer::with_formatter(&mut buf, PrettyFormatter::with_indent(b"    "));
    value
        .serialize(&mut serializer)
        .context("serialize run result")?;
    Ok(buf)
}
