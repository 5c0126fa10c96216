//! Input file discovery
//!
//! The device writes its log as numbered files (`RESmart.000`, `RESmart.001`,
//! ...). Every regular file whose extension is exactly three digits is an
//! input; files are processed in lexical name order.

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

/// True if the path ends in a three-digit extension
pub fn is_numbered_log(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.len() == 3 && ext.bytes().all(|b| b.is_ascii_digit()))
        .unwrap_or(false)
}

/// Find numbered log files in `dir`, sorted by file name
pub fn discover_input_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let entries = fs::read_dir(dir)
        .with_context(|| format!("Failed to read input directory: {:?}", dir))?;

    let mut files = Vec::new();
    for entry in entries {
        let entry = entry.with_context(|| format!("Failed to list {:?}", dir))?;
        let path = entry.path();
        if path.is_file() && is_numbered_log(&path) {
            files.push(path);
        }
    }

    files.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    log::debug!("Found {} input files in {:?}", files.len(), dir);
    Ok(files)
}
