use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};

/// Resolves the input path to the files to process: the path itself when
/// it names a file, or every direct child of a directory carrying the
/// given extension (matched case-insensitively), sorted for stable runs.
pub fn gather_inputs(input: &Path, extension: &str) -> Result<Vec<PathBuf>> {
    if input.is_dir() {
        let mut files = Vec::new();
        for entry in fs::read_dir(input)
            .with_context(|| format!("reading input directory {}", input.display()))?
        {
            let path = entry?.path();
            if path.is_file() && has_extension(&path, extension) {
                files.push(path);
            }
        }
        files.sort();
        return Ok(files);
    }

    if input.is_file() {
        return Ok(vec![input.to_path_buf()]);
    }

    bail!("given input path \"{}\" does not exist", input.display());
}

pub fn has_extension(path: &Path, extension: &str) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case(extension))
}

pub fn ensure_output_dir(output: &Path) -> Result<()> {
    if !output.is_dir() {
        bail!("output path \"{}\" is not a directory", output.display());
    }
    Ok(())
}

/// Lower-cased file stem, used for palette-to-asset name matching.
pub fn file_stem_lower(path: &Path) -> String {
    path.file_stem()
        .and_then(|stem| stem.to_str())
        .unwrap_or_default()
        .to_lowercase()
}

/// Writes a fully materialized output file; a failed write removes the
/// partial file instead of leaving it behind.
pub fn write_file(path: &Path, bytes: &[u8]) -> Result<()> {
    if let Err(err) = fs::write(path, bytes) {
        let _ = fs::remove_file(path);
        return Err(err).with_context(|| format!("writing {}", path.display()));
    }
    Ok(())
}
