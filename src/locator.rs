//! Finding EQ Bank exports on disk.

use crate::error::{Error, Result};
use once_cell::sync::Lazy;
use regex::Regex;
use std::fs;
use std::path::{Path, PathBuf};

// e.g. "123456789 Details" or "123456789 Details(2)"
static STEM_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[0-9]+\s*Details(\([0-9]+\))?$").unwrap());

/// Directory searched when none is given on the command line.
///
/// `~/Downloads` on Unix-like systems, the Downloads known folder on Windows,
/// and the home directory when neither is available.
pub fn default_search_dir() -> Result<PathBuf> {
    let downloads = if cfg!(windows) {
        dirs::download_dir()
    } else {
        dirs::home_dir().map(|home| home.join("Downloads"))
    };

    match downloads {
        Some(dir) if dir.is_dir() => Ok(dir),
        _ => dirs::home_dir().ok_or(Error::NoDefaultDirectory),
    }
}

/// Expand a leading `~` to the user's home directory.
pub fn expand_home(path: &Path) -> PathBuf {
    match path.strip_prefix("~") {
        Ok(rest) => match dirs::home_dir() {
            Some(home) => home.join(rest),
            None => path.to_path_buf(),
        },
        Err(_) => path.to_path_buf(),
    }
}

/// True when `file_name` looks like an EQ Bank transaction export.
pub fn is_statement_file_name(file_name: &str) -> bool {
    let path = Path::new(file_name);

    let extension_matches = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| {
            if cfg!(windows) {
                ext.eq_ignore_ascii_case("csv")
            } else {
                ext == "csv"
            }
        });
    if !extension_matches {
        return false;
    }

    path.file_stem()
        .and_then(|stem| stem.to_str())
        .is_some_and(|stem| STEM_PATTERN.is_match(stem))
}

/// Non-empty EQ Bank exports directly inside `dir`, sorted by path.
pub fn find_csv_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut matching = Vec::new();

    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();

        let Some(file_name) = path.file_name().and_then(|name| name.to_str()) else {
            continue;
        };
        if !is_statement_file_name(file_name) {
            tracing::debug!("Skipping {}: name does not match", file_name);
            continue;
        }

        // Follows symlinks, like a glob match would
        let metadata = match fs::metadata(&path) {
            Ok(metadata) => metadata,
            Err(e) => {
                tracing::debug!("Skipping {}: {}", file_name, e);
                continue;
            }
        };
        if !metadata.is_file() {
            continue;
        }
        if metadata.len() == 0 {
            tracing::debug!("Skipping {}: file is empty", file_name);
            continue;
        }

        matching.push(path);
    }

    matching.sort();
    tracing::info!("Found {} matching files in {}", matching.len(), dir.display());

    Ok(matching)
}
