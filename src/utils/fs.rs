//! File system utilities for locating market data files

use anyhow::{Context, Result};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Ensures a directory exists, creating it if necessary
pub fn ensure_dir(path: &Path) -> Result<()> {
    if !path.exists() {
        fs::create_dir_all(path)
            .with_context(|| format!("Failed to create directory: {:?}", path))?;
    } else if !path.is_dir() {
        return Err(io::Error::new(
            io::ErrorKind::AlreadyExists,
            format!("Path exists but is not a directory: {:?}", path),
        )
        .into());
    }
    Ok(())
}

/// Gets the application's data directory, creating it if it doesn't exist
pub fn app_data_dir() -> Result<PathBuf> {
    let dir = dirs::data_dir()
        .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, "Could not find data directory"))?
        .join("alphatrader");

    ensure_dir(&dir)?;
    Ok(dir)
}

/// Resolves a data file reference to a concrete path.
///
/// Absolute (or otherwise existing) paths pass through untouched; a bare file
/// name is looked up under `./data` first and the application data directory
/// second. The last candidate is returned even when nothing exists so the
/// caller gets a sensible path in its error message.
pub fn resolve_data_file<P: AsRef<Path>>(name: P) -> PathBuf {
    let name = name.as_ref();
    if name.is_absolute() || name.exists() {
        return name.to_path_buf();
    }

    let local = Path::new("data").join(name);
    if local.exists() {
        return local;
    }

    match app_data_dir() {
        Ok(dir) => dir.join(name),
        Err(_) => local,
    }
}

/// Reads a file to a string with context about the operation
pub fn read_file<P: AsRef<Path>>(path: P) -> Result<String> {
    let path = path.as_ref();
    fs::read_to_string(path).with_context(|| format!("Failed to read file: {}", path.display()))
}
