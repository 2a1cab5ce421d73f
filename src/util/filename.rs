//! Segment file naming conventions.

use std::io;
use std::path::{Path, PathBuf};

/// Generate a segment file path: `seg_{id}.log`.
pub fn segment_file_path(dir: &Path, id: u32) -> PathBuf {
    dir.join(format!("seg_{}.log", id))
}

/// Parse a segment file name and return its id.
///
/// Returns `None` if the name doesn't match the `seg_{id}.log` pattern.
pub fn parse_segment_file_name(name: &str) -> Option<u32> {
    let id = name.strip_prefix("seg_")?.strip_suffix(".log")?;
    if id.is_empty() || !id.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    id.parse().ok()
}

/// List the ids of all segment files in a directory, ascending.
///
/// Non-matching entries and directories are ignored.
pub fn list_segment_ids(dir: &Path) -> io::Result<Vec<u32>> {
    let mut ids = Vec::new();

    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        if entry.file_type()?.is_dir() {
            continue;
        }
        let name = entry.file_name();
        if let Some(id) = parse_segment_file_name(&name.to_string_lossy()) {
            ids.push(id);
        }
    }

    ids.sort_unstable();
    Ok(ids)
}

/// Create directory if it doesn't exist.
pub fn create_dir_if_missing(path: &Path) -> io::Result<()> {
    match std::fs::create_dir_all(path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::AlreadyExists => Ok(()),
        Err(e) => Err(e),
    }
}
