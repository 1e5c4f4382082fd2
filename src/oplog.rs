/// Persistence of executed rename mappings.
///
/// Each label owns one file, `{root}/{label}.log`, holding a pretty-printed
/// JSON array. Every element is an object mapping absolute source paths to
/// absolute destination paths, one object per executed mapping. The array is
/// append-only except for popping the last entry during a revert.
use crate::error::{RelameError, RelameResult};
use crate::plan::Mapping;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

/// One persisted mapping: absolute source → absolute destination.
pub type LogEntry = BTreeMap<String, String>;

/// The file backing a label under the given log root.
pub fn log_file(root: &Path, label: &str) -> PathBuf {
    root.join(format!("{label}.log"))
}

/// Reads and validates all entries for a label.
///
/// Any unreadable or schema-invalid file is a fatal [`RelameError::LogCorrupt`].
pub fn load(root: &Path, label: &str) -> RelameResult<Vec<LogEntry>> {
    let path = log_file(root, label);
    let text = fs::read_to_string(&path).map_err(|e| RelameError::LogCorrupt {
        path: path.clone(),
        reason: e.to_string(),
    })?;
    serde_json::from_str(&text).map_err(|e| RelameError::LogCorrupt {
        path,
        reason: e.to_string(),
    })
}

/// Appends one executed mapping to a label's log, resolving every path to
/// absolute form. With `overwrite` set, prior entries are discarded instead
/// of read back.
pub fn dump(root: &Path, label: &str, mapping: &Mapping, overwrite: bool) -> RelameResult<()> {
    let path = log_file(root, label);
    fs::create_dir_all(root).map_err(|e| RelameError::LogWriteFailure {
        path: path.clone(),
        source: e,
    })?;

    let mut entries = if !overwrite && path.exists() {
        load(root, label)?
    } else {
        Vec::new()
    };

    let mut entry = LogEntry::new();
    for (src, dst) in mapping.pairs() {
        entry.insert(absolute(src)?, absolute(dst)?);
    }
    entries.push(entry);

    write_entries(&path, &entries)
}

/// Removes and returns the last entry for a label, rewriting the remainder.
///
/// An empty or missing log is as fatal as a corrupt one.
pub fn pop(root: &Path, label: &str) -> RelameResult<LogEntry> {
    let path = log_file(root, label);
    let mut entries = load(root, label)?;
    let last = entries.pop().ok_or_else(|| RelameError::LogCorrupt {
        path: path.clone(),
        reason: "log has no entries".to_string(),
    })?;
    write_entries(&path, &entries)?;
    Ok(last)
}

fn write_entries(path: &Path, entries: &[LogEntry]) -> RelameResult<()> {
    let json =
        serde_json::to_string_pretty(entries).map_err(|e| RelameError::LogWriteFailure {
            path: path.to_path_buf(),
            source: std::io::Error::new(std::io::ErrorKind::InvalidData, e),
        })?;
    fs::write(path, json).map_err(|e| RelameError::LogWriteFailure {
        path: path.to_path_buf(),
        source: e,
    })
}

fn absolute(path: &Path) -> RelameResult<String> {
    let abs = std::path::absolute(path).map_err(|e| RelameError::Io {
        path: path.to_path_buf(),
        source: e,
    })?;
    Ok(abs.to_string_lossy().to_string())
}
