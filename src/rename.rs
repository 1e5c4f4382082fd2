/// Two-phase execution of a rename mapping.
///
/// Destinations may overlap with sources (cyclic or chained renames), so the
/// mapping is executed through a uniquely-created staging directory inside
/// the base: pass one moves every source into staging under its pair index,
/// pass two moves every staged file to its real destination. Staging by pair
/// index keeps destinations with equal file names in different directories
/// apart. Single moves are atomic at the OS level; the staging directory
/// lives in the same parent so no move crosses a filesystem boundary.
///
/// An aborted run never discards staged content: files still parked in
/// staging are moved back to their vacated sources, and any file that cannot
/// go back keeps the staging directory on disk instead of being removed with
/// it.
use crate::error::{RelameError, RelameResult};
use crate::plan::Mapping;
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

fn io_error(path: &Path, source: std::io::Error) -> RelameError {
    RelameError::Io {
        path: path.to_path_buf(),
        source,
    }
}

/// Validates the mapping's collision invariants against the current tree.
///
/// Every source and every destination must be unique, and a destination must
/// not point at an existing path unless that path is itself one of the
/// mapping's sources (and therefore vacated during pass one).
fn check_collisions(mapping: &Mapping) -> RelameResult<()> {
    let mut sources: HashSet<&PathBuf> = HashSet::new();
    for (src, _) in mapping.pairs() {
        if !sources.insert(src) {
            return Err(RelameError::SourceCollision {
                source: src.clone(),
            });
        }
    }

    let mut destinations: HashSet<&PathBuf> = HashSet::new();
    for (_, dst) in mapping.pairs() {
        if !destinations.insert(dst) {
            return Err(RelameError::DestinationCollision {
                destination: dst.clone(),
            });
        }
        if dst.exists() && !sources.contains(dst) {
            return Err(RelameError::DestinationCollision {
                destination: dst.clone(),
            });
        }
    }
    Ok(())
}

/// Applies a mapping through a staging directory created inside `base`.
///
/// `report` is called once per completed pair, after its pass-two move. The
/// staging directory is removed when the mapping has been fully applied; if
/// either pass fails, staged files go back to their sources first.
pub fn apply(
    mapping: &Mapping,
    base: &Path,
    report: &mut dyn FnMut(&Path, &Path),
) -> RelameResult<()> {
    if mapping.is_empty() {
        return Ok(());
    }
    check_collisions(mapping)?;

    let staging = tempfile::Builder::new()
        .prefix(".relame-staging-")
        .tempdir_in(base)
        .map_err(|e| io_error(base, e))?;

    let mut staged = Vec::new();
    let result = run_passes(mapping, staging.path(), &mut staged, report);
    if result.is_err() {
        restore_staged(mapping, staging, &staged);
    }
    // On success TempDir removes the (now empty) staging directory on drop.
    result
}

/// Pass one parks every source under its pair index; pass two moves each
/// parked file to its destination. `staged` tracks the pairs currently
/// parked so an aborted run can put them back.
fn run_passes(
    mapping: &Mapping,
    staging: &Path,
    staged: &mut Vec<usize>,
    report: &mut dyn FnMut(&Path, &Path),
) -> RelameResult<()> {
    for (index, (src, _)) in mapping.pairs().iter().enumerate() {
        let parked = staging.join(index.to_string());
        fs::rename(src, &parked).map_err(|e| io_error(src, e))?;
        staged.push(index);
    }

    for (index, (src, dst)) in mapping.pairs().iter().enumerate() {
        if let Some(parent) = dst.parent()
            && !parent.exists()
        {
            fs::create_dir_all(parent).map_err(|e| io_error(parent, e))?;
        }
        let parked = staging.join(index.to_string());
        fs::rename(&parked, dst).map_err(|e| io_error(dst, e))?;
        staged.retain(|&i| i != index);
        report(src, dst);
    }
    Ok(())
}

/// Unwinds an aborted run: every still-parked file is moved back to its
/// source, which pass one vacated. A source re-occupied by a completed
/// pass-two move is left alone, and the staging directory is then kept on
/// disk so no staged content is ever dropped with it.
fn restore_staged(mapping: &Mapping, staging: TempDir, staged: &[usize]) {
    let mut stuck = false;
    for &index in staged {
        let parked = staging.path().join(index.to_string());
        let restored = mapping
            .pairs()
            .get(index)
            .is_some_and(|(src, _)| !src.exists() && fs::rename(&parked, src).is_ok());
        if !restored {
            stuck = true;
        }
    }
    if stuck {
        let _ = staging.keep();
    }
}
