/// Planning of batch rename operations.
///
/// A plan is a [`Mapping`] of source to destination paths, computed against a
/// frozen classification snapshot. Four operation modes exist: flatten,
/// reindex directories, reindex covers, and reindex by type. All reindex
/// sub-operations of one invocation share a single combined mapping so they
/// are applied and logged together.
use crate::classify::{Entry, MimeOracle};
use crate::error::{RelameError, RelameResult};
use crate::group::{self, Kind};
use crate::sequence;
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// An ordered set of source → destination pairs with unique sources and
/// unique destinations.
#[derive(Debug, Default, Clone)]
pub struct Mapping {
    pairs: Vec<(PathBuf, PathBuf)>,
}

impl Mapping {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, source: PathBuf, destination: PathBuf) {
        self.pairs.push((source, destination));
    }

    pub fn pairs(&self) -> &[(PathBuf, PathBuf)] {
        &self.pairs
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }
}

/// Which reindex sub-operations to run, and how to pad serial numbers.
#[derive(Debug, Clone)]
pub struct ReindexOptions {
    /// Renumber direct child directories.
    pub directories: bool,
    /// Rename cover images ("cover", "cover 2", ...). On by default.
    pub covers: bool,
    /// Type kinds to move into their own serial-named subdirectories.
    pub kinds: Vec<Kind>,
    /// Minimum zero-padding width for serial numbers.
    pub align: usize,
}

impl Default for ReindexOptions {
    fn default() -> Self {
        Self {
            directories: false,
            covers: true,
            kinds: Vec::new(),
            align: 2,
        }
    }
}

fn ensure_directory(base: &Path) -> RelameResult<()> {
    if !base.exists() {
        return Err(RelameError::NotFound {
            path: base.to_path_buf(),
        });
    }
    if !base.is_dir() {
        return Err(RelameError::NotADirectory {
            path: base.to_path_buf(),
        });
    }
    Ok(())
}

fn walk_error(base: &Path, error: walkdir::Error) -> RelameError {
    let path = error
        .path()
        .map(Path::to_path_buf)
        .unwrap_or_else(|| base.to_path_buf());
    match error.into_io_error() {
        Some(source) => RelameError::Io { path, source },
        None => RelameError::NotFound { path },
    }
}

/// Zero-padding width for `count` serials: at least `align`, wider when the
/// count itself needs more digits.
fn pad_width(align: usize, count: usize) -> usize {
    align.max(count.to_string().len())
}

/// Plans moving every file under `base` directly into `base`, named by its
/// path segments relative to `base` joined with underscores.
///
/// Pairs whose destination equals the source are skipped. A destination that
/// already exists, or that another pair already claims, is a collision error.
pub fn flatten(base: &Path) -> RelameResult<Mapping> {
    ensure_directory(base)?;

    let mut mapping = Mapping::new();
    let mut claimed: HashSet<PathBuf> = HashSet::new();

    for item in WalkDir::new(base).min_depth(1).sort_by_file_name() {
        let item = item.map_err(|e| walk_error(base, e))?;
        if !item.file_type().is_file() {
            continue;
        }
        let rel = item.path().strip_prefix(base).map_err(|e| RelameError::Io {
            path: item.path().to_path_buf(),
            source: std::io::Error::new(std::io::ErrorKind::InvalidInput, e),
        })?;
        let joined = rel
            .components()
            .map(|c| c.as_os_str().to_string_lossy().to_string())
            .collect::<Vec<_>>()
            .join("_");
        let destination = base.join(joined);

        if destination == item.path() {
            continue;
        }
        if destination.exists() || !claimed.insert(destination.clone()) {
            return Err(RelameError::DestinationCollision { destination });
        }
        mapping.push(item.path().to_path_buf(), destination);
    }
    Ok(mapping)
}

/// Removes now-empty subdirectories left behind by a flatten, deepest first.
///
/// Directories that still hold something (anything flatten would not move,
/// such as symlinks) are left in place.
pub fn remove_empty_dirs(base: &Path) -> RelameResult<()> {
    for item in WalkDir::new(base).min_depth(1).contents_first(true) {
        let item = item.map_err(|e| walk_error(base, e))?;
        if item.file_type().is_dir() {
            let _ = fs::remove_dir(item.path());
        }
    }
    Ok(())
}

/// Plans one combined reindex mapping over the direct children of `base`.
pub fn reindex(
    base: &Path,
    options: &ReindexOptions,
    oracle: &dyn MimeOracle,
) -> RelameResult<Mapping> {
    ensure_directory(base)?;
    let mut groups = group::collect(base, false, oracle)?;
    let mut mapping = Mapping::new();

    if options.directories {
        plan_directories(base, groups.take(Kind::Directory), options.align, &mut mapping);
    }
    if options.covers {
        plan_covers(base, groups.take(Kind::Cover), &mut mapping);
    }
    for kind in &options.kinds {
        plan_type_bucket(base, *kind, groups.take(*kind), options.align, &mut mapping)?;
    }
    Ok(mapping)
}

/// Renumbers child directories 1..N, indexed entries first.
///
/// A directory whose name starts with digits keeps those digits as its sort
/// serial and the remainder (minus leading "- " or spaces) as its display
/// name. The rest sort lexicographically after the indexed ones.
fn plan_directories(base: &Path, bucket: Vec<Entry>, align: usize, mapping: &mut Mapping) {
    let mut indexed: Vec<(u64, String, Entry)> = Vec::new();
    let mut unindexed: Vec<(String, Entry)> = Vec::new();

    for entry in bucket {
        let name = entry.name();
        let digits: String = name.chars().take_while(char::is_ascii_digit).collect();
        match digits.parse::<u64>() {
            Ok(serial) => {
                let display = display_name(&name[digits.len()..]);
                indexed.push((serial, display, entry));
            }
            Err(_) => unindexed.push((name, entry)),
        }
    }

    indexed.sort_by(|a, b| (a.0, &a.1).cmp(&(b.0, &b.1)));
    unindexed.sort_by(|a, b| a.0.cmp(&b.0));

    let total = indexed.len() + unindexed.len();
    let width = pad_width(align, total);
    let ordered = indexed
        .into_iter()
        .map(|(_, display, entry)| (display, entry))
        .chain(unindexed);

    for (serial, (display, entry)) in (1..).zip(ordered) {
        let new_name = if display.is_empty() {
            format!("{serial:0width$}")
        } else {
            format!("{serial:0width$} - {display}")
        };
        let destination = base.join(new_name);
        if destination != entry.path {
            mapping.push(entry.path, destination);
        }
    }
}

/// Strips leading spaces and a leading "- " from a directory name remainder.
fn display_name(rest: &str) -> String {
    let rest = rest.trim_start();
    match rest.strip_prefix('-') {
        Some(stripped) => stripped.trim_start().to_string(),
        None => rest.to_string(),
    }
}

/// Names covers "cover", "cover 2", ... ordered by case-insensitive stem.
fn plan_covers(base: &Path, mut bucket: Vec<Entry>, mapping: &mut Mapping) {
    bucket.sort_by_key(|e| e.stem().to_lowercase());
    for (index, entry) in bucket.into_iter().enumerate() {
        let name = if index == 0 {
            format!("cover{}", entry.suffix)
        } else {
            format!("cover {}{}", index + 1, entry.suffix)
        };
        let destination = base.join(name);
        if destination != entry.path {
            mapping.push(entry.path, destination);
        }
    }
}

/// Plans serial names for one type bucket inside its own subdirectory.
///
/// The target subdirectory is created here when missing; a pre-existing
/// non-empty target aborts the whole run.
fn plan_type_bucket(
    base: &Path,
    kind: Kind,
    mut bucket: Vec<Entry>,
    align: usize,
    mapping: &mut Mapping,
) -> RelameResult<()> {
    if bucket.is_empty() {
        return Ok(());
    }

    let target = base.join(kind.dir_name());
    if target.exists() {
        if !target.is_dir() {
            return Err(RelameError::NonEmptyTarget { path: target });
        }
        let mut contents = fs::read_dir(&target).map_err(|e| RelameError::Io {
            path: target.clone(),
            source: e,
        })?;
        if contents.next().is_some() {
            return Err(RelameError::NonEmptyTarget { path: target });
        }
    } else {
        fs::create_dir(&target).map_err(|e| RelameError::Io {
            path: target.clone(),
            source: e,
        })?;
    }

    sequence::order(&mut bucket);
    let width = pad_width(align, bucket.len());
    for (serial, entry) in (1..).zip(bucket) {
        let destination = target.join(format!("{serial:0width$}{}", entry.suffix));
        mapping.push(entry.path, destination);
    }
    Ok(())
}
