//! Command-line interface.
//!
//! This module owns the clap surface (`flatten`, `reindex`, `revert`), the
//! base-directory safety confirmation, and the orchestration that wires the
//! grouper, planner, renamer, and operation log together. The confirmation
//! prompt is an injected callable so tests can run non-interactively.

use crate::classify::InferOracle;
use crate::error::{RelameError, RelameResult};
use crate::group::Kind;
use crate::oplog;
use crate::output::{Output, Verbosity};
use crate::plan::{self, Mapping, ReindexOptions};
use crate::rename;
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};

/// Label for forward operations.
const COMMON_LABEL: &str = "common";
/// Label for reverted operations.
const REVERT_LABEL: &str = "revert";

/// Rename and reorganize media files with reversible batch operations.
#[derive(Debug, Parser)]
#[command(name = "relame", version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Suppress per-pair output.
    #[arg(long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Print extra detail about planning and logging.
    #[arg(long, global = true)]
    pub verbose: bool,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Move every file in the tree directly into BASE, named by its relative
    /// path with separators replaced by underscores.
    Flatten {
        /// Directory to flatten. Defaults to the current directory.
        base: Option<PathBuf>,
    },
    /// Rename entries to zero-padded serial names, grouped by detected type.
    Reindex {
        /// Directory to reindex. Defaults to the current directory.
        base: Option<PathBuf>,

        /// Renumber child directories 1..N.
        #[arg(short = 'D', long)]
        directories: bool,

        /// Rename cover images ("cover", "cover 2", ...). On by default.
        #[arg(short = 'c', long = "covers", overrides_with = "no_covers")]
        covers: bool,

        /// Leave cover images alone.
        #[arg(short = 'C', long = "no-covers")]
        no_covers: bool,

        /// Reindex images into an "image" subdirectory.
        #[arg(short = 'i', long)]
        images: bool,

        /// Reindex videos into a "video" subdirectory.
        #[arg(short = 'v', long)]
        videos: bool,

        /// Reindex audio files into an "audio" subdirectory.
        #[arg(short = 'a', long)]
        audio: bool,

        /// Reindex GIFs into a "gif" subdirectory.
        #[arg(long)]
        gif: bool,

        /// Reindex PDFs into a "pdf" subdirectory.
        #[arg(long)]
        pdf: bool,

        /// Reindex Photoshop files into a "psd" subdirectory.
        #[arg(long)]
        psd: bool,

        /// Reindex unrecognized files into an "others" subdirectory.
        #[arg(long)]
        unknown: bool,

        /// Minimum zero-padding width for serial numbers.
        #[arg(long, value_name = "N", default_value_t = 2)]
        align: usize,
    },
    /// Undo the most recent flatten or reindex.
    Revert,
}

/// Yes/no capability behind the safety prompt.
pub type ConfirmFn = dyn Fn(&str) -> bool;

/// Runs the CLI with the default log root (`~/.log/relame`) and an
/// interactive confirmation prompt.
pub fn run_cli(cli: Cli) -> RelameResult<()> {
    let log_root = default_log_root()?;
    run_with(cli, &log_root, &interactive_confirm)
}

/// Runs the CLI against an explicit log root and confirmation capability.
pub fn run_with(cli: Cli, log_root: &Path, confirm: &ConfirmFn) -> RelameResult<()> {
    let verbosity = if cli.quiet {
        Verbosity::Quiet
    } else if cli.verbose {
        Verbosity::Verbose
    } else {
        Verbosity::Normal
    };
    let out = Output::new(verbosity);

    match cli.command {
        Command::Flatten { base } => {
            let base = resolve_base(base)?;
            if !confirmed(&base, &out, confirm) {
                return Ok(());
            }
            run_flatten(&base, log_root, out)
        }
        Command::Reindex {
            base,
            directories,
            covers,
            no_covers,
            images,
            videos,
            audio,
            gif,
            pdf,
            psd,
            unknown,
            align,
        } => {
            let base = resolve_base(base)?;
            if !confirmed(&base, &out, confirm) {
                return Ok(());
            }
            let toggles = [images, videos, audio, gif, pdf, psd, unknown];
            let kinds = Kind::REINDEXABLE
                .into_iter()
                .zip(toggles)
                .filter_map(|(kind, enabled)| enabled.then_some(kind))
                .collect();
            let options = ReindexOptions {
                directories,
                covers: covers || !no_covers,
                kinds,
                align,
            };
            run_reindex(&base, &options, log_root, out)
        }
        Command::Revert => run_revert(log_root, out),
    }
}

fn run_flatten(base: &Path, log_root: &Path, out: Output) -> RelameResult<()> {
    let mapping = plan::flatten(base)?;
    if mapping.is_empty() {
        out.info("Nothing to flatten.");
        return Ok(());
    }
    out.detail(&format!("Planned {} renames.", mapping.len()));

    rename::apply(&mapping, base, &mut |src, dst| out.pair(src, dst))?;
    plan::remove_empty_dirs(base)?;
    oplog::dump(log_root, COMMON_LABEL, &mapping, false)?;
    out.detail(&format!(
        "Logged to {}.",
        oplog::log_file(log_root, COMMON_LABEL).display()
    ));
    out.success(&format!("Flattened {} files.", mapping.len()));
    Ok(())
}

fn run_reindex(
    base: &Path,
    options: &ReindexOptions,
    log_root: &Path,
    out: Output,
) -> RelameResult<()> {
    let mapping = plan::reindex(base, options, &InferOracle)?;
    if mapping.is_empty() {
        out.info("Nothing to reindex.");
        return Ok(());
    }
    out.detail(&format!("Planned {} renames.", mapping.len()));

    rename::apply(&mapping, base, &mut |src, dst| out.pair(src, dst))?;
    oplog::dump(log_root, COMMON_LABEL, &mapping, false)?;
    out.detail(&format!(
        "Logged to {}.",
        oplog::log_file(log_root, COMMON_LABEL).display()
    ));
    out.success(&format!("Reindexed {} entries.", mapping.len()));
    Ok(())
}

fn run_revert(log_root: &Path, out: Output) -> RelameResult<()> {
    let entry = oplog::pop(log_root, COMMON_LABEL)?;
    if entry.is_empty() {
        out.info("Last operation renamed nothing; nothing to revert.");
        return Ok(());
    }

    let mut mapping = Mapping::new();
    for (source, destination) in &entry {
        mapping.push(PathBuf::from(destination), PathBuf::from(source));
    }

    // Staging must share a filesystem with the files being moved back; the
    // parent of the first reverted file qualifies.
    let staging_root = mapping
        .pairs()
        .first()
        .and_then(|(src, _)| src.parent())
        .map(Path::to_path_buf)
        .ok_or_else(|| RelameError::LogCorrupt {
            path: oplog::log_file(log_root, COMMON_LABEL),
            reason: "entry holds a path without a parent directory".to_string(),
        })?;

    rename::apply(&mapping, &staging_root, &mut |src, dst| out.pair(src, dst))?;
    oplog::dump(log_root, REVERT_LABEL, &mapping, false)?;
    out.success(&format!("Reverted {} entries.", mapping.len()));
    Ok(())
}

/// Default log root, `~/.log/relame`.
fn default_log_root() -> RelameResult<PathBuf> {
    dirs::home_dir()
        .map(|home| home.join(".log").join("relame"))
        .ok_or_else(|| RelameError::NotFound {
            path: PathBuf::from("~/.log/relame"),
        })
}

fn resolve_base(base: Option<PathBuf>) -> RelameResult<PathBuf> {
    let base = base.unwrap_or_else(|| PathBuf::from("."));
    base.canonicalize().map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            RelameError::NotFound { path: base }
        } else {
            RelameError::Io { path: base, source: e }
        }
    })
}

/// Whether operating on `base` needs an explicit go-ahead: anything outside
/// `/media` and outside the home directory, or the home directory itself.
fn needs_confirmation(base: &Path) -> bool {
    if base.starts_with("/media") {
        return false;
    }
    match dirs::home_dir() {
        Some(home) => base == home || !base.starts_with(&home),
        None => true,
    }
}

fn confirmed(base: &Path, out: &Output, confirm: &ConfirmFn) -> bool {
    if !needs_confirmation(base) {
        return true;
    }
    let prompt = format!(
        "{} is outside /media and not under your home directory. Continue?",
        base.display()
    );
    if confirm(&prompt) {
        true
    } else {
        out.info("Aborted.");
        false
    }
}

fn interactive_confirm(prompt: &str) -> bool {
    dialoguer::Confirm::new()
        .with_prompt(prompt)
        .default(false)
        .interact()
        .unwrap_or(false)
}
