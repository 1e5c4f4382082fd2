//! relame - rename and reorganize media files by detected type.
//!
//! This library classifies a directory's entries by sniffed media type,
//! derives a canonical ordering for each bucket, plans zero-padded serial
//! renames, executes them collision-free in two phases through a staging
//! directory, and records every executed mapping in an append-only JSON log
//! so operations can be reverted.

pub mod classify;
pub mod cli;
pub mod error;
pub mod group;
pub mod oplog;
pub mod output;
pub mod plan;
pub mod rename;
pub mod sequence;

pub use classify::{Entry, InferOracle, MimeOracle};
pub use error::{RelameError, RelameResult};
pub use group::{Groups, Kind};
pub use plan::{Mapping, ReindexOptions};

pub use cli::{Cli, Command, run_cli, run_with};
