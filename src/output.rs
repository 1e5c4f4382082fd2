//! Output formatting and styling.
//!
//! All user-facing printing goes through [`Output`] so the quiet and verbose
//! flags apply uniformly. Applied rename pairs print as diff-style lines:
//! the source in red, the destination in green.

use colored::*;
use std::path::Path;

/// How much to print.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verbosity {
    Quiet,
    Normal,
    Verbose,
}

/// User-facing printer carrying the run's verbosity level.
#[derive(Debug, Clone, Copy)]
pub struct Output {
    verbosity: Verbosity,
}

impl Output {
    pub fn new(verbosity: Verbosity) -> Self {
        Self { verbosity }
    }

    pub fn is_quiet(&self) -> bool {
        self.verbosity == Verbosity::Quiet
    }

    /// Prints one applied rename pair, diff-style.
    pub fn pair(&self, source: &Path, destination: &Path) {
        if self.is_quiet() {
            return;
        }
        println!("{}", format!("- {}", source.display()).red());
        println!("{}", format!("+ {}", destination.display()).green());
    }

    /// Prints an informational line.
    pub fn info(&self, message: &str) {
        if !self.is_quiet() {
            println!("{}", message.cyan());
        }
    }

    /// Prints a line only at verbose level.
    pub fn detail(&self, message: &str) {
        if self.verbosity == Verbosity::Verbose {
            println!("{message}");
        }
    }

    /// Prints a closing success line.
    pub fn success(&self, message: &str) {
        if !self.is_quiet() {
            println!("{} {}", "✓".green(), message);
        }
    }

    /// Prints a fatal error message. Never suppressed.
    pub fn fatal(message: &str) {
        eprintln!("{} {}", "✗".red(), message);
    }
}
