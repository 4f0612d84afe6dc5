//! Command-line interface definitions for dupescan.
//!
//! The CLI is intentionally small: one optional positional argument (the
//! starting directory) plus verbosity and behavior flags. Defaults for the
//! behavior flags come from the persisted [`Config`](crate::config::Config);
//! explicit flags override it.
//!
//! # Example
//!
//! ```bash
//! # Scan the current directory
//! dupescan
//!
//! # Scan a specific tree, without following symlinks to files
//! dupescan /srv/data --no-follow-symlinks
//!
//! # Verbose mode for debugging
//! dupescan -v /srv/data
//! ```

use clap::Parser;
use std::path::PathBuf;

/// Duplicate file finder built on external sorted runs.
///
/// dupescan enumerates regular files under the starting directory, sorts
/// their size/inode records through on-disk runs, and prints every hard-link
/// and duplicate-content pair it finds.
#[derive(Debug, Parser)]
#[command(name = "dupescan")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Directory to scan (defaults to the current working directory)
    #[arg(value_name = "DIR")]
    pub root: Option<PathBuf>,

    /// Increase verbosity level (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress all log output except errors
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Do not follow symbolic links that point to regular files
    #[arg(long = "no-follow-symlinks")]
    pub no_follow_symlinks: bool,

    /// Follow symbolic links that point to regular files (default)
    #[arg(long = "follow-symlinks", overrides_with = "no_follow_symlinks", hide = true)]
    pub follow_symlinks: bool,

    /// Directory for temporary sorted runs (defaults to the OS temp directory)
    #[arg(long, value_name = "DIR")]
    pub temp_dir: Option<PathBuf>,
}

impl Cli {
    /// The symlink policy requested on the command line, if any.
    ///
    /// `None` means neither flag was given and the configured default
    /// applies.
    #[must_use]
    pub fn follow_symlinks(&self) -> Option<bool> {
        if self.no_follow_symlinks {
            Some(false)
        } else if self.follow_symlinks {
            Some(true)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_defaults() {
        let cli = Cli::try_parse_from(["dupescan"]).unwrap();
        assert!(cli.root.is_none());
        assert_eq!(cli.verbose, 0);
        assert!(!cli.quiet);
        assert!(cli.follow_symlinks().is_none());
        assert!(cli.temp_dir.is_none());
    }

    #[test]
    fn test_parse_root_and_verbosity() {
        let cli = Cli::try_parse_from(["dupescan", "-vv", "/srv/data"]).unwrap();
        assert_eq!(cli.root, Some(PathBuf::from("/srv/data")));
        assert_eq!(cli.verbose, 2);
    }

    #[test]
    fn test_quiet_conflicts_with_verbose() {
        assert!(Cli::try_parse_from(["dupescan", "-q", "-v"]).is_err());
    }

    #[test]
    fn test_symlink_flags() {
        let cli = Cli::try_parse_from(["dupescan", "--no-follow-symlinks"]).unwrap();
        assert_eq!(cli.follow_symlinks(), Some(false));

        let cli = Cli::try_parse_from(["dupescan", "--follow-symlinks"]).unwrap();
        assert_eq!(cli.follow_symlinks(), Some(true));

        let cli =
            Cli::try_parse_from(["dupescan", "--no-follow-symlinks", "--follow-symlinks"]).unwrap();
        assert_eq!(cli.follow_symlinks(), Some(true));
    }

    #[test]
    fn test_temp_dir_flag() {
        let cli = Cli::try_parse_from(["dupescan", "--temp-dir", "/tmp/runs"]).unwrap();
        assert_eq!(cli.temp_dir, Some(PathBuf::from("/tmp/runs")));
    }
}
