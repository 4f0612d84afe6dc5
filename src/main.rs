//! dupescan - External-Sort Duplicate File Finder
//!
//! Entry point wiring the pipeline together: walker → sorted collector →
//! classifier (which feeds a second collector for its checksum pass). The
//! driver also owns validation of the starting path and cleanup of the
//! temporary sorted files.

use anyhow::Result;
use bytesize::ByteSize;
use clap::Parser;
use dupescan::{
    cli::Cli,
    config::Config,
    duplicates::Classifier,
    error::ExitCode,
    logging,
    scanner::{Walker, WalkerConfig},
    sorter::SortedCollector,
};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init_logging(cli.verbose, cli.quiet);

    let mut config = Config::load();
    config.merge_cli(&cli);

    let root = resolve_root(&cli);
    log::info!("Scanning for duplicate files in {}", root.display());

    let temp_dir = config.temp_dir();
    let walker_config = WalkerConfig::default().with_follow_symlinks(config.follow_symlinks);

    let sorted = match scan(&root, walker_config, &temp_dir) {
        Ok(Some(sorted)) => sorted,
        Ok(None) => {
            log::info!("No candidate files found under {}", root.display());
            return Ok(());
        }
        Err(e) => {
            log::error!("Search incomplete: {:#}", e);
            println!("ERROR: Search incomplete! Refer to the log for more details.");
            return Ok(());
        }
    };

    let stdout = io::stdout();
    let mut classifier = Classifier::new(stdout.lock(), &temp_dir);
    match classifier.classify(&sorted) {
        Ok(checksum_file) => {
            remove_temp(&sorted);
            if let Some(path) = checksum_file {
                remove_temp(&path);
            }
        }
        Err(e) => {
            log::error!("Duplicate classification failed: {:#}", e);
            println!("ERROR: Search incomplete! Refer to the log for more details.");
            remove_temp(&sorted);
        }
    }

    Ok(())
}

/// The starting directory: the positional argument, or the current working
/// directory. Exits with the validation code when it is unusable.
fn resolve_root(cli: &Cli) -> PathBuf {
    let root = match &cli.root {
        Some(path) => path.clone(),
        None => match std::env::current_dir() {
            Ok(dir) => dir,
            Err(e) => {
                println!("Invalid path provided: .");
                log::error!("Cannot resolve the current directory: {}", e);
                std::process::exit(ExitCode::InvalidInput.as_i32());
            }
        },
    };

    if !root.exists() || !root.is_dir() {
        println!("Path doesn't exist: {}", root.display());
        log::error!(
            "Starting path does not exist or is not a directory: {}",
            root.display()
        );
        std::process::exit(ExitCode::InvalidInput.as_i32());
    }

    root
}

/// Walk the tree into a fresh collector and return its sorted file.
///
/// On failure any partial sorted file is removed before the error is
/// surfaced; it will never be consumed.
fn scan(root: &Path, config: WalkerConfig, temp_dir: &Path) -> Result<Option<PathBuf>> {
    let mut collector = SortedCollector::new(temp_dir);
    let walker = Walker::new(root, config);

    let stats = match walker.scan_into(&mut collector) {
        Ok(stats) => stats,
        Err(e) => {
            discard_partial(&collector);
            return Err(e.into());
        }
    };
    log::info!(
        "Collected {} files ({}), skipped {} entries",
        stats.files,
        ByteSize::b(stats.bytes),
        stats.skipped
    );

    match collector.finish() {
        Ok(sorted) => Ok(sorted),
        Err(e) => {
            discard_partial(&collector);
            Err(e.into())
        }
    }
}

fn discard_partial(collector: &SortedCollector) {
    if let Some(partial) = collector.sorted_file() {
        remove_temp(partial);
    }
}

fn remove_temp(path: &Path) {
    match fs::remove_file(path) {
        Ok(()) => log::debug!("removed temp file {}", path.display()),
        Err(e) => log::warn!("couldn't remove temp file {}: {}", path.display(), e),
    }
}
