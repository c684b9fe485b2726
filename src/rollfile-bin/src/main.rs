// SPDX-FileCopyrightText: 2026 Stanislaw Grams <stanislawgrams@gmail.com>
//
// SPDX-License-Identifier: BSD-2-Clause

use std::io;
use std::path::PathBuf;

use clap::Parser;
use tracing::info;

mod config;
mod pump;

use crate::config::AppConfig;
use rollfile_app::{init_logging, ConfigFile};
use rollfile_core::{Compression, RollingFile};

pub type DynResult<T> = Result<T, Box<dyn std::error::Error + Send + Sync>>;

const PKG_DESCRIPTION: &str = concat!(env!("CARGO_PKG_NAME"), " - ", env!("CARGO_PKG_DESCRIPTION"));
const PKG_LONG_ABOUT: &str = concat!(
    env!("CARGO_PKG_DESCRIPTION"),
    "\n\nReads stdin line by line. Lines are never split across files; a line",
    "\nlonger than the size ceiling is skipped with a warning."
);

#[derive(Debug, Parser)]
#[command(
    author = env!("CARGO_PKG_AUTHORS"),
    version = env!("CARGO_PKG_VERSION"),
    about = PKG_DESCRIPTION,
    long_about = PKG_LONG_ABOUT
)]
struct Cli {
    /// Path to configuration file (otherwise searched in default locations)
    #[arg(long = "config", short = 'C', value_name = "FILE")]
    config: Option<PathBuf>,
    /// Print the effective configuration as TOML and exit
    #[arg(long = "print-config")]
    print_config: bool,
    /// Prefix of every file owned by the writer
    #[arg(short = 'p', long = "prefix")]
    prefix: Option<String>,
    /// Archive compression (gzip or none)
    #[arg(short = 'z', long = "compression")]
    compression: Option<Compression>,
    /// Size ceiling of the active file in bytes
    #[arg(short = 's', long = "max-size")]
    max_size: Option<u64>,
    /// Number of rotated archives to keep
    #[arg(short = 'k', long = "max-archives")]
    max_archives: Option<usize>,
    /// Log level for diagnostics (trace, debug, info, warn, error)
    #[arg(short = 'l', long = "log-level")]
    log_level: Option<String>,
    /// Also copy every input line to stdout
    #[arg(short = 't', long = "tee")]
    tee: bool,
    /// Log directory (trailing '/') or directory plus active file name
    #[arg(value_name = "PATH")]
    path: Option<String>,
}

impl Cli {
    /// CLI flags take precedence over the config file.
    fn apply(&self, cfg: &mut AppConfig) {
        if let Some(ref prefix) = self.prefix {
            cfg.writer.prefix = prefix.clone();
        }
        if let Some(compression) = self.compression {
            cfg.writer.compression = compression;
        }
        if let Some(max_size) = self.max_size {
            cfg.writer.max_size_bytes = max_size;
        }
        if let Some(max_archives) = self.max_archives {
            cfg.writer.max_archives = max_archives;
        }
        if let Some(ref level) = self.log_level {
            cfg.general.log_level = Some(level.clone());
        }
        if self.tee {
            cfg.general.tee = true;
        }
        if let Some(ref path) = self.path {
            cfg.writer.path = path.clone();
        }
    }
}

fn main() -> DynResult<()> {
    let cli = Cli::parse();

    let (mut cfg, config_path) = AppConfig::load(cli.config.as_deref())?;
    cli.apply(&mut cfg);
    init_logging(cfg.general.log_level.as_deref());

    if let Some(ref path) = config_path {
        info!("Loaded configuration from {}", path.display());
    }
    cfg.validate()?;

    if cli.print_config {
        print!("{}", cfg.to_toml()?);
        return Ok(());
    }

    let file = RollingFile::new(cfg.writer.clone())?;
    info!(
        "Writing to {} (max {} bytes, keep {}, compression {})",
        file.active_path().display(),
        file.max_size(),
        cfg.writer.max_archives,
        cfg.writer.compression
    );

    let stdin = io::stdin();
    let mut stdout = io::stdout();
    let tee: Option<&mut dyn io::Write> = if cfg.general.tee {
        Some(&mut stdout)
    } else {
        None
    };
    let stats = pump::pump(stdin.lock(), &file, tee)?;

    file.close();
    info!(
        "Done: {} lines, {} bytes written, {} skipped, {} failed",
        stats.lines, stats.bytes, stats.skipped, stats.failed
    );
    Ok(())
}
