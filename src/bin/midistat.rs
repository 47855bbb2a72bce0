//! Batch MIDI statistics.
//!
//! Finds every MIDI file under the root directory, prints the gathered statistics as JSON and
//! saves them to the output file. Any file failing to parse aborts the run before anything is
//! written.

use anyhow::{bail, Context, Result};
use clap::Parser;
use midistat::{collect, find_midis, Config, MetaSkip};
use std::path::PathBuf;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Directory searched recursively for MIDI files [default: midis]
    #[arg(short, long, env = "MIDISTAT_ROOT")]
    root: Option<PathBuf>,

    /// Where the JSON report is written [default: midi_info.json]
    #[arg(short, long, env = "MIDISTAT_OUTPUT")]
    output: Option<PathBuf>,

    /// TOML config file (defaults to ./midistat.toml when present)
    #[arg(short, long, env = "MIDISTAT_CONFIG")]
    config: Option<PathBuf>,

    /// How meta events are skipped: "fixed" or "declared"
    #[arg(long, env = "MIDISTAT_META_SKIP")]
    meta_skip: Option<MetaSkip>,

    /// Only log warnings and errors
    #[arg(short, long)]
    quiet: bool,
}

impl Cli {
    fn into_config(self) -> Result<Config> {
        let mut config = Config::load(self.config.as_deref())?;
        if let Some(root) = self.root {
            config.root = root;
        }
        if let Some(output) = self.output {
            config.output = output;
        }
        if let Some(meta_skip) = self.meta_skip {
            config.meta_skip = meta_skip;
        }
        Ok(config)
    }
}

/// `RUST_LOG` directives when set and valid, otherwise `info` (or `warn` when quiet).
fn log_filter(rust_log: Option<&str>, quiet: bool) -> EnvFilter {
    let default = if quiet { "warn" } else { "info" };
    rust_log
        .filter(|directives| !directives.trim().is_empty())
        .and_then(|directives| EnvFilter::try_new(directives).ok())
        .unwrap_or_else(|| EnvFilter::new(default))
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let rust_log = std::env::var(EnvFilter::DEFAULT_ENV).ok();
    tracing_subscriber::fmt()
        .with_env_filter(log_filter(rust_log.as_deref(), cli.quiet))
        .with_writer(std::io::stderr)
        .init();

    info!("midistat {}: batch MIDI information", env!("CARGO_PKG_VERSION"));

    let config = cli.into_config()?;
    debug!(?config, "loaded config");

    if !config.root.is_dir() {
        bail!("{} folder not found", config.root.display());
    }

    let midis = find_midis(&config.root, &config.extension)
        .with_context(|| format!("failed to search {}", config.root.display()))?;
    let report = collect(&midis, config.meta_skip).context("batch aborted, nothing was saved")?;

    let json = report.to_json()?;
    println!("{}", json);

    report
        .save(&config.output)
        .with_context(|| format!("failed to write {}", config.output.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracing::level_filters::LevelFilter;

    #[test]
    fn rust_log_wins_over_default_level() {
        let filter = log_filter(Some("debug"), false);
        assert_eq!(filter.max_level_hint(), Some(LevelFilter::DEBUG));
        let filter = log_filter(Some("debug"), true);
        assert_eq!(filter.max_level_hint(), Some(LevelFilter::DEBUG));
    }

    #[test]
    fn default_level_without_rust_log() {
        assert_eq!(log_filter(None, false).max_level_hint(), Some(LevelFilter::INFO));
        assert_eq!(log_filter(None, true).max_level_hint(), Some(LevelFilter::WARN));
        assert_eq!(log_filter(Some(""), false).max_level_hint(), Some(LevelFilter::INFO));
    }
}
