//! CLI for imgsift.

mod commands;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use imgsift_core::config::{self, ImgsiftConfig};
use std::path::{Path, PathBuf};

use commands::{run_collect, run_completions, run_fingerprint, run_list};

/// Top-level CLI for imgsift.
#[derive(Debug, Parser)]
#[command(name = "imgsift")]
#[command(about = "Collect unique images from a random-image endpoint", long_about = None)]
pub struct Cli {
    /// Read configuration from this file instead of ~/.config/imgsift/config.toml.
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: CliCommand,
}

#[derive(Debug, Subcommand)]
pub enum CliCommand {
    /// Fetch from the endpoint until COUNT unique images are stored.
    Collect(CollectArgs),

    /// List images in the store directory.
    List {
        /// Store directory (default: `store_dir` from config).
        #[arg(long, value_name = "PATH")]
        dir: Option<PathBuf>,
    },

    /// Print the 128-bit content fingerprint of a file.
    Fingerprint {
        /// Path to the file.
        path: PathBuf,
    },

    /// Print a shell completion script to stdout.
    Completions {
        shell: clap_complete::Shell,
    },
}

#[derive(Debug, Args)]
pub struct CollectArgs {
    /// Random-image endpoint (http or https). Falls back to `endpoint` in config.
    pub url: Option<String>,

    /// Number of unique images to collect.
    #[arg(long, short = 'n', value_name = "N")]
    pub count: Option<u32>,

    /// Seconds to wait between attempts (fractions allowed).
    #[arg(long, value_name = "SECS", value_parser = parse_delay)]
    pub delay: Option<f64>,

    /// Directory to store images in.
    #[arg(long, value_name = "PATH")]
    pub dir: Option<PathBuf>,

    /// Per-request timeout in seconds (at least 1).
    #[arg(long, value_name = "SECS", value_parser = clap::value_parser!(u64).range(1..))]
    pub timeout: Option<u64>,

    /// Give up after more than COUNT * FACTOR attempts (at least 1).
    #[arg(long, value_name = "FACTOR", value_parser = clap::value_parser!(u32).range(1..))]
    pub give_up_factor: Option<u32>,

    /// Extra request header, e.g. --header 'Referer: https://example.com/'. Repeatable.
    #[arg(long = "header", short = 'H', value_name = "NAME: VALUE", value_parser = parse_header)]
    pub headers: Vec<(String, String)>,
}

impl CollectArgs {
    /// Apply command-line overrides on top of the loaded config.
    pub fn apply(&self, cfg: &mut ImgsiftConfig) {
        if let Some(url) = &self.url {
            cfg.endpoint = Some(url.clone());
        }
        if let Some(count) = self.count {
            cfg.count = count;
        }
        if let Some(delay) = self.delay {
            cfg.delay_secs = delay;
        }
        if let Some(dir) = &self.dir {
            cfg.store_dir = dir.clone();
        }
        if let Some(timeout) = self.timeout {
            cfg.http.timeout_secs = timeout;
        }
        if let Some(factor) = self.give_up_factor {
            cfg.give_up_factor = factor;
        }
        for (name, value) in &self.headers {
            cfg.http.extra_headers.insert(name.clone(), value.clone());
        }
    }
}

fn parse_delay(s: &str) -> Result<f64, String> {
    let secs: f64 = s.parse().map_err(|_| format!("not a number: {s:?}"))?;
    if !secs.is_finite() || secs < 0.0 {
        return Err(format!("delay must be a non-negative number of seconds, got {s:?}"));
    }
    Ok(secs)
}

fn parse_header(s: &str) -> Result<(String, String), String> {
    let (name, value) = s
        .split_once(':')
        .ok_or_else(|| format!("expected 'Name: value', got {s:?}"))?;
    let name = name.trim();
    if name.is_empty() || name.contains(char::is_whitespace) {
        return Err(format!("invalid header name in {s:?}"));
    }
    Ok((name.to_string(), value.trim().to_string()))
}

fn load_config(path: Option<&Path>) -> Result<ImgsiftConfig> {
    let cfg = match path {
        Some(p) => config::load_from_path(p)?,
        None => config::load_or_init()?,
    };
    tracing::debug!("loaded config: {:?}", cfg);
    Ok(cfg)
}

impl CliCommand {
    pub async fn run_from_args() -> Result<()> {
        let cli = Cli::parse();

        match cli.command {
            CliCommand::Collect(args) => {
                let mut cfg = load_config(cli.config.as_deref())?;
                args.apply(&mut cfg);
                let endpoint = cfg
                    .endpoint
                    .clone()
                    .context("no endpoint: pass a URL or set `endpoint` in config.toml")?;
                run_collect(&cfg, &endpoint).await?;
            }
            CliCommand::List { dir } => {
                let dir = match dir {
                    Some(d) => d,
                    None => load_config(cli.config.as_deref())?.store_dir,
                };
                run_list(&dir).await?;
            }
            CliCommand::Fingerprint { path } => run_fingerprint(&path).await?,
            CliCommand::Completions { shell } => run_completions(shell),
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests;
