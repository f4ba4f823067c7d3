//! CLI for postmirror.

mod commands;
mod output;

use anyhow::Result;
use clap::{Parser, Subcommand};
use clap_complete::Shell;
use postmirror_core::config::{self, MirrorConfig};
use std::path::{Path, PathBuf};

use commands::{run_completions, run_image, run_inspect, run_man};

/// Top-level CLI for postmirror.
#[derive(Debug, Parser)]
#[command(name = "postmirror", version)]
#[command(about = "postmirror: mirror the images of post pages to local directories", long_about = None)]
pub struct Cli {
    /// Read configuration from FILE instead of ~/.config/postmirror/config.toml.
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: CliCommand,
}

#[derive(Debug, Subcommand)]
pub enum CliCommand {
    /// Download every image of the given post pages into DIR/<classification>/<title>/.
    Image {
        /// Post page URLs.
        #[arg(required = true, value_name = "URL")]
        urls: Vec<String>,
        /// Destination root directory (created if absent).
        #[arg(short = 'd', long, default_value = ".", value_name = "DIR")]
        directory: PathBuf,
        /// Pages processed at once (overrides config).
        #[arg(long, value_name = "N")]
        page_workers: Option<usize>,
        /// Image downloads in flight per page (overrides config).
        #[arg(long, value_name = "N")]
        resource_workers: Option<usize>,
        /// Print the run summary as JSON instead of progress lines and a table.
        #[arg(long)]
        json: bool,
    },

    /// Fetch and parse one post page and show what would be downloaded.
    Inspect {
        /// Post page URL.
        url: String,
        /// Print as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Print shell completions.
    Completions {
        #[arg(value_enum)]
        shell: Shell,
    },

    /// Print the man page (roff) to stdout.
    Man,
}

fn load_config(path: Option<&Path>) -> Result<MirrorConfig> {
    let cfg = match path {
        Some(p) => config::load_from_path(p)?,
        None => config::load_or_init()?,
    };
    tracing::debug!("loaded config: {:?}", cfg);
    Ok(cfg)
}

impl CliCommand {
    /// Parse arguments, run the command and return the process exit code.
    pub fn run_from_args() -> Result<i32> {
        let cli = Cli::parse();

        match cli.command {
            CliCommand::Completions { shell } => {
                run_completions(shell);
                Ok(0)
            }
            CliCommand::Man => {
                run_man()?;
                Ok(0)
            }
            CliCommand::Image {
                urls,
                directory,
                page_workers,
                resource_workers,
                json,
            } => {
                let cfg = load_config(cli.config.as_deref())?
                    .with_workers(page_workers, resource_workers);
                run_image(&cfg, &urls, &directory, json)
            }
            CliCommand::Inspect { url, json } => {
                let cfg = load_config(cli.config.as_deref())?;
                run_inspect(&cfg, &url, json)?;
                Ok(0)
            }
        }
    }
}

#[cfg(test)]
mod tests;
