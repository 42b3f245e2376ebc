//! CLI for the gapfill station mirror.

mod commands;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use gapfill_core::config;
use std::path::PathBuf;

use commands::{run_download, run_scan, run_scheduler, run_sites, run_summary};

/// Top-level CLI for gapfill.
#[derive(Debug, Parser)]
#[command(name = "gapfill")]
#[command(about = "gapfill: find and fetch missing station files from FTP/SFTP sites", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: CliCommand,
}

#[derive(Debug, Subcommand)]
pub enum CliCommand {
    /// Manage the site list.
    Sites {
        #[command(subcommand)]
        action: SitesCommand,
    },

    /// Scan sites and print every expected file with its status.
    Scan {
        /// UTC days to cover, today included (default: config `days_back`).
        #[arg(long, value_name = "N")]
        days: Option<u32>,
        /// Only this site.
        #[arg(long, value_name = "NAME")]
        site: Option<String>,
        /// Only print gaps (missing or mismatched files).
        #[arg(long)]
        issues: bool,
    },

    /// Scan, then download every missing or mismatched file.
    Download {
        #[arg(long, value_name = "N")]
        days: Option<u32>,
        #[arg(long, value_name = "NAME")]
        site: Option<String>,
    },

    /// Per-station summary: last file on disk and gaps in the window.
    Summary {
        /// UTC days to scan.
        #[arg(long, value_name = "N", default_value = "7")]
        days: u32,
        /// Only count gaps from the last N days.
        #[arg(long, value_name = "N", default_value = "7")]
        window_days: u32,
        #[arg(long, value_name = "NAME")]
        site: Option<String>,
    },

    /// Run the hourly scheduler until Ctrl-C.
    Run {
        /// Minutes past the hour to trigger (default: config `schedule.offset_minutes`).
        #[arg(long, value_name = "M")]
        offset_minutes: Option<u32>,
        /// Skip automatic downloads of files younger than G minutes (default: config `grace_minutes`).
        #[arg(long, value_name = "G")]
        grace_minutes: Option<u32>,
    },
}

#[derive(Debug, Subcommand)]
pub enum SitesCommand {
    /// List configured sites.
    List,
    /// Add a site.
    Add {
        name: String,
        #[command(flatten)]
        fields: SiteFields,
    },
    /// Change fields of an existing site; unset flags keep their value.
    Edit {
        name: String,
        /// Rename the site.
        #[arg(long, value_name = "NAME")]
        rename: Option<String>,
        #[command(flatten)]
        fields: SiteFields,
    },
    /// Remove a site (downloaded files are kept).
    Remove { name: String },
}

/// Site fields settable from the command line.
#[derive(Debug, Clone, Default, Args)]
pub struct SiteFields {
    #[arg(long)]
    pub host: Option<String>,
    /// ftp or sftp.
    #[arg(long)]
    pub protocol: Option<String>,
    #[arg(long)]
    pub port: Option<u16>,
    #[arg(long)]
    pub user: Option<String>,
    #[arg(long)]
    pub password: Option<String>,
    /// Remote directory.
    #[arg(long)]
    pub path: Option<String>,
    /// Filename template, e.g. `SITE%Y%m%d%H.dat`.
    #[arg(long)]
    pub pattern: Option<String>,
    /// daily or hourly.
    #[arg(long)]
    pub frequency: Option<String>,
    #[arg(long)]
    pub network: Option<String>,
    /// Sample rate label, e.g. 30s.
    #[arg(long)]
    pub rate: Option<String>,
    #[arg(long, value_name = "BOOL")]
    pub external_clock: Option<bool>,
    /// Hour written as a letter a..x in filenames.
    #[arg(long, value_name = "BOOL")]
    pub letter_hour: Option<bool>,
    #[arg(long)]
    pub output_dir: Option<PathBuf>,
    #[arg(long)]
    pub station: Option<String>,
    #[arg(long)]
    pub format: Option<String>,
}

impl CliCommand {
    pub async fn run_from_args() -> Result<()> {
        let cli = Cli::parse();
        let cfg = config::load_or_init()?;
        tracing::debug!("loaded config: {:?}", cfg);

        match cli.command {
            CliCommand::Sites { action } => run_sites(&cfg, action)?,
            CliCommand::Scan { days, site, issues } => {
                run_scan(&cfg, days.unwrap_or(cfg.days_back), site.as_deref(), issues).await?
            }
            CliCommand::Download { days, site } => {
                run_download(&cfg, days.unwrap_or(cfg.days_back), site.as_deref()).await?
            }
            CliCommand::Summary {
                days,
                window_days,
                site,
            } => run_summary(&cfg, days, window_days, site.as_deref()).await?,
            CliCommand::Run {
                offset_minutes,
                grace_minutes,
            } => run_scheduler(&cfg, offset_minutes, grace_minutes).await?,
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests;
