use anyhow::bail;
use clap::{Args, Parser, Subcommand};
use chrono::Datelike;
use lazy_static::lazy_static;
use serde::Serialize;
use std::path::Path;

use crate::cli::resources::PartitionSettings;
use crate::cli::targets::{FlattenSettings, LocateSettings, ResolveSettings, StratBatchSettings, TargetsSettings};
use crate::cli::tracking::{TrackSettingSettings, TrackSettings};

lazy_static! {
    /// Stores the full version string we plan to use, which is generated in build.rs
    /// # Examples
    /// * `0.3.1-6bb9635-dirty` - while on a dirty branch
    /// * `0.3.1-6bb9635` - with a fresh commit
    pub static ref FULL_VERSION: String = format!("{}-{}", env!("CARGO_PKG_VERSION"), env!("VERGEN_GIT_DESCRIBE"));

    /// Shared after help string containing the legalese.
    pub static ref AFTER_HELP: String = format!("Copyright (C) 2024-{} vctargets contributors
This program comes with ABSOLUTELY NO WARRANTY; it is distributed under the MIT license.", chrono::Utc::now().year());
}

#[derive(Parser)]
#[clap(author,
    version = &**FULL_VERSION,
    about,
    after_help = &**AFTER_HELP)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands
}

/// vctargets, derives benchmarking targets and tracking files from pipeline configuration.
/// Select a subcommand to see more usage information:
#[derive(Subcommand)]
pub enum Commands {
    /// Lists every final report required for a full pipeline run
    Targets(Box<TargetsSettings>),
    /// Resolves tool outputs, subjects, or variant types for a report group
    Resolve(Box<ResolveSettings>),
    /// Looks up the file locator for a dataset and classifies its transport
    Locate(Box<LocateSettings>),
    /// Prints the stratification region definitions in configuration order
    Flatten(Box<FlattenSettings>),
    /// Lists the stratification files that belong to one batch
    StratBatch(Box<StratBatchSettings>),
    /// Updates the tracking files for every configured stratification set
    Track(Box<TrackSettings>),
    /// Lists the stratification tracking files without touching them
    TrackingFiles(Box<TrackSettings>),
    /// Updates a single tracking file with a setting value
    TrackSetting(Box<TrackSettingSettings>),
    /// Selects a cluster partition from a configured partition group
    Partition(Box<PartitionSettings>)
}

pub fn get_cli() -> Cli {
    Cli::parse()
}

/// Checks if a file exists and will otherwise exit
/// # Arguments
/// * `filename` - the file path to check for
/// * `label` - the label to use for error messages
pub fn check_required_filename(filename: &Path, label: &str) -> anyhow::Result<()> {
    if !filename.exists() {
        bail!("{} does not exist: \"{}\"", label, filename.display());
    }

    // file exists
    Ok(())
}

/// Checks if a file exists and will otherwise exit
/// # Arguments
/// * `filename` - the file path to check for
/// * `label` - the label to use for error messages
pub fn check_optional_filename(opt_filename: Option<&Path>, label: &str) -> anyhow::Result<()> {
    if let Some(filename) = opt_filename {
        if !filename.exists() {
            bail!("{} does not exist: \"{}\"", label, filename.display());
        }
    }

    // file either was not specified OR it exists
    Ok(())
}

/// Output options shared by every subcommand
#[derive(Args, Clone, Debug, Default, Serialize)]
pub struct OutputSettings {
    /// Print results as JSON instead of one entry per line
    #[clap(long = "json")]
    #[clap(help_heading = Some("Output"))]
    pub json: bool,

    /// Enable verbose output.
    #[clap(short = 'v')]
    #[clap(long = "verbose")]
    #[clap(action = clap::ArgAction::Count)]
    pub verbosity: u8,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_after_help() {
        assert!(AFTER_HELP.starts_with("Copyright (C) 2024-"));
        assert!(AFTER_HELP.contains("vctargets contributors"));
        assert!(AFTER_HELP.contains("MIT license"));
        assert!(!AFTER_HELP.contains("diagnostic"));
    }
}
