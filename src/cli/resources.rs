use clap::Args;
use log::info;
use serde::Serialize;
use std::path::PathBuf;

use crate::cli::core::{check_required_filename, OutputSettings, AFTER_HELP, FULL_VERSION};

#[derive(Args, Clone, Default, Serialize)]
#[clap(author, about,
    after_help = &**AFTER_HELP
)]
pub struct PartitionSettings {
    /// User resource configuration with a `partitions` mapping (YAML, or JSON with a .json extension)
    #[clap(required = true)]
    #[clap(short = 'u')]
    #[clap(long = "resources")]
    #[clap(value_name = "YAML")]
    #[clap(help_heading = Some("Input"))]
    pub resources_fn: PathBuf,

    /// The partition group to select from
    #[clap(required = true)]
    #[clap(short = 'p')]
    #[clap(long = "partition")]
    #[clap(value_name = "NAME")]
    #[clap(help_heading = Some("Query"))]
    pub partition: String,

    /// Seed for the random selection [default: from entropy]
    #[clap(long = "seed")]
    #[clap(value_name = "SEED")]
    #[clap(help_heading = Some("Query"))]
    pub seed: Option<u64>,

    #[clap(flatten)]
    pub output: OutputSettings,
}

pub fn check_partition_settings(settings: PartitionSettings) -> anyhow::Result<PartitionSettings> {
    info!("vctargets version: {:?}", &*FULL_VERSION);
    info!("Sub-command: partition");
    info!("Inputs:");
    check_required_filename(&settings.resources_fn, "Resources")?;
    info!("\tResources: {:?}", &settings.resources_fn);
    info!("\tPartition: {:?}", &settings.partition);
    if let Some(seed) = settings.seed {
        info!("\tSeed: {seed}");
    }
    Ok(settings)
}
