use anyhow::ensure;
use clap::Args;
use log::info;
use serde::Serialize;
use std::path::PathBuf;

use crate::cli::core::{check_optional_filename, check_required_filename, OutputSettings, AFTER_HELP, FULL_VERSION};
use crate::data_types::layout::{TargetLayout, TargetLayoutBuilder, DEFAULT_REPORTS_PREFIX, DEFAULT_RESULTS_PREFIX};
use crate::data_types::manifest::ManifestKind;

/// Configuration and manifest inputs shared by the target subcommands
#[derive(Args, Clone, Default, Serialize)]
pub struct InputSettings {
    /// Pipeline configuration file (YAML, or JSON with a .json extension)
    #[clap(required = true)]
    #[clap(short = 'c')]
    #[clap(long = "config")]
    #[clap(value_name = "YAML")]
    #[clap(help_heading = Some("Input"))]
    pub config_fn: PathBuf,

    /// Experimental dataset manifest
    #[clap(short = 'e')]
    #[clap(long = "experimental-manifest")]
    #[clap(value_name = "TSV")]
    #[clap(help_heading = Some("Input"))]
    pub experimental_fn: Option<PathBuf>,

    /// Reference dataset manifest
    #[clap(short = 'r')]
    #[clap(long = "reference-manifest")]
    #[clap(value_name = "TSV")]
    #[clap(help_heading = Some("Input"))]
    pub reference_fn: Option<PathBuf>,

    /// Requested comparisons manifest
    #[clap(short = 'm')]
    #[clap(long = "comparison-manifest")]
    #[clap(value_name = "TSV")]
    #[clap(help_heading = Some("Input"))]
    pub comparisons_fn: Option<PathBuf>,

    /// Root folder for the final reports
    #[clap(long = "reports-prefix")]
    #[clap(value_name = "DIR")]
    #[clap(help_heading = Some("Layout"))]
    #[clap(default_value = DEFAULT_REPORTS_PREFIX)]
    pub reports_prefix: String,

    /// Root folder for intermediate results
    #[clap(long = "results-prefix")]
    #[clap(value_name = "DIR")]
    #[clap(help_heading = Some("Layout"))]
    #[clap(default_value = DEFAULT_RESULTS_PREFIX)]
    pub results_prefix: String,
}

impl InputSettings {
    /// Builds the output layout from the prefix options
    pub fn layout(&self) -> anyhow::Result<TargetLayout> {
        let layout = TargetLayoutBuilder::default()
            .reports_prefix(self.reports_prefix.clone())
            .results_prefix(self.results_prefix.clone())
            .build()?;
        Ok(layout)
    }
}

/// Checks the shared inputs and dumps them to the logger
/// # Arguments
/// * `settings` - the shared input settings
/// * `subcommand` - subcommand name for the log
pub fn check_input_settings(settings: &InputSettings, subcommand: &str) -> anyhow::Result<()> {
    info!("vctargets version: {:?}", &*FULL_VERSION);
    info!("Sub-command: {subcommand}");
    info!("Inputs:");

    check_required_filename(&settings.config_fn, "Configuration")?;
    check_optional_filename(settings.experimental_fn.as_deref(), "Experimental manifest")?;
    check_optional_filename(settings.reference_fn.as_deref(), "Reference manifest")?;
    check_optional_filename(settings.comparisons_fn.as_deref(), "Comparison manifest")?;

    info!("\tConfiguration: {:?}", &settings.config_fn);
    for (label, opt_filename) in [
        ("Experimental manifest", settings.experimental_fn.as_ref()),
        ("Reference manifest", settings.reference_fn.as_ref()),
        ("Comparison manifest", settings.comparisons_fn.as_ref())
    ] {
        match opt_filename {
            Some(filename) => info!("\t{label}: {filename:?}"),
            None => info!("\t{label}: None")
        }
    }

    ensure!(!settings.reports_prefix.is_empty(), "--reports-prefix must not be empty");
    ensure!(!settings.results_prefix.is_empty(), "--results-prefix must not be empty");
    info!("Layout:");
    info!("\tReports prefix: {:?}", &settings.reports_prefix);
    info!("\tResults prefix: {:?}", &settings.results_prefix);
    Ok(())
}

#[derive(Args, Clone, Default, Serialize)]
#[clap(author, about,
    after_help = &**AFTER_HELP
)]
pub struct TargetsSettings {
    #[clap(flatten)]
    pub inputs: InputSettings,

    #[clap(flatten)]
    pub output: OutputSettings,
}

pub fn check_targets_settings(settings: TargetsSettings) -> anyhow::Result<TargetsSettings> {
    check_input_settings(&settings.inputs, "targets")?;
    ensure!(settings.inputs.experimental_fn.is_some(), "--experimental-manifest is required for targets");
    ensure!(settings.inputs.comparisons_fn.is_some(), "--comparison-manifest is required for targets");
    Ok(settings)
}

/// What to resolve for a report group
#[derive(Clone, Copy, Default, Debug, strum_macros::Display, Serialize, clap::ValueEnum)]
pub enum ResolveQuery {
    /// Comparison tool outputs the report depends on
    #[default]
    #[strum(serialize = "tool-outputs")]
    #[value(name = "tool-outputs")]
    ToolOutputs,
    /// Replicate identifiers in the report
    #[strum(serialize = "subjects")]
    #[value(name = "subjects")]
    Subjects,
    /// Variant categories in the report
    #[strum(serialize = "variant-types")]
    #[value(name = "variant-types")]
    VariantTypes,
}

#[derive(Args, Clone, Default, Serialize)]
#[clap(author, about,
    after_help = &**AFTER_HELP
)]
pub struct ResolveSettings {
    #[clap(flatten)]
    pub inputs: InputSettings,

    /// The report group to resolve
    #[clap(required = true)]
    #[clap(short = 'g')]
    #[clap(long = "report")]
    #[clap(value_name = "GROUP")]
    #[clap(help_heading = Some("Query"))]
    pub group: String,

    /// What to resolve for the report group
    #[clap(long = "query")]
    #[clap(value_name = "QUERY")]
    #[clap(help_heading = Some("Query"))]
    #[clap(default_value = "tool-outputs")]
    pub query: ResolveQuery,

    /// Region wildcard substituted into tool output paths
    #[clap(long = "region")]
    #[clap(value_name = "REGION")]
    #[clap(help_heading = Some("Query"))]
    #[clap(default_value = "{region}")]
    pub region: String,

    #[clap(flatten)]
    pub output: OutputSettings,
}

pub fn check_resolve_settings(settings: ResolveSettings) -> anyhow::Result<ResolveSettings> {
    check_input_settings(&settings.inputs, "resolve")?;
    ensure!(settings.inputs.comparisons_fn.is_some(), "--comparison-manifest is required for resolve");
    if matches!(settings.query, ResolveQuery::Subjects) {
        ensure!(settings.inputs.experimental_fn.is_some(), "--experimental-manifest is required to resolve subjects");
    }
    ensure!(!settings.group.is_empty(), "--report must not be empty");

    info!("Query:");
    info!("\tReport group: {:?}", &settings.group);
    info!("\tResolving: {}", settings.query);
    if matches!(settings.query, ResolveQuery::ToolOutputs) {
        info!("\tRegion: {:?}", &settings.region);
    }
    Ok(settings)
}

#[derive(Args, Clone, Default, Serialize)]
#[clap(author, about,
    after_help = &**AFTER_HELP
)]
pub struct LocateSettings {
    #[clap(flatten)]
    pub inputs: InputSettings,

    /// The dataset identifier to look up
    #[clap(required = true)]
    #[clap(short = 'd')]
    #[clap(long = "dataset")]
    #[clap(value_name = "ID")]
    #[clap(help_heading = Some("Query"))]
    pub dataset: String,

    /// The manifest containing the dataset
    #[clap(long = "manifest")]
    #[clap(value_name = "MANIFEST")]
    #[clap(help_heading = Some("Query"))]
    #[clap(default_value = "experimental")]
    pub manifest: ManifestKind,

    #[clap(flatten)]
    pub output: OutputSettings,
}

pub fn check_locate_settings(settings: LocateSettings) -> anyhow::Result<LocateSettings> {
    check_input_settings(&settings.inputs, "locate")?;
    let provided = match settings.manifest {
        ManifestKind::Experimental => settings.inputs.experimental_fn.is_some(),
        ManifestKind::Reference => settings.inputs.reference_fn.is_some()
    };
    ensure!(provided, "the {} manifest is required for locate", settings.manifest);

    info!("Query:");
    info!("\tDataset: {:?}", &settings.dataset);
    info!("\tManifest: {}", settings.manifest);
    Ok(settings)
}

#[derive(Args, Clone, Default, Serialize)]
#[clap(author, about,
    after_help = &**AFTER_HELP
)]
pub struct FlattenSettings {
    #[clap(flatten)]
    pub inputs: InputSettings,

    #[clap(flatten)]
    pub output: OutputSettings,
}

pub fn check_flatten_settings(settings: FlattenSettings) -> anyhow::Result<FlattenSettings> {
    check_input_settings(&settings.inputs, "flatten")?;
    Ok(settings)
}

#[derive(Args, Clone, Default, Serialize)]
#[clap(author, about,
    after_help = &**AFTER_HELP
)]
pub struct StratBatchSettings {
    #[clap(flatten)]
    pub inputs: InputSettings,

    /// Stratification listing produced by the checkpoint stage
    #[clap(required = true)]
    #[clap(short = 's')]
    #[clap(long = "stratifications")]
    #[clap(value_name = "TSV")]
    #[clap(help_heading = Some("Input"))]
    pub stratifications_fn: PathBuf,

    /// The batch to list [default: print the number of batches]
    #[clap(short = 'b')]
    #[clap(long = "batch")]
    #[clap(value_name = "INDEX")]
    #[clap(help_heading = Some("Query"))]
    pub batch: Option<usize>,

    #[clap(flatten)]
    pub output: OutputSettings,
}

pub fn check_strat_batch_settings(settings: StratBatchSettings) -> anyhow::Result<StratBatchSettings> {
    check_input_settings(&settings.inputs, "strat-batch")?;
    check_required_filename(&settings.stratifications_fn, "Stratifications")?;
    info!("\tStratifications: {:?}", &settings.stratifications_fn);
    match settings.batch {
        Some(batch) => info!("\tBatch: {batch}"),
        None => info!("\tBatch: None")
    }
    Ok(settings)
}
