use anyhow::ensure;
use clap::Args;
use log::info;
use serde::Serialize;
use std::path::PathBuf;

use crate::cli::core::{check_required_filename, OutputSettings, AFTER_HELP, FULL_VERSION};
use crate::data_types::layout::DEFAULT_RESULTS_PREFIX;
use crate::tracking::{Setting, TrackingTag};

#[derive(Args, Clone, Debug, Default, Serialize)]
#[clap(author, about,
    after_help = &**AFTER_HELP
)]
pub struct TrackSettings {
    /// Pipeline configuration file (YAML, or JSON with a .json extension)
    #[clap(required = true)]
    #[clap(short = 'c')]
    #[clap(long = "config")]
    #[clap(value_name = "YAML")]
    #[clap(help_heading = Some("Input"))]
    pub config_fn: PathBuf,

    /// Root folder for intermediate results
    #[clap(long = "results-prefix")]
    #[clap(value_name = "DIR")]
    #[clap(help_heading = Some("Layout"))]
    #[clap(default_value = DEFAULT_RESULTS_PREFIX)]
    pub results_prefix: PathBuf,

    #[clap(flatten)]
    pub output: OutputSettings,
}

/// Checks the tracking inputs and dumps them to the logger
/// # Arguments
/// * `settings` - the tracking settings
/// * `subcommand` - subcommand name for the log
pub fn check_track_settings(settings: TrackSettings, subcommand: &str) -> anyhow::Result<TrackSettings> {
    info!("vctargets version: {:?}", &*FULL_VERSION);
    info!("Sub-command: {subcommand}");
    info!("Inputs:");
    check_required_filename(&settings.config_fn, "Configuration")?;
    info!("\tConfiguration: {:?}", &settings.config_fn);
    info!("\tResults prefix: {:?}", &settings.results_prefix);
    Ok(settings)
}

#[derive(Args, Clone, Default, Serialize)]
#[clap(author, about,
    after_help = &**AFTER_HELP
)]
pub struct TrackSettingSettings {
    /// Root folder for intermediate results
    #[clap(long = "results-prefix")]
    #[clap(value_name = "DIR")]
    #[clap(help_heading = Some("Layout"))]
    #[clap(default_value = DEFAULT_RESULTS_PREFIX)]
    pub results_prefix: PathBuf,

    /// Analysis folder the setting belongs to
    #[clap(required = true)]
    #[clap(short = 'a')]
    #[clap(long = "analysis")]
    #[clap(value_name = "NAME")]
    #[clap(help_heading = Some("Setting"))]
    pub analysis_name: String,

    /// Tag identifying the setting; repeat to nest the file in sub-folders
    #[clap(required = true)]
    #[clap(short = 't')]
    #[clap(long = "tag")]
    #[clap(value_name = "TAG")]
    #[clap(help_heading = Some("Setting"))]
    pub tag: Vec<String>,

    /// Current values of the setting [default: the setting is absent]
    #[clap(value_name = "VALUE")]
    #[clap(help_heading = Some("Setting"))]
    pub values: Vec<String>,

    /// Record the values as a list even when only one is given
    #[clap(long = "list")]
    #[clap(help_heading = Some("Setting"))]
    pub list: bool,

    #[clap(flatten)]
    pub output: OutputSettings,
}

impl TrackSettingSettings {
    pub fn tracking_tag(&self) -> TrackingTag {
        TrackingTag::from(self.tag.clone())
    }

    /// Converts the command line values into a setting
    pub fn setting(&self) -> Setting {
        match self.values.as_slice() {
            [] if !self.list => Setting::Absent,
            [single] if !self.list => Setting::from(single.as_str()),
            values => Setting::from(values.to_vec())
        }
    }
}

pub fn check_track_setting_settings(settings: TrackSettingSettings) -> anyhow::Result<TrackSettingSettings> {
    info!("vctargets version: {:?}", &*FULL_VERSION);
    info!("Sub-command: track-setting");
    ensure!(!settings.analysis_name.is_empty(), "--analysis must not be empty");
    ensure!(settings.tag.iter().all(|t| !t.is_empty()), "--tag values must not be empty");

    info!("Setting:");
    info!("\tResults prefix: {:?}", &settings.results_prefix);
    info!("\tAnalysis: {:?}", &settings.analysis_name);
    info!("\tTag: {:?}", settings.tag.join("/"));
    info!("\tValues: {:?}", &settings.values);
    Ok(settings)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings(values: &[&str], list: bool) -> TrackSettingSettings {
        TrackSettingSettings {
            analysis_name: "myanalysis".to_string(),
            tag: vec!["nested".to_string(), "mytag".to_string()],
            values: values.iter().map(|v| v.to_string()).collect(),
            list,
            ..Default::default()
        }
    }

    #[test]
    fn test_setting_conversion() {
        assert_eq!(settings(&[], false).setting(), Setting::Absent);
        assert_eq!(settings(&["x"], false).setting(), Setting::from("x"));
        assert_eq!(settings(&["x"], true).setting(), Setting::from(vec!["x"]));
        assert_eq!(settings(&[], true).setting(), Setting::from(Vec::<String>::new()));
        assert_eq!(settings(&["b", "a"], false).setting().canonical_form(), Some(vec!["a".to_string(), "b".to_string()]));
    }

    #[test]
    fn test_check_track_settings() {
        let folder = tempfile::tempdir().unwrap();
        let config_fn = folder.path().join("config.yaml");
        std::fs::write(&config_fn, "genome-build: grch38\n").unwrap();

        for subcommand in ["track", "tracking-files"] {
            let settings = TrackSettings { config_fn: config_fn.clone(), ..Default::default() };
            assert!(check_track_settings(settings, subcommand).is_ok());
        }

        let missing = TrackSettings { config_fn: folder.path().join("missing.yaml"), ..Default::default() };
        let err = check_track_settings(missing, "tracking-files").unwrap_err();
        assert!(err.to_string().contains("Configuration does not exist"));
    }

    #[test]
    fn test_tracking_tag() {
        let tag = settings(&[], false).tracking_tag();
        assert_eq!(tag.segments(), &["nested".to_string(), "mytag".to_string()]);
    }
}
