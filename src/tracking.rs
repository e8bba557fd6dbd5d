/*!
# Tracking files
Small sentinel files that record the last-seen value of a configuration setting.
The workflow engine treats an unchanged modification time as "nothing to redo", so a file is only rewritten when the canonical form of its setting actually changes.

## Example usage
```rust
use vctargets::tracking::{update_analysis_tracking_file, Setting, TrackingUpdate};

let results = tempfile::tempdir().unwrap();
let setting = Setting::from(vec![3, 2, 1]);
let first = update_analysis_tracking_file(results.path(), "myanalysis", &setting, &"mytag".into()).unwrap();
let second = update_analysis_tracking_file(results.path(), "myanalysis", &setting, &"mytag".into()).unwrap();
assert_eq!(first, TrackingUpdate::Written);
assert_eq!(second, TrackingUpdate::Unchanged);

let contents = std::fs::read_to_string(results.path().join("myanalysis/mytag.tracking")).unwrap();
assert_eq!(contents, "1\n2\n3\n");
```
*/
use log::{debug, info};
use std::io::{BufWriter, ErrorKind, Write};
use std::path::{Path, PathBuf};

use crate::data_types::layout::TargetLayout;
use crate::data_types::pipeline_config::{ConfigError, PipelineConfig};

/// Extension of every tracking file
pub const TRACKING_EXTENSION: &str = "tracking";
/// Value recorded for stratification sets that are configured
pub const IN_USE_MARKER: &str = "in-use";

#[derive(thiserror::Error, Debug)]
pub enum TrackingError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Io(#[from] std::io::Error)
}

/// Identifies a tracking file below its analysis folder; every segment but the last is a sub-folder
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct TrackingTag {
    segments: Vec<String>
}

impl TrackingTag {
    pub fn segments(&self) -> &[String] {
        &self.segments
    }
}

impl From<&str> for TrackingTag {
    fn from(tag: &str) -> Self {
        Self { segments: vec![tag.to_string()] }
    }
}

impl From<String> for TrackingTag {
    fn from(tag: String) -> Self {
        Self { segments: vec![tag] }
    }
}

impl From<Vec<String>> for TrackingTag {
    fn from(segments: Vec<String>) -> Self {
        Self { segments }
    }
}

impl From<&[&str]> for TrackingTag {
    fn from(segments: &[&str]) -> Self {
        Self { segments: segments.iter().map(|s| s.to_string()).collect() }
    }
}

/// A single primitive setting value
#[derive(Clone, Debug, PartialEq)]
pub enum SettingValue {
    Text(String),
    Integer(i64),
    Float(f64),
    Boolean(bool)
}

impl std::fmt::Display for SettingValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SettingValue::Text(v) => write!(f, "{v}"),
            SettingValue::Integer(v) => write!(f, "{v}"),
            SettingValue::Float(v) => write!(f, "{v:?}"),
            SettingValue::Boolean(true) => write!(f, "True"),
            SettingValue::Boolean(false) => write!(f, "False")
        }
    }
}

impl From<&str> for SettingValue {
    fn from(v: &str) -> Self {
        SettingValue::Text(v.to_string())
    }
}

impl From<String> for SettingValue {
    fn from(v: String) -> Self {
        SettingValue::Text(v)
    }
}

impl From<i32> for SettingValue {
    fn from(v: i32) -> Self {
        SettingValue::Integer(v.into())
    }
}

impl From<i64> for SettingValue {
    fn from(v: i64) -> Self {
        SettingValue::Integer(v)
    }
}

impl From<f64> for SettingValue {
    fn from(v: f64) -> Self {
        SettingValue::Float(v)
    }
}

impl From<bool> for SettingValue {
    fn from(v: bool) -> Self {
        SettingValue::Boolean(v)
    }
}

/// A configuration setting as observed on one pipeline invocation
#[derive(Clone, Debug, Default, PartialEq)]
pub enum Setting {
    /// The setting is not configured
    #[default]
    Absent,
    Scalar(SettingValue),
    List(Vec<SettingValue>)
}

impl Setting {
    /// The order-insensitive string form that gets recorded, or None if the setting is absent.
    /// Scalars become a one-element list and list values are sorted lexicographically as strings.
    pub fn canonical_form(&self) -> Option<Vec<String>> {
        match self {
            Setting::Absent => None,
            Setting::Scalar(v) => Some(vec![v.to_string()]),
            Setting::List(values) => {
                let mut canonical: Vec<String> = values.iter().map(|v| v.to_string()).collect();
                canonical.sort();
                Some(canonical)
            }
        }
    }
}

macro_rules! impl_scalar_setting {
    ($($t:ty),*) => {
        $(
            impl From<$t> for Setting {
                fn from(v: $t) -> Self {
                    Setting::Scalar(v.into())
                }
            }
        )*
    };
}

impl_scalar_setting!(&str, String, i32, i64, f64, bool);

impl<T: Into<SettingValue>> From<Vec<T>> for Setting {
    fn from(values: Vec<T>) -> Self {
        Setting::List(values.into_iter().map(|v| v.into()).collect())
    }
}

/// Outcome of a tracking file update
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum TrackingUpdate {
    /// The recorded value already matched; the file was not touched
    Unchanged,
    /// The file was created or replaced
    Written
}

/// Builds the tracking filename for a setting.
/// Both the writer here and any external reader must go through this to stay in sync.
/// # Arguments
/// * `results_prefix` - root of the results folder
/// * `analysis_name` - analysis folder, may itself contain `/`
/// * `tag` - the tag identifying the setting
pub fn construct_tracker_filename(results_prefix: &Path, analysis_name: &str, tag: &TrackingTag) -> PathBuf {
    results_prefix
        .join(analysis_name)
        .join(format!("{}.{TRACKING_EXTENSION}", tag.segments.join("/")))
}

/// Splits tracking file text into recorded values, ignoring trailing whitespace on each line
fn decode_lines(contents: &str) -> Vec<String> {
    contents.lines()
        .map(|l| l.trim_end().to_string())
        .collect()
}

/// Reads the recorded lines, or None if there is no tracking file yet
fn read_tracking_file(filename: &Path) -> std::io::Result<Option<Vec<String>>> {
    match std::fs::read_to_string(filename) {
        Ok(contents) => Ok(Some(decode_lines(&contents))),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e)
    }
}

/// Creates the sibling temporary file with the same mode a plain create would get, umask included
#[cfg(unix)]
fn create_temp_file(parent: &Path) -> std::io::Result<tempfile::NamedTempFile> {
    use std::os::unix::fs::PermissionsExt;
    tempfile::Builder::new()
        .permissions(std::fs::Permissions::from_mode(0o666))
        .tempfile_in(parent)
}

#[cfg(not(unix))]
fn create_temp_file(parent: &Path) -> std::io::Result<tempfile::NamedTempFile> {
    tempfile::NamedTempFile::new_in(parent)
}

/// Replaces the tracking file by writing a sibling temporary file and renaming it into place.
/// An existing file keeps its permissions across the replacement.
fn write_tracking_file(filename: &Path, lines: &[String]) -> std::io::Result<()> {
    let parent = match filename.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new(".")
    };
    std::fs::create_dir_all(parent)?;

    let previous_permissions = match std::fs::metadata(filename) {
        Ok(metadata) => Some(metadata.permissions()),
        Err(e) if e.kind() == ErrorKind::NotFound => None,
        Err(e) => return Err(e)
    };

    let mut temp_file = create_temp_file(parent)?;
    {
        let mut writer = BufWriter::new(&mut temp_file);
        for line in lines.iter() {
            writeln!(writer, "{line}")?;
        }
        writer.flush()?;
    }
    if let Some(permissions) = previous_permissions {
        temp_file.as_file().set_permissions(permissions)?;
    }
    temp_file.persist(filename).map_err(|e| e.error)?;
    Ok(())
}

/// Records the current value of a setting, but only if it differs from what is already recorded.
/// An absent setting is recorded as an empty file, and an empty file is treated as an absent setting.
/// If the values match, the file and its modification time are left untouched.
/// # Arguments
/// * `results_prefix` - root of the results folder
/// * `analysis_name` - analysis folder the setting belongs to
/// * `current_setting` - the value observed on this invocation
/// * `output_tag` - tag identifying the setting
/// # Errors
/// * if the existing file cannot be read, or the new one cannot be written
pub fn update_analysis_tracking_file(
    results_prefix: &Path, analysis_name: &str, current_setting: &Setting, output_tag: &TrackingTag
) -> std::io::Result<TrackingUpdate> {
    let tracker_filename = construct_tracker_filename(results_prefix, analysis_name, output_tag);
    let canonical = current_setting.canonical_form().unwrap_or_default();
    // compare in the form the file would be read back as
    let expected: Vec<String> = canonical.iter()
        .flat_map(|v| decode_lines(&format!("{v}\n")))
        .collect();

    if let Some(recorded) = read_tracking_file(&tracker_filename)? {
        if recorded == expected {
            debug!("Tracking file {tracker_filename:?} is up to date");
            return Ok(TrackingUpdate::Unchanged);
        }
        debug!("Tracking file {tracker_filename:?} changed: {recorded:?} => {canonical:?}");
    }

    write_tracking_file(&tracker_filename, &canonical)?;
    info!("Updated tracking file {tracker_filename:?}");
    Ok(TrackingUpdate::Written)
}

/// Marks every configured stratification set for the active genome build as in use.
/// # Arguments
/// * `config` - the pipeline configuration
/// * `results_prefix` - root of the results folder
/// # Errors
/// * if the active build has no stratification block
/// * if any tracking file cannot be updated
pub fn update_analysis_tracking_files(config: &PipelineConfig, results_prefix: &Path) -> Result<Vec<(PathBuf, TrackingUpdate)>, TrackingError> {
    let analysis_name = TargetLayout::stratification_analysis(&config.genome_build);
    let setting = Setting::from(IN_USE_MARKER);
    let mut updates = vec![];
    for stratification_set in config.stratification_regions()?.set_names() {
        let tag = TrackingTag::from(stratification_set);
        let outcome = update_analysis_tracking_file(results_prefix, &analysis_name, &setting, &tag)?;
        updates.push((construct_tracker_filename(results_prefix, &analysis_name, &tag), outcome));
    }
    Ok(updates)
}

/// Lists the tracking files that `update_analysis_tracking_files` maintains, for external existence checks.
/// # Arguments
/// * `config` - the pipeline configuration
/// * `results_prefix` - root of the results folder
/// # Errors
/// * if the active build has no stratification block
pub fn stratification_tracking_files(config: &PipelineConfig, results_prefix: &Path) -> Result<Vec<PathBuf>, ConfigError> {
    let analysis_name = TargetLayout::stratification_analysis(&config.genome_build);
    let filenames = config.stratification_regions()?.set_names().into_iter()
        .map(|name| construct_tracker_filename(results_prefix, &analysis_name, &TrackingTag::from(name)))
        .collect();
    Ok(filenames)
}
