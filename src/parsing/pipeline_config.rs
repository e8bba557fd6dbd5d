use anyhow::Context;
use log::debug;
use std::path::Path;

use crate::data_types::pipeline_config::PipelineConfig;
use crate::util::json_io::load_structured;

/// Loads and validates the pipeline configuration.
/// JSON is used for `.json` files, YAML for everything else.
/// # Arguments
/// * `filename` - path to the configuration file
/// # Errors
/// * if the file cannot be opened or parsed
/// * if the configuration fails validation, e.g. the active genome build is missing
pub fn load_pipeline_config(filename: &Path) -> anyhow::Result<PipelineConfig> {
    let config: PipelineConfig = load_structured(filename)?;
    config.validate()
        .with_context(|| format!("Invalid configuration in {filename:?}:"))?;
    debug!("Loaded configuration for genome build {:?} from {filename:?}", config.genome_build);
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_config(folder: &Path, name: &str, contents: &str) -> std::path::PathBuf {
        let filename = folder.join(name);
        let mut fp = std::fs::File::create(&filename).unwrap();
        fp.write_all(contents.as_bytes()).unwrap();
        filename
    }

    #[test]
    fn test_load_yaml_config() {
        let folder = tempfile::tempdir().unwrap();
        let config_fn = write_config(folder.path(), "config.yaml", "
genome-build: grch38
sv-toolname: svanalyzer
happy-bedfiles-per-stratification: 6
genomes:
  grch38:
    confident-regions:
      background: {}
");
        let config = load_pipeline_config(&config_fn).unwrap();
        assert_eq!(config.sv_toolname, "svanalyzer");
        assert_eq!(config.happy_bedfiles_per_stratification, 6);
        assert!(config.active_genome().unwrap().confident_regions["background"].inclusion().is_none());
    }

    #[test]
    fn test_load_json_config() {
        let folder = tempfile::tempdir().unwrap();
        let config_fn = write_config(folder.path(), "config.json", r#"{
            "genome-build": "grch38",
            "sv-toolname": "truvari",
            "happy-bedfiles-per-stratification": 2,
            "genomes": {"grch38": {"confident-regions": {"hcr": {"inclusion": "HG002"}}}}
        }"#);
        let config = load_pipeline_config(&config_fn).unwrap();
        let region = &config.active_genome().unwrap().confident_regions["hcr"];
        assert!(region.applies_to(&["HG002"]));
        assert!(!region.applies_to(&["HG003"]));
    }

    #[test]
    fn test_invalid_config() {
        let folder = tempfile::tempdir().unwrap();
        let config_fn = write_config(folder.path(), "config.yaml", "
genome-build: grch37
sv-toolname: truvari
happy-bedfiles-per-stratification: 2
genomes:
  grch38: {}
");
        let err = load_pipeline_config(&config_fn).unwrap_err();
        assert!(format!("{err:#}").contains("grch37"));
    }
}
