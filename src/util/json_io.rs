use anyhow::Context;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

/// Helper function that loads a JSON file into some type
/// # Arguments
/// * `filename` - the file path to open and parse
/// # Errors
/// * if the file does not open properly
/// * if the deserialization throws errors
pub fn load_json<T: serde::de::DeserializeOwned>(filename: &Path) -> anyhow::Result<T> {
    let fp = BufReader::new(
        File::open(filename).with_context(|| format!("Error while opening {filename:?}:"))?
    );
    let result: T = serde_json::from_reader(fp)
        .with_context(|| format!("Error while deserializing {filename:?}:"))?;
    Ok(result)
}

/// Helper function that loads a YAML file into some type
/// # Arguments
/// * `filename` - the file path to open and parse
/// # Errors
/// * if the file does not open properly
/// * if the deserialization throws errors
pub fn load_yaml<T: serde::de::DeserializeOwned>(filename: &Path) -> anyhow::Result<T> {
    let fp = BufReader::new(
        File::open(filename).with_context(|| format!("Error while opening {filename:?}:"))?
    );
    let result: T = serde_yaml::from_reader(fp)
        .with_context(|| format!("Error while deserializing {filename:?}:"))?;
    Ok(result)
}

/// Loads a structured file, picking JSON for `.json` and YAML for anything else
/// # Arguments
/// * `filename` - the file path to open and parse
pub fn load_structured<T: serde::de::DeserializeOwned>(filename: &Path) -> anyhow::Result<T> {
    if filename.extension().unwrap_or_default() == "json" {
        load_json(filename)
    } else {
        load_yaml(filename)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use indexmap::IndexMap;
    use std::io::Write;

    #[test]
    fn test_load_structured() {
        let folder = tempfile::tempdir().unwrap();

        let json_fn = folder.path().join("partitions.json");
        let mut fp = File::create(&json_fn).unwrap();
        writeln!(fp, "{{\"small\": [\"p1\", \"p2\"], \"large\": [\"p3\"]}}").unwrap();
        drop(fp);

        let yaml_fn = folder.path().join("partitions.yaml");
        let mut fp = File::create(&yaml_fn).unwrap();
        writeln!(fp, "small: [p1, p2]\nlarge:\n  - p3").unwrap();
        drop(fp);

        let from_json: IndexMap<String, Vec<String>> = load_structured(&json_fn).unwrap();
        let from_yaml: IndexMap<String, Vec<String>> = load_structured(&yaml_fn).unwrap();
        assert_eq!(from_json, from_yaml);
        assert_eq!(from_yaml.keys().collect::<Vec<_>>(), vec!["small", "large"]);
    }

    #[test]
    fn test_missing_file() {
        let folder = tempfile::tempdir().unwrap();
        let result: anyhow::Result<IndexMap<String, String>> = load_structured(&folder.path().join("missing.yaml"));
        assert!(result.is_err());
    }
}
