use anyhow::Context;
use log::debug;
use std::path::Path;

use crate::data_types::manifest::{ComparisonRecord, ExperimentalRecord, Manifests, ReferenceRecord};

/// Reads every row of a manifest table into a `Vec`.
/// Files ending in `.csv` are comma-delimited, everything else is treated as TSV.
/// The first row must be a header with the expected column names.
/// # Arguments
/// * `filename` - the manifest to read
pub fn load_table<T: serde::de::DeserializeOwned>(filename: &Path) -> anyhow::Result<Vec<T>> {
    let is_csv: bool = filename.extension().unwrap_or_default() == "csv";
    let delimiter: u8 = if is_csv { b',' } else { b'\t' };
    let mut csv_reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .trim(csv::Trim::All)
        .from_path(filename)
        .with_context(|| format!("Error while opening {filename:?}:"))?;

    let rows: Vec<T> = csv_reader.deserialize()
        .collect::<Result<_, _>>()
        .with_context(|| format!("Error while reading {filename:?}:"))?;
    debug!("Loaded {} rows from {filename:?}", rows.len());
    Ok(rows)
}

/// Loads all manifests into lookup structures; any manifest that is not provided is treated as empty.
/// # Arguments
/// * `experimental_fn` - experimental dataset manifest
/// * `reference_fn` - reference dataset manifest
/// * `comparisons_fn` - requested comparisons manifest
/// # Errors
/// * if any provided file cannot be parsed
/// * if a dataset identifier is duplicated
pub fn load_manifests(
    experimental_fn: Option<&Path>,
    reference_fn: Option<&Path>,
    comparisons_fn: Option<&Path>
) -> anyhow::Result<Manifests> {
    let experimental: Vec<ExperimentalRecord> = match experimental_fn {
        Some(f) => load_table(f)?,
        None => vec![]
    };
    let reference: Vec<ReferenceRecord> = match reference_fn {
        Some(f) => load_table(f)?,
        None => vec![]
    };
    let comparisons: Vec<ComparisonRecord> = match comparisons_fn {
        Some(f) => load_table(f)?,
        None => vec![]
    };
    let manifests = Manifests::new(experimental, reference, comparisons)?;
    Ok(manifests)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data_types::manifest::ManifestKind;
    use std::io::Write;
    use std::path::PathBuf;

    fn write_table(folder: &Path, name: &str, contents: &str) -> PathBuf {
        let filename = folder.join(name);
        let mut fp = std::fs::File::create(&filename).unwrap();
        fp.write_all(contents.as_bytes()).unwrap();
        filename
    }

    #[test]
    fn test_load_manifests() {
        let folder = tempfile::tempdir().unwrap();
        let exp_fn = write_table(folder.path(), "experiments.tsv",
            "experimental_dataset\treplicate\tvcf\n\
             exp1\trep1\tdummy/path1.vcf.gz\n\
             exp2\trep1\tdummy/path2.vcf.gz\n"
        );
        let ref_fn = write_table(folder.path(), "references.csv",
            "reference_dataset,vcf\n\
             ref1,dummy/path3.vcf.gz\n\
             ref2,https://example.org/ref2.vcf.gz\n"
        );
        let comp_fn = write_table(folder.path(), "comparisons.tsv",
            "experimental_dataset\treference_dataset\tcomparison_type\treport\n\
             exp1\tref1\tSNV\tcomp2\n\
             exp2\tref2\tSV\tcomp3,comp1\n"
        );

        let manifests = load_manifests(Some(&exp_fn), Some(&ref_fn), Some(&comp_fn)).unwrap();
        assert_eq!(manifests.experimental("exp2").unwrap().vcf, "dummy/path2.vcf.gz");
        assert_eq!(manifests.locator(ManifestKind::Reference, "ref2"), Some("https://example.org/ref2.vcf.gz"));
        assert_eq!(manifests.comparisons().len(), 2);
        assert_eq!(manifests.comparisons()[1].report, "comp3,comp1");
        assert_eq!(manifests.comparisons()[1].comparison_type, "SV");
    }

    #[test]
    fn test_missing_column() {
        let folder = tempfile::tempdir().unwrap();
        let exp_fn = write_table(folder.path(), "experiments.tsv",
            "experimental_dataset\tvcf\n\
             exp1\tdummy/path1.vcf.gz\n"
        );
        assert!(load_manifests(Some(&exp_fn), None, None).is_err());
    }

    #[test]
    fn test_duplicate_rows() {
        let folder = tempfile::tempdir().unwrap();
        let ref_fn = write_table(folder.path(), "references.tsv",
            "reference_dataset\tvcf\n\
             ref1\ta.vcf.gz\n\
             ref1\tb.vcf.gz\n"
        );
        let err = load_manifests(None, Some(&ref_fn), None).unwrap_err();
        assert!(err.to_string().contains("ref1"));
    }

    #[test]
    fn test_no_manifests() {
        let manifests = load_manifests(None, None, None).unwrap();
        assert!(manifests.comparisons().is_empty());
        assert!(manifests.experimental("exp1").is_none());
    }
}
