use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Selects which dataset manifest a lookup runs against
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, strum_macros::Display, clap::ValueEnum)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ManifestKind {
    #[default]
    #[value(name = "experimental")]
    Experimental,
    #[value(name = "reference")]
    Reference
}

#[derive(thiserror::Error, Debug)]
pub enum ManifestError {
    #[error("dataset {dataset:?} appears more than once in the {manifest} manifest")]
    DuplicateDataset { manifest: ManifestKind, dataset: String }
}

/// One row of the experimental manifest
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct ExperimentalRecord {
    /// Unique identifier for the dataset
    pub experimental_dataset: String,
    /// Replicate (sample) the dataset was generated from
    pub replicate: String,
    /// Local path or remote URI of the variant calls
    pub vcf: String
}

/// One row of the reference manifest
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct ReferenceRecord {
    /// Unique identifier for the dataset
    pub reference_dataset: String,
    /// Local path or remote URI of the variant calls
    pub vcf: String
}

/// One requested (experimental, reference) pairing
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct ComparisonRecord {
    pub experimental_dataset: String,
    pub reference_dataset: String,
    /// Comparison type tag, e.g. "SNV" or "SV"
    pub comparison_type: String,
    /// Comma-joined report groups this pairing contributes to
    pub report: String
}

impl ComparisonRecord {
    /// Iterates over the report groups in this row; blank entries are skipped
    pub fn report_groups(&self) -> impl Iterator<Item = &str> {
        self.report.split(',')
            .map(|g| g.trim())
            .filter(|g| !g.is_empty())
    }

    /// Returns true if this row contributes to `group`
    pub fn in_report_group(&self, group: &str) -> bool {
        self.report_groups().any(|g| g == group)
    }
}

/// All manifests, indexed for point lookups
#[derive(Clone, Debug, Default)]
pub struct Manifests {
    /// Experimental datasets keyed by identifier, in file order
    experimental: IndexMap<String, ExperimentalRecord>,
    /// Reference datasets keyed by identifier, in file order
    reference: IndexMap<String, ReferenceRecord>,
    /// Requested comparisons, in file order
    comparisons: Vec<ComparisonRecord>
}

impl Manifests {
    /// Builds the lookup structures from parsed rows.
    /// # Errors
    /// * if a dataset identifier is repeated within its manifest
    pub fn new(
        experimental: Vec<ExperimentalRecord>,
        reference: Vec<ReferenceRecord>,
        comparisons: Vec<ComparisonRecord>
    ) -> Result<Self, ManifestError> {
        let mut experimental_lookup: IndexMap<String, ExperimentalRecord> = Default::default();
        for record in experimental.into_iter() {
            if experimental_lookup.contains_key(&record.experimental_dataset) {
                return Err(ManifestError::DuplicateDataset {
                    manifest: ManifestKind::Experimental,
                    dataset: record.experimental_dataset
                });
            }
            experimental_lookup.insert(record.experimental_dataset.clone(), record);
        }

        let mut reference_lookup: IndexMap<String, ReferenceRecord> = Default::default();
        for record in reference.into_iter() {
            if reference_lookup.contains_key(&record.reference_dataset) {
                return Err(ManifestError::DuplicateDataset {
                    manifest: ManifestKind::Reference,
                    dataset: record.reference_dataset
                });
            }
            reference_lookup.insert(record.reference_dataset.clone(), record);
        }

        Ok(Self {
            experimental: experimental_lookup,
            reference: reference_lookup,
            comparisons
        })
    }

    pub fn experimental(&self, dataset: &str) -> Option<&ExperimentalRecord> {
        self.experimental.get(dataset)
    }

    pub fn reference(&self, dataset: &str) -> Option<&ReferenceRecord> {
        self.reference.get(dataset)
    }

    pub fn comparisons(&self) -> &[ComparisonRecord] {
        &self.comparisons
    }

    /// Returns the raw file locator for a dataset, if the dataset exists
    /// # Arguments
    /// * `kind` - which manifest to search
    /// * `dataset` - the dataset identifier
    pub fn locator(&self, kind: ManifestKind, dataset: &str) -> Option<&str> {
        match kind {
            ManifestKind::Experimental => self.experimental(dataset).map(|r| r.vcf.as_str()),
            ManifestKind::Reference => self.reference(dataset).map(|r| r.vcf.as_str())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn experimental_record(dataset: &str, replicate: &str, vcf: &str) -> ExperimentalRecord {
        ExperimentalRecord {
            experimental_dataset: dataset.to_string(),
            replicate: replicate.to_string(),
            vcf: vcf.to_string()
        }
    }

    #[test]
    fn test_report_groups() {
        let record = ComparisonRecord {
            experimental_dataset: "exp1".to_string(),
            reference_dataset: "ref2".to_string(),
            comparison_type: "SNV".to_string(),
            report: "comp2, comp1,,".to_string()
        };
        assert_eq!(record.report_groups().collect::<Vec<_>>(), vec!["comp2", "comp1"]);
        assert!(record.in_report_group("comp1"));
        assert!(!record.in_report_group("comp"));
    }

    #[test]
    fn test_lookups() {
        let manifests = Manifests::new(
            vec![
                experimental_record("exp1", "rep1", "dummy/path1.vcf.gz"),
                experimental_record("exp3", "rep2", "path/to/exp_filename.vcf.gz")
            ],
            vec![ReferenceRecord { reference_dataset: "ref2".to_string(), vcf: "s3://bucket/ref.vcf.gz".to_string() }],
            vec![]
        ).unwrap();

        assert_eq!(manifests.experimental("exp1").unwrap().replicate, "rep1");
        assert!(manifests.experimental("exp2").is_none());
        assert_eq!(manifests.locator(ManifestKind::Experimental, "exp3"), Some("path/to/exp_filename.vcf.gz"));
        assert_eq!(manifests.locator(ManifestKind::Reference, "ref2"), Some("s3://bucket/ref.vcf.gz"));
        assert_eq!(manifests.locator(ManifestKind::Reference, "exp3"), None);
    }

    #[test]
    fn test_duplicate_dataset() {
        let result = Manifests::new(
            vec![
                experimental_record("exp1", "rep1", "a.vcf.gz"),
                experimental_record("exp1", "rep2", "b.vcf.gz")
            ],
            vec![],
            vec![]
        );
        match result {
            Err(ManifestError::DuplicateDataset { manifest, dataset }) => {
                assert_eq!(manifest, ManifestKind::Experimental);
                assert_eq!(dataset, "exp1");
            },
            other => panic!("unexpected result: {other:?}")
        }
    }
}
