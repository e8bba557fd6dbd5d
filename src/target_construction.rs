/*!
# Target construction
Derives every path the workflow engine needs from the configuration and manifests.
Nothing here touches the filesystem; all results are plain strings.

## Example usage
```rust
use vctargets::data_types::layout::TargetLayout;
use vctargets::data_types::manifest::{ComparisonRecord, ExperimentalRecord, Manifests};
use vctargets::data_types::pipeline_config::PipelineConfig;
use vctargets::target_construction::TargetConstructor;

let config: PipelineConfig = serde_yaml::from_str("
genome-build: grch38
sv-toolname: truvari
happy-bedfiles-per-stratification: 4
genomes:
  grch38:
    confident-regions:
      all: {}
      hg002-only: {inclusion: HG002}
").unwrap();

let manifests = Manifests::new(
    vec![ExperimentalRecord {
        experimental_dataset: "exp1".to_string(),
        replicate: "HG001".to_string(),
        vcf: "calls/exp1.vcf.gz".to_string()
    }],
    vec![],
    vec![ComparisonRecord {
        experimental_dataset: "exp1".to_string(),
        reference_dataset: "giab".to_string(),
        comparison_type: "SNV".to_string(),
        report: "batch1".to_string()
    }]
).unwrap();

// the HG002-only region is dropped because no replicate in "batch1" matches it
let constructor = TargetConstructor::new(&config, &manifests, TargetLayout::default()).unwrap();
assert_eq!(
    constructor.construct_targets().unwrap(),
    vec!["results/reports/report_batch1_vs_region-all.html".to_string()]
);
```
*/
use itertools::Itertools;
use log::debug;
use serde::Serialize;
use std::collections::BTreeSet;

use crate::data_types::comparison::{ComparisonType, VariantCategory};
use crate::data_types::layout::TargetLayout;
use crate::data_types::locator::LocatorScheme;
use crate::data_types::manifest::{ComparisonRecord, ManifestKind, Manifests};
use crate::data_types::pipeline_config::{ConfigError, GenomeConfig, PipelineConfig};
use crate::parsing::stratifications::{StratificationFile, StratificationFiles};

/// Output folder used for SNV comparisons
pub const SNV_TOOLNAME: &str = "happy";

#[derive(thiserror::Error, Debug)]
pub enum TargetError {
    #[error("unrecognized comparison type {tag:?}, expected one of: SNV, SV")]
    UnknownComparisonType { tag: String },
    #[error("dataset {dataset:?} is not present in the {manifest} manifest")]
    UnknownDataset { manifest: ManifestKind, dataset: String },
    #[error("stratification batch {index} is out of range, only {count} batches exist")]
    BatchOutOfRange { index: usize, count: usize },
    #[error(transparent)]
    Config(#[from] ConfigError)
}

/// A file locator together with the transport needed to fetch it
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct ResolvedLocator<'a> {
    pub locator: &'a str,
    pub scheme: LocatorScheme
}

/// A stratification file assigned to a batch, along with where it lands locally
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct BatchedStratification<'a> {
    /// Index of the file within the full listing
    pub index: usize,
    pub file: &'a StratificationFile,
    /// Local destination under the genome build's results area
    pub target: String
}

/// Computes targets and lookups for the active genome build
pub struct TargetConstructor<'a> {
    /// The validated pipeline configuration
    config: &'a PipelineConfig,
    /// Shortcut to the active build's configuration
    genome: &'a GenomeConfig,
    /// Loaded manifests
    manifests: &'a Manifests,
    /// Controls where outputs are rooted
    layout: TargetLayout
}

impl<'a> TargetConstructor<'a> {
    /// Constructor, validates the configuration
    /// # Arguments
    /// * `config` - the pipeline configuration
    /// * `manifests` - the loaded manifests
    /// * `layout` - output folder layout
    /// # Errors
    /// * if the configuration does not validate
    pub fn new(config: &'a PipelineConfig, manifests: &'a Manifests, layout: TargetLayout) -> Result<Self, ConfigError> {
        config.validate()?;
        let genome = config.active_genome()?;
        Ok(Self {
            config,
            genome,
            manifests,
            layout
        })
    }

    /// Every report group referenced anywhere in the comparison manifest, sorted and deduplicated
    pub fn report_groups(&self) -> Vec<&'a str> {
        self.manifests.comparisons().iter()
            .flat_map(|c| c.report_groups())
            .sorted()
            .dedup()
            .collect()
    }

    /// All comparison rows that contribute to a report group, in manifest order
    fn group_comparisons<'s>(&self, group: &'s str) -> impl Iterator<Item = &'a ComparisonRecord> + 's
    where 'a: 's {
        self.manifests.comparisons().iter()
            .filter(move |c| c.in_report_group(group))
    }

    /// Builds the full set of final report targets: one per report group and applicable confident region.
    /// A region with an inclusion pattern only applies to a group if one of the group's replicates fully matches it.
    /// # Errors
    /// * if a comparison references an experimental dataset that is not in the manifest
    pub fn construct_targets(&self) -> Result<Vec<String>, TargetError> {
        let mut targets: BTreeSet<String> = Default::default();
        for group in self.report_groups() {
            let replicates = self.comparison_subjects(group)?;
            for (region_name, region) in self.genome.confident_regions.iter() {
                if region.applies_to(&replicates) {
                    targets.insert(self.layout.report_path(group, region_name));
                } else {
                    debug!("Region {region_name:?} excluded from report group {group:?}");
                }
            }
        }
        Ok(targets.into_iter().collect())
    }

    /// Comparison-tool outputs implied by a report, one per contributing comparison row.
    /// SNV comparisons go to the hap.py folder, SV comparisons to the configured SV tool.
    /// # Arguments
    /// * `group` - the report group
    /// * `region` - the region wildcard, passed through untouched
    /// # Errors
    /// * if any comparison in the group has an unrecognized comparison type
    pub fn comparison_tool_outputs(&self, group: &str, region: &str) -> Result<Vec<String>, TargetError> {
        self.group_comparisons(group)
            .map(|c| {
                let tool = match ComparisonType::from_tag(&c.comparison_type) {
                    Some(ComparisonType::Snv) => SNV_TOOLNAME,
                    Some(ComparisonType::Sv) => self.config.sv_toolname.as_str(),
                    None => return Err(TargetError::UnknownComparisonType { tag: c.comparison_type.clone() })
                };
                Ok(self.layout.tool_output_path(tool, &c.experimental_dataset, &c.reference_dataset, region))
            })
            .collect()
    }

    /// The replicate identifiers of every experimental dataset in a report group, sorted and deduplicated
    /// # Errors
    /// * if a comparison references an experimental dataset that is not in the manifest
    pub fn comparison_subjects(&self, group: &str) -> Result<Vec<&'a str>, TargetError> {
        let mut replicates: BTreeSet<&'a str> = Default::default();
        for comparison in self.group_comparisons(group) {
            let record = self.manifests.experimental(&comparison.experimental_dataset)
                .ok_or_else(|| TargetError::UnknownDataset {
                    manifest: ManifestKind::Experimental,
                    dataset: comparison.experimental_dataset.clone()
                })?;
            replicates.insert(record.replicate.as_str());
        }
        Ok(replicates.into_iter().collect())
    }

    /// The variant categories reported on for a report group, sorted
    /// # Errors
    /// * if any comparison in the group has an unrecognized comparison type
    pub fn variant_types(&self, group: &str) -> Result<Vec<VariantCategory>, TargetError> {
        let mut categories: BTreeSet<VariantCategory> = Default::default();
        for comparison in self.group_comparisons(group) {
            let comparison_type = ComparisonType::from_tag(&comparison.comparison_type)
                .ok_or_else(|| TargetError::UnknownComparisonType { tag: comparison.comparison_type.clone() })?;
            categories.extend(comparison_type.variant_categories().iter().copied());
        }
        Ok(categories.into_iter().collect())
    }

    /// Returns the file locator for a dataset exactly as configured
    /// # Arguments
    /// * `kind` - which manifest to search
    /// * `dataset` - the dataset identifier
    /// # Errors
    /// * if the dataset is not in the manifest
    pub fn dataset_locator(&self, kind: ManifestKind, dataset: &str) -> Result<&'a str, TargetError> {
        self.manifests.locator(kind, dataset)
            .ok_or_else(|| TargetError::UnknownDataset { manifest: kind, dataset: dataset.to_string() })
    }

    /// Same as `dataset_locator`, but also classifies the transport
    pub fn resolve_locator(&self, kind: ManifestKind, dataset: &str) -> Result<ResolvedLocator<'a>, TargetError> {
        let locator = self.dataset_locator(kind, dataset)?;
        Ok(ResolvedLocator {
            locator,
            scheme: LocatorScheme::classify(locator)
        })
    }

    /// Stratification region definitions for the active build as (name, label, inclusion), in configuration order
    /// # Errors
    /// * if the active build has no stratification block
    pub fn flatten_region_definitions(&self) -> Result<Vec<(&'a str, &'a str, &'a str)>, TargetError> {
        Ok(self.config.stratification_regions()?.flatten())
    }

    /// Number of batches needed to cover every stratification file
    pub fn stratification_batch_count(&self, files: &StratificationFiles) -> usize {
        files.len().div_ceil(self.config.happy_bedfiles_per_stratification)
    }

    /// The stratification files in one batch, each paired with its local target.
    /// Batch `i` covers indices `[i * batch_size, (i + 1) * batch_size)`, truncated to the file count.
    /// # Arguments
    /// * `files` - the full checkpoint listing
    /// * `batch_index` - which batch to return
    /// # Errors
    /// * if `batch_index` is not a valid batch
    pub fn stratification_batch<'f>(&self, files: &'f StratificationFiles, batch_index: usize) -> Result<Vec<BatchedStratification<'f>>, TargetError> {
        let count = self.stratification_batch_count(files);
        if batch_index >= count {
            return Err(TargetError::BatchOutOfRange { index: batch_index, count });
        }

        let batch_size = self.config.happy_bedfiles_per_stratification;
        let start = batch_index * batch_size;
        let end = (start + batch_size).min(files.len());
        let batch = files.files()[start..end].iter()
            .enumerate()
            .map(|(offset, file)| {
                BatchedStratification {
                    index: start + offset,
                    file,
                    target: self.layout.stratification_target(
                        &self.config.genome_build, &file.relative_path().to_string_lossy()
                    )
                }
            })
            .collect();
        Ok(batch)
    }
}
