use indexmap::IndexMap;
use regex::Regex;
use serde::Deserialize;
use std::collections::BTreeSet;

/// Name of the stratification set that applies universally; it is never filtered or tracked
pub const UNIVERSAL_REGION: &str = "*";

#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error("genome-build {build:?} has no entry under \"genomes\"")]
    MissingGenomeBuild { build: String },
    #[error("genome build {build:?} has no \"stratification-regions\" block")]
    MissingStratifications { build: String },
    #[error("region {name:?} is defined more than once for genome build {build:?}")]
    DuplicateRegion { build: String, name: String },
    #[error("invalid inclusion pattern {pattern:?}: {source}")]
    InvalidInclusion { pattern: String, source: regex::Error },
    #[error("happy-bedfiles-per-stratification must be >0")]
    ZeroBatchSize
}

/// A regular expression restricting which replicate identifiers a region applies to.
/// Matching is always against the full identifier, never a substring.
#[derive(Clone, Debug, Deserialize)]
#[serde(try_from = "String")]
pub struct InclusionPattern {
    /// The pattern as written in the configuration
    pattern: String,
    /// Anchored version of `pattern`
    regex: Regex
}

impl TryFrom<String> for InclusionPattern {
    type Error = ConfigError;

    fn try_from(pattern: String) -> Result<Self, Self::Error> {
        let regex = Regex::new(&format!("^(?:{pattern})$"))
            .map_err(|source| ConfigError::InvalidInclusion { pattern: pattern.clone(), source })?;
        Ok(Self {
            pattern,
            regex
        })
    }
}

impl PartialEq for InclusionPattern {
    fn eq(&self, other: &Self) -> bool {
        self.pattern == other.pattern
    }
}

impl InclusionPattern {
    /// The pattern exactly as configured
    pub fn as_str(&self) -> &str {
        &self.pattern
    }

    /// Returns true if the entire `value` matches the pattern
    pub fn is_full_match(&self, value: &str) -> bool {
        self.regex.is_match(value)
    }
}

/// Shapes a confident region may take in the configuration file
#[derive(Deserialize)]
#[serde(untagged)]
enum RawConfidentRegion {
    /// Bare locator string with no inclusion rule
    Locator(String),
    /// Key present with no value
    Unset(()),
    /// Full mapping
    Definition {
        #[serde(default)]
        source: Option<String>,
        #[serde(default)]
        inclusion: Option<String>
    }
}

/// A confident region, optionally restricted to a subset of replicates
#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(try_from = "RawConfidentRegion")]
pub struct ConfidentRegion {
    /// Where the region file comes from, if configured
    source: Option<String>,
    /// If set, only replicates matching this pattern use the region
    inclusion: Option<InclusionPattern>
}

impl TryFrom<RawConfidentRegion> for ConfidentRegion {
    type Error = ConfigError;

    fn try_from(raw: RawConfidentRegion) -> Result<Self, Self::Error> {
        match raw {
            RawConfidentRegion::Locator(source) => Ok(Self { source: Some(source), inclusion: None }),
            RawConfidentRegion::Unset(()) => Ok(Self::default()),
            RawConfidentRegion::Definition { source, inclusion } => {
                let inclusion = inclusion.map(InclusionPattern::try_from).transpose()?;
                Ok(Self { source, inclusion })
            }
        }
    }
}

impl ConfidentRegion {
    pub fn source(&self) -> Option<&str> {
        self.source.as_deref()
    }

    pub fn inclusion(&self) -> Option<&InclusionPattern> {
        self.inclusion.as_ref()
    }

    /// Returns true if this region applies to at least one of the provided replicates.
    /// Regions without an inclusion rule apply to everything.
    /// # Arguments
    /// * `replicates` - the replicate identifiers to test
    pub fn applies_to<S: AsRef<str>>(&self, replicates: &[S]) -> bool {
        match self.inclusion.as_ref() {
            Some(pattern) => replicates.iter().any(|r| pattern.is_full_match(r.as_ref())),
            None => true
        }
    }
}

/// One entry of the ordered stratification region list
#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct RegionDefinition {
    pub name: String,
    pub label: String,
    pub inclusion: InclusionPattern
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(rename_all = "kebab-case")]
pub struct StratificationRegions {
    /// Remote host serving the stratification files
    #[serde(default)]
    pub ftp: Option<String>,
    /// Directory on the remote host
    #[serde(default)]
    pub dir: Option<String>,
    /// Name of the file-of-filenames listing every stratification
    #[serde(default)]
    pub all_stratifications: Option<String>,
    /// Region definitions in configuration order
    #[serde(alias = "region-inclusions")]
    pub region_definitions: Vec<RegionDefinition>
}

impl StratificationRegions {
    /// Returns (name, label, inclusion) for every definition, in configuration order.
    pub fn flatten(&self) -> Vec<(&str, &str, &str)> {
        self.region_definitions.iter()
            .map(|d| (d.name.as_str(), d.label.as_str(), d.inclusion.as_str()))
            .collect()
    }

    /// Same as `flatten`, but interleaved into a single sequence of strings.
    pub fn flatten_strings(&self) -> Vec<&str> {
        self.flatten().into_iter()
            .flat_map(|(name, label, inclusion)| [name, label, inclusion])
            .collect()
    }

    /// Names of every stratification set except the universal one
    pub fn set_names(&self) -> Vec<&str> {
        self.region_definitions.iter()
            .map(|d| d.name.as_str())
            .filter(|&name| name != UNIVERSAL_REGION)
            .collect()
    }
}

/// Everything configured for a single genome build
#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(rename_all = "kebab-case")]
pub struct GenomeConfig {
    #[serde(default)]
    pub confident_regions: IndexMap<String, ConfidentRegion>,
    #[serde(default)]
    pub stratification_regions: Option<StratificationRegions>
}

/// Top-level pipeline configuration
#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(rename_all = "kebab-case")]
pub struct PipelineConfig {
    /// The active genome build
    pub genome_build: String,
    /// Tool used for comparisons that are not SNV
    pub sv_toolname: String,
    /// Number of stratification files handed to each hap.py batch
    pub happy_bedfiles_per_stratification: usize,
    /// Per-build configuration
    pub genomes: IndexMap<String, GenomeConfig>
}

impl PipelineConfig {
    /// Checks the configuration for problems that serde cannot catch on its own.
    /// # Errors
    /// * if the active genome build is not configured
    /// * if the stratification batch size is 0
    /// * if any build defines the same stratification region twice
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.active_genome()?;
        if self.happy_bedfiles_per_stratification == 0 {
            return Err(ConfigError::ZeroBatchSize);
        }

        for (build, genome) in self.genomes.iter() {
            if let Some(strats) = genome.stratification_regions.as_ref() {
                let mut observed: BTreeSet<&str> = Default::default();
                for definition in strats.region_definitions.iter() {
                    if !observed.insert(definition.name.as_str()) {
                        return Err(ConfigError::DuplicateRegion {
                            build: build.clone(),
                            name: definition.name.clone()
                        });
                    }
                }
            }
        }
        Ok(())
    }

    /// Configuration for the active genome build
    pub fn active_genome(&self) -> Result<&GenomeConfig, ConfigError> {
        self.genomes.get(&self.genome_build)
            .ok_or_else(|| ConfigError::MissingGenomeBuild { build: self.genome_build.clone() })
    }

    /// Stratification block for the active genome build
    pub fn stratification_regions(&self) -> Result<&StratificationRegions, ConfigError> {
        self.active_genome()?
            .stratification_regions.as_ref()
            .ok_or_else(|| ConfigError::MissingStratifications { build: self.genome_build.clone() })
    }
}
