use serde::Serialize;
use std::str::FromStr;

/// The category of a requested comparison, as tagged in the comparison manifest
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, strum_macros::AsRefStr, strum_macros::Display, strum_macros::EnumString)]
pub enum ComparisonType {
    /// Small variants, benchmarked with hap.py
    #[strum(serialize = "SNV")]
    Snv,
    /// Structural variants, benchmarked with the configured SV tool
    #[strum(serialize = "SV")]
    Sv
}

impl ComparisonType {
    /// Parses a manifest tag, returning None for anything unrecognized
    pub fn from_tag(tag: &str) -> Option<Self> {
        Self::from_str(tag).ok()
    }

    /// The variant categories reported for this comparison type
    pub fn variant_categories(&self) -> &'static [VariantCategory] {
        match self {
            ComparisonType::Snv => &[VariantCategory::Snp, VariantCategory::Indel],
            ComparisonType::Sv => &[VariantCategory::Sv]
        }
    }
}

/// Variant categories that appear in the final reports
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize, strum_macros::AsRefStr, strum_macros::Display)]
pub enum VariantCategory {
    #[strum(serialize = "SNP")]
    #[serde(rename = "SNP")]
    Snp,
    #[strum(serialize = "INDEL")]
    #[serde(rename = "INDEL")]
    Indel,
    #[strum(serialize = "SV")]
    #[serde(rename = "SV")]
    Sv
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_tag() {
        assert_eq!(ComparisonType::from_tag("SNV"), Some(ComparisonType::Snv));
        assert_eq!(ComparisonType::from_tag("SV"), Some(ComparisonType::Sv));
        assert_eq!(ComparisonType::from_tag("snv"), None);
        assert_eq!(ComparisonType::from_tag("CNV"), None);
        assert_eq!(ComparisonType::Snv.to_string(), "SNV");
    }

    #[test]
    fn test_variant_categories() {
        assert_eq!(ComparisonType::Snv.variant_categories(), &[VariantCategory::Snp, VariantCategory::Indel]);
        assert_eq!(ComparisonType::Sv.variant_categories(), &[VariantCategory::Sv]);
        assert_eq!(VariantCategory::Indel.as_ref(), "INDEL");
    }
}
