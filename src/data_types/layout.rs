/*!
# Output layout
Controls where derived paths are rooted.
All paths are produced as `/`-joined strings because they are handed to the workflow engine verbatim.

## Example usage
```rust
use vctargets::data_types::layout::TargetLayoutBuilder;

let layout = TargetLayoutBuilder::default()
    .results_prefix("out")
    .build().unwrap();
assert_eq!(layout.reports_prefix(), "results/reports");
assert_eq!(layout.report_path("comp1", "reg3"), "results/reports/report_comp1_vs_region-reg3.html");
assert_eq!(
    layout.tool_output_path("happy", "exp1", "ref1", "all"),
    "out/happy/exp1/ref1/all/results.vcf.gz"
);
```
*/
use derive_builder::Builder;

/// Default root for the final reports
pub const DEFAULT_REPORTS_PREFIX: &str = "results/reports";
/// Default root for every other pipeline output
pub const DEFAULT_RESULTS_PREFIX: &str = "results";
/// Analysis name under which stratification sets are stored
pub const STRATIFICATION_ANALYSIS: &str = "stratification-sets";

#[derive(Builder, Clone, Debug, PartialEq)]
#[builder(setter(into))]
pub struct TargetLayout {
    /// Root folder for the rendered reports
    #[builder(default = "DEFAULT_REPORTS_PREFIX.to_string()")]
    reports_prefix: String,
    /// Root folder for all intermediate results
    #[builder(default = "DEFAULT_RESULTS_PREFIX.to_string()")]
    results_prefix: String
}

impl Default for TargetLayout {
    fn default() -> Self {
        Self {
            reports_prefix: DEFAULT_REPORTS_PREFIX.to_string(),
            results_prefix: DEFAULT_RESULTS_PREFIX.to_string()
        }
    }
}

impl TargetLayout {
    pub fn reports_prefix(&self) -> &str {
        self.reports_prefix.trim_end_matches('/')
    }

    pub fn results_prefix(&self) -> &str {
        self.results_prefix.trim_end_matches('/')
    }

    /// Final report for a report group restricted to a confident region
    pub fn report_path(&self, group: &str, region: &str) -> String {
        format!("{}/report_{group}_vs_region-{region}.html", self.reports_prefix())
    }

    /// Output of a single comparison-tool run
    /// # Arguments
    /// * `tool` - the output folder named after the comparison tool
    /// * `experimental` - experimental dataset identifier
    /// * `reference` - reference dataset identifier
    /// * `region` - region wildcard, passed through untouched
    pub fn tool_output_path(&self, tool: &str, experimental: &str, reference: &str, region: &str) -> String {
        format!("{}/{tool}/{experimental}/{reference}/{region}/results.vcf.gz", self.results_prefix())
    }

    /// Analysis name used for everything tied to a genome build's stratification sets
    pub fn stratification_analysis(genome_build: &str) -> String {
        format!("{STRATIFICATION_ANALYSIS}/{genome_build}")
    }

    /// Local destination of a stratification file
    /// # Arguments
    /// * `genome_build` - the active genome build
    /// * `relative_path` - the file's path relative to the stratification root
    pub fn stratification_target(&self, genome_build: &str, relative_path: &str) -> String {
        format!(
            "{}/{}/{}",
            self.results_prefix(), Self::stratification_analysis(genome_build), relative_path.trim_start_matches("./")
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_layout() {
        let layout = TargetLayout::default();
        assert_eq!(layout, TargetLayoutBuilder::default().build().unwrap());
        assert_eq!(layout.report_path("comp1", "reg3"), "results/reports/report_comp1_vs_region-reg3.html");
        assert_eq!(
            layout.stratification_target("grch38", "./LowComplexity/GRCh38_AllTandemRepeats.bed.gz"),
            "results/stratification-sets/grch38/LowComplexity/GRCh38_AllTandemRepeats.bed.gz"
        );
    }

    #[test]
    fn test_trailing_slashes() {
        let layout = TargetLayoutBuilder::default()
            .reports_prefix("reports/")
            .results_prefix("/scratch/results/")
            .build().unwrap();
        assert_eq!(layout.report_path("g", "r"), "reports/report_g_vs_region-r.html");
        assert_eq!(
            layout.tool_output_path("truvari", "exp1", "ref2", "{region}"),
            "/scratch/results/truvari/exp1/ref2/{region}/results.vcf.gz"
        );
    }
}
