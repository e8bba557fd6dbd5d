use anyhow::{anyhow, bail, Context};
use indexmap::IndexMap;
use serde::Serialize;
use std::io::Read;
use std::path::{Path, PathBuf};

/// A single stratification file listed by the checkpoint stage
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct StratificationFile {
    /// Label for the stratification
    key: String,
    /// Location relative to the stratification root
    relative_path: PathBuf
}

impl StratificationFile {
    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn relative_path(&self) -> &Path {
        &self.relative_path
    }
}

/// Wrapper for the stratification file-of-filenames produced by the checkpoint stage.
#[derive(Clone, Debug, Default)]
pub struct StratificationFiles {
    /// Files in the order they were listed
    files: Vec<StratificationFile>
}

impl StratificationFiles {
    /// This will open a TSV file that is expected to have two columns and no header.
    /// The first column is a label, and the second column is a relative file path.
    /// Row order is preserved, since batching is defined on row indices.
    /// # Arguments
    /// * `core_fn` - the checkpoint output to load
    /// # Errors
    /// * if the file cannot be opened or parsed
    /// * if a label is repeated, a column is missing, or a path is absolute
    pub fn from_tsv(core_fn: &Path) -> anyhow::Result<Self> {
        let fp = std::fs::File::open(core_fn)
            .with_context(|| format!("Error while opening {core_fn:?}:"))?;
        Self::from_reader(fp)
            .with_context(|| format!("Error while reading {core_fn:?}:"))
    }

    /// Same as `from_tsv`, but from any reader
    pub fn from_reader<R: Read>(reader: R) -> anyhow::Result<Self> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .delimiter(b'\t')
            .has_headers(false) // no headers in the file, disable so we do not skip first row
            .from_reader(reader);

        let mut filenames: IndexMap<String, PathBuf> = Default::default();
        for result in csv_reader.records() {
            let row = result?;

            // make sure this is not a duplicate
            let label = row.get(0).ok_or(anyhow!("Missing label on row: {row:?}"))?;
            if filenames.contains_key(label) {
                bail!("Duplicate label found: {label}");
            }

            // results are placed under the build's results area, so the path must be relative
            let filename = row.get(1).ok_or(anyhow!("Missing filename on row: {row:?}"))?;
            let raw_path = PathBuf::from(filename);
            if raw_path.has_root() {
                bail!("Stratification path for {label} must be relative: {filename:?}");
            }

            filenames.insert(label.to_string(), raw_path);
        }

        let files = filenames.into_iter()
            .map(|(key, relative_path)| StratificationFile { key, relative_path })
            .collect();
        Ok(Self {
            files
        })
    }

    pub fn files(&self) -> &[StratificationFile] {
        &self.files
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Gets the labels for our dataset, in file order.
    pub fn labels(&self) -> Vec<&str> {
        self.files.iter()
            .map(|f| f.key.as_str())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CHECKPOINT_TSV: &str = "\
LowComplexity_AllTandemRepeats\tLowComplexity/GRCh38_AllTandemRepeats.bed.gz
GCcontent_gc15\tGCcontent/GRCh38_gc15_slop50.bed.gz
Mappability_lowmappability\tMappability/GRCh38_lowmappabilityall.bed.gz
";

    #[test]
    fn test_from_reader() {
        let strat = StratificationFiles::from_reader(CHECKPOINT_TSV.as_bytes()).unwrap();
        assert_eq!(strat.len(), 3);
        assert!(!strat.is_empty());
        assert_eq!(strat.labels(), vec![
            "LowComplexity_AllTandemRepeats", "GCcontent_gc15", "Mappability_lowmappability"
        ]);
        assert_eq!(strat.files()[1].relative_path(), Path::new("GCcontent/GRCh38_gc15_slop50.bed.gz"));
    }

    #[test]
    fn test_from_tsv() {
        let folder = tempfile::tempdir().unwrap();
        let tsv_fn = folder.path().join("all-stratifications.tsv");
        std::fs::write(&tsv_fn, CHECKPOINT_TSV).unwrap();
        let strat = StratificationFiles::from_tsv(&tsv_fn).unwrap();
        assert_eq!(strat.files()[0].key(), "LowComplexity_AllTandemRepeats");

        assert!(StratificationFiles::from_tsv(&folder.path().join("missing.tsv")).is_err());
    }

    #[test]
    fn test_bad_rows() {
        let duplicate = "a\tx.bed\na\ty.bed\n";
        let err = StratificationFiles::from_reader(duplicate.as_bytes()).unwrap_err();
        assert!(err.to_string().contains("Duplicate label"));

        let absolute = "a\t/x.bed\n";
        assert!(StratificationFiles::from_reader(absolute.as_bytes()).is_err());

        let missing = "a\n";
        assert!(StratificationFiles::from_reader(missing.as_bytes()).is_err());
    }

    #[test]
    fn test_empty() {
        let strat = StratificationFiles::from_reader("".as_bytes()).unwrap();
        assert!(strat.is_empty());
    }
}
