use serde::Serialize;

/// The transport a retrieval step needs in order to fetch a locator.
/// Classification is purely by prefix; nothing here touches the network.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, strum_macros::AsRefStr, strum_macros::Display)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum LocatorScheme {
    S3,
    Http,
    Ftp,
    Local
}

impl LocatorScheme {
    /// Classifies a file locator by its URI scheme
    /// # Arguments
    /// * `locator` - a local path or remote URI
    pub fn classify(locator: &str) -> Self {
        if locator.starts_with("s3://") {
            LocatorScheme::S3
        } else if locator.starts_with("https://") || locator.starts_with("http://") {
            LocatorScheme::Http
        } else if locator.starts_with("ftp://") {
            LocatorScheme::Ftp
        } else {
            LocatorScheme::Local
        }
    }

    /// Returns true if the locator requires a remote transport
    pub fn is_remote(&self) -> bool {
        !matches!(self, LocatorScheme::Local)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify() {
        assert_eq!(LocatorScheme::classify("my.UD"), LocatorScheme::Local);
        assert_eq!(LocatorScheme::classify("path/to/exp_filename.vcf.gz"), LocatorScheme::Local);
        assert_eq!(LocatorScheme::classify("s3://path/to/file"), LocatorScheme::S3);
        assert_eq!(LocatorScheme::classify("http://website.thing/otherthing"), LocatorScheme::Http);
        assert_eq!(LocatorScheme::classify("https://website.thing/otherthing"), LocatorScheme::Http);
        assert_eq!(LocatorScheme::classify("ftp://website.thing/otherthing"), LocatorScheme::Ftp);

        // scheme must be a prefix, not merely present
        assert_eq!(LocatorScheme::classify("data/s3://file"), LocatorScheme::Local);
        assert!(!LocatorScheme::Local.is_remote());
        assert!(LocatorScheme::Ftp.is_remote());
        assert_eq!(LocatorScheme::S3.to_string(), "s3");
    }
}
