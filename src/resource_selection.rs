use indexmap::IndexMap;
use rand::seq::SliceRandom;
use rand::Rng;
use serde::Deserialize;

/// Mapping from a partition group name to the cluster partitions in that group
pub type PartitionGroups = IndexMap<String, Vec<String>>;

/// User resource configuration; only the partition groups are used here
#[derive(Clone, Debug, Default, Deserialize)]
pub struct ResourceConfig {
    #[serde(default)]
    pub partitions: PartitionGroups
}

#[derive(thiserror::Error, Debug)]
pub enum PartitionError {
    #[error("configured partition set does not match anything in user resource config: {name}")]
    UnknownPartitionSet { name: String },
    #[error("configured partition set {name} does not list any partitions")]
    EmptyPartitionSet { name: String }
}

/// Picks one partition at random from a configured partition group, spreading jobs across equivalent partitions.
/// # Arguments
/// * `partition_name` - the partition group requested by a rule
/// * `all_partitions` - every configured partition group
/// * `rng` - random source
/// # Errors
/// * if the group is not configured, or has no partitions
pub fn select_partition<'a, R: Rng + ?Sized>(
    partition_name: &str, all_partitions: &'a PartitionGroups, rng: &mut R
) -> Result<&'a str, PartitionError> {
    let partitions = all_partitions.get(partition_name)
        .ok_or_else(|| PartitionError::UnknownPartitionSet { name: partition_name.to_string() })?;
    partitions.choose(rng)
        .map(|p| p.as_str())
        .ok_or_else(|| PartitionError::EmptyPartitionSet { name: partition_name.to_string() })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    fn partition_groups() -> PartitionGroups {
        let mut groups = PartitionGroups::default();
        groups.insert("small".to_string(), vec!["p1".to_string(), "p2".to_string(), "p3".to_string()]);
        groups.insert("large".to_string(), vec!["big1".to_string()]);
        groups.insert("none".to_string(), vec![]);
        groups
    }

    #[test]
    fn test_select_partition() {
        let groups = partition_groups();
        let mut rng = SmallRng::seed_from_u64(0);
        for _ in 0..50 {
            let selected = select_partition("small", &groups, &mut rng).unwrap();
            assert!(groups["small"].iter().any(|p| p == selected));
        }
        assert_eq!(select_partition("large", &groups, &mut rng).unwrap(), "big1");
    }

    #[test]
    fn test_resource_config() {
        let yaml = "partitions:\n  small: [p1, p2]\n  large:\n    - big1\nother: ignored\n";
        let resources: ResourceConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(resources.partitions.len(), 2);
        assert_eq!(resources.partitions["small"], vec!["p1".to_string(), "p2".to_string()]);

        let empty: ResourceConfig = serde_yaml::from_str("other: 1\n").unwrap();
        assert!(empty.partitions.is_empty());
    }

    #[test]
    fn test_select_partition_errors() {
        let groups = partition_groups();
        let mut rng = SmallRng::seed_from_u64(0);
        let err = select_partition("medium", &groups, &mut rng).unwrap_err();
        assert!(err.to_string().contains("medium"));
        assert!(matches!(
            select_partition("none", &groups, &mut rng),
            Err(PartitionError::EmptyPartitionSet { .. })
        ));
    }
}
