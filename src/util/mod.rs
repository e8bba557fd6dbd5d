/// Helper functions for loading JSON and YAML via serde
pub mod json_io;
