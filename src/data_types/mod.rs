/// Comparison types and the variant categories they report on
pub mod comparison;
/// Where derived paths are rooted
pub mod layout;
/// Classification of dataset locators by transport
pub mod locator;
/// Dataset and comparison manifests with lookup structures
pub mod manifest;
/// Typed pipeline configuration
pub mod pipeline_config;
