/*!
# Parsing module
Contains the logic for parsing input files into meaningful structs / data.
*/
/// Loads the dataset and comparison manifests
pub mod manifests;
/// Loads and validates the pipeline configuration
pub mod pipeline_config;
/// Parser for the stratification file-of-filenames written by the checkpoint stage
pub mod stratifications;
