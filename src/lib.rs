/// Command line interface functionality
pub mod cli;
/// Contains various shared data types
pub mod data_types;
/// Tooling for parsing input files into meaningful structs / data
pub mod parsing;
/// Random selection of cluster partitions for rule resources
pub mod resource_selection;
/// Core logic for deriving report targets and per-report lookups
pub mod target_construction;
/// Change-only tracking files for configuration settings
pub mod tracking;
/// Various utility functions that tend to be very generic
pub mod util;
