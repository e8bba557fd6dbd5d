/*!
# CLI module
Command line interface functionality for the vctargets binary.
*/

/// The main CLI module that contains the top-level CLI parser and help text
pub mod core;
/// The partition CLI subcommand
pub mod resources;
/// The target construction CLI subcommands
pub mod targets;
/// The tracking file CLI subcommands
pub mod tracking;
