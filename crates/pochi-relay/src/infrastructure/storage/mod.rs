//! File-backed configuration.

pub mod mapping_file;

pub use mapping_file::{load_action_table, MappingFile, MappingFileError};
