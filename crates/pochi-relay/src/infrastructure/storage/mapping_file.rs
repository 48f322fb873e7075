//! Keyboard mapping file: TOML overrides for the action table.
//!
//! ```toml
//! # Keep the built-in bindings and change two of them.
//! replace_defaults = false
//!
//! [mappings]
//! Blackout = ["Period"]
//! Next = ["PageDown"]
//! ```
//!
//! Command names are matched ignoring ASCII case.  Key names are the
//! [`KeyCode`] variant names and are case-sensitive.
//!
//! With `replace_defaults = true` the file must bind every command; the
//! resulting table is checked for totality and any gap is a startup error.

use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};

use pochi_core::{
    ActionTable, ActionTableError, CommandType, KeyCode, KeyboardAction, KeyboardActionError,
};
use serde::Deserialize;
use thiserror::Error;
use tracing::info;

/// Error type for mapping file operations.
#[derive(Debug, Error)]
pub enum MappingFileError {
    /// The file could not be read.
    #[error("I/O error reading mapping file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The TOML content could not be parsed.
    #[error("failed to parse mapping file: {0}")]
    Parse(#[from] toml::de::Error),

    /// A `[mappings]` key is not a command name.
    #[error("unknown command '{0}' in mapping file")]
    UnknownCommand(String),

    /// Two `[mappings]` keys name the same command.
    #[error("command {0} is mapped more than once")]
    DuplicateCommand(CommandType),

    /// A command is bound to an empty key list.
    #[error("invalid mapping for {command}: {source}")]
    InvalidAction {
        command: CommandType,
        #[source]
        source: KeyboardActionError,
    },

    /// The resulting table does not cover every command.
    #[error(transparent)]
    Incomplete(#[from] ActionTableError),
}

/// On-disk schema.
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct MappingFile {
    /// Start from an empty table instead of the built-in bindings.
    #[serde(default)]
    pub replace_defaults: bool,
    /// Command name → keys, pressed and released in order.
    #[serde(default)]
    pub mappings: BTreeMap<String, Vec<KeyCode>>,
}

impl MappingFile {
    /// Parses mapping TOML.
    ///
    /// # Errors
    ///
    /// [`MappingFileError::Parse`] on malformed TOML or unknown key names.
    pub fn from_toml(content: &str) -> Result<Self, MappingFileError> {
        Ok(toml::from_str(content)?)
    }

    /// Reads and parses the file at `path`.
    ///
    /// # Errors
    ///
    /// [`MappingFileError::Io`] if the file cannot be read, or
    /// [`MappingFileError::Parse`] if its content is malformed.
    pub fn load(path: &Path) -> Result<Self, MappingFileError> {
        let content = std::fs::read_to_string(path).map_err(|source| MappingFileError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&content)
    }

    /// Builds the action table described by this file.
    ///
    /// # Errors
    ///
    /// Any [`MappingFileError`] other than `Io`/`Parse`.
    pub fn into_table(self) -> Result<ActionTable, MappingFileError> {
        let mut bindings: HashMap<CommandType, KeyboardAction> = HashMap::new();
        for (name, keys) in self.mappings {
            let command = CommandType::from_name_ignore_case(name.trim())
                .ok_or_else(|| MappingFileError::UnknownCommand(name.clone()))?;
            let action = KeyboardAction::from_keys(&keys)
                .map_err(|source| MappingFileError::InvalidAction { command, source })?;
            if bindings.insert(command, action).is_some() {
                return Err(MappingFileError::DuplicateCommand(command));
            }
        }

        if self.replace_defaults {
            Ok(ActionTable::from_mappings(bindings)?)
        } else {
            Ok(ActionTable::defaults().with_overrides(bindings))
        }
    }
}

/// Loads the action table for the relay.
///
/// `None` yields the built-in defaults.
///
/// # Errors
///
/// Any [`MappingFileError`] from reading, parsing, or validating the file.
pub fn load_action_table(path: Option<&Path>) -> Result<ActionTable, MappingFileError> {
    let Some(path) = path else {
        return Ok(ActionTable::defaults());
    };
    let table = MappingFile::load(path)?.into_table()?;
    info!(path = %path.display(), "loaded keyboard mappings");
    Ok(table)
}

// ── Tests ─────────────────────────────────────────────────────────────────────
