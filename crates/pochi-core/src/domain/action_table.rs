//! The command → keyboard-action table.
//!
//! # Totality
//!
//! An [`ActionTable`] holds exactly one [`KeyboardAction`] per
//! [`CommandType`].  The storage is a fixed array indexed by
//! [`CommandType::index`], so once a table exists a lookup cannot miss.
//! Completeness is checked when the table is built from a partial map
//! ([`ActionTable::from_mappings`]), and the table is never mutated afterwards.
//!
//! # Defaults
//!
//! | Command           | Key        |
//! |-------------------|------------|
//! | Next              | RightArrow |
//! | Prev              | LeftArrow  |
//! | StartPresentation | F5         |
//! | EndPresentation   | Escape     |
//! | Blackout          | B          |
//! | Whiteout          | W          |

use std::collections::HashMap;

use thiserror::Error;

use super::command::CommandType;
use super::keys::{KeyCode, KeyboardAction};

/// Errors raised while building an [`ActionTable`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ActionTableError {
    /// One or more commands have no action.
    #[error("no keyboard action configured for: {}", join_names(.0))]
    Missing(Vec<CommandType>),
}

fn join_names(commands: &[CommandType]) -> String {
    commands
        .iter()
        .map(|c| c.name())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Total, immutable mapping from every [`CommandType`] to its [`KeyboardAction`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionTable {
    actions: [KeyboardAction; CommandType::COUNT],
}

impl ActionTable {
    /// The built-in table used when no overrides are configured.
    pub fn defaults() -> Self {
        Self {
            actions: CommandType::ALL.map(|command| KeyboardAction::single(default_key(command))),
        }
    }

    /// Builds a table from an explicit map.
    ///
    /// # Errors
    ///
    /// Returns [`ActionTableError::Missing`] listing every command (in
    /// declaration order) that has no entry in `mappings`.
    pub fn from_mappings(
        mut mappings: HashMap<CommandType, KeyboardAction>,
    ) -> Result<Self, ActionTableError> {
        let missing: Vec<CommandType> = CommandType::ALL
            .into_iter()
            .filter(|c| !mappings.contains_key(c))
            .collect();
        if !missing.is_empty() {
            return Err(ActionTableError::Missing(missing));
        }

        let mut actions = Self::defaults().actions;
        for (command, action) in mappings.drain() {
            actions[command.index()] = action;
        }
        Ok(Self { actions })
    }

    /// Returns a copy of `self` with the given entries replaced.
    ///
    /// Commands absent from `overrides` keep their current action, so the
    /// result is always total.
    pub fn with_overrides(&self, overrides: HashMap<CommandType, KeyboardAction>) -> Self {
        let mut table = self.clone();
        for (command, action) in overrides {
            tracing::debug!(%command, %action, "overriding keyboard action");
            table.actions[command.index()] = action;
        }
        table
    }

    /// The action bound to `command`.
    pub fn action(&self, command: CommandType) -> &KeyboardAction {
        &self.actions[command.index()]
    }

    /// Iterates `(command, action)` pairs in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (CommandType, &KeyboardAction)> {
        CommandType::ALL.into_iter().zip(self.actions.iter())
    }
}

impl Default for ActionTable {
    fn default() -> Self {
        Self::defaults()
    }
}

const fn default_key(command: CommandType) -> KeyCode {
    match command {
        CommandType::Next => KeyCode::RightArrow,
        CommandType::Prev => KeyCode::LeftArrow,
        CommandType::StartPresentation => KeyCode::F5,
        CommandType::EndPresentation => KeyCode::Escape,
        CommandType::Blackout => KeyCode::B,
        CommandType::Whiteout => KeyCode::W,
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn keys_of(action: &KeyboardAction) -> Vec<KeyCode> {
        action.sequence().iter().map(|s| s.key).collect()
    }

    #[test]
    fn test_defaults_cover_every_command_with_one_stroke() {
        let table = ActionTable::defaults();
        for command in CommandType::ALL {
            assert_eq!(table.action(command).len(), 1, "{command}");
        }
    }

    #[test]
    fn test_default_bindings() {
        let table = ActionTable::defaults();
        assert_eq!(keys_of(table.action(CommandType::Next)), [KeyCode::RightArrow]);
        assert_eq!(keys_of(table.action(CommandType::Prev)), [KeyCode::LeftArrow]);
        assert_eq!(keys_of(table.action(CommandType::StartPresentation)), [KeyCode::F5]);
        assert_eq!(keys_of(table.action(CommandType::EndPresentation)), [KeyCode::Escape]);
        assert_eq!(keys_of(table.action(CommandType::Blackout)), [KeyCode::B]);
        assert_eq!(keys_of(table.action(CommandType::Whiteout)), [KeyCode::W]);
    }

    #[test]
    fn test_from_mappings_reports_every_missing_command() {
        // Arrange
        let mut mappings = HashMap::new();
        mappings.insert(CommandType::Next, KeyboardAction::single(KeyCode::PageDown));
        mappings.insert(CommandType::Prev, KeyboardAction::single(KeyCode::PageUp));

        // Act
        let err = ActionTable::from_mappings(mappings).unwrap_err();

        // Assert
        assert_eq!(
            err,
            ActionTableError::Missing(vec![
                CommandType::StartPresentation,
                CommandType::EndPresentation,
                CommandType::Blackout,
                CommandType::Whiteout,
            ])
        );
        assert_eq!(
            err.to_string(),
            "no keyboard action configured for: StartPresentation, EndPresentation, Blackout, Whiteout"
        );
    }

    #[test]
    fn test_from_mappings_accepts_complete_map() {
        let mappings: HashMap<_, _> = CommandType::ALL
            .into_iter()
            .map(|c| (c, KeyboardAction::single(KeyCode::Space)))
            .collect();

        let table = ActionTable::from_mappings(mappings).unwrap();

        for (_, action) in table.iter() {
            assert_eq!(keys_of(action), [KeyCode::Space]);
        }
    }

    #[test]
    fn test_with_overrides_replaces_only_named_commands() {
        // Arrange
        let mut overrides = HashMap::new();
        overrides.insert(
            CommandType::Blackout,
            KeyboardAction::from_keys(&[KeyCode::Period]).unwrap(),
        );

        // Act
        let table = ActionTable::defaults().with_overrides(overrides);

        // Assert
        assert_eq!(keys_of(table.action(CommandType::Blackout)), [KeyCode::Period]);
        assert_eq!(keys_of(table.action(CommandType::Whiteout)), [KeyCode::W]);
        assert_eq!(keys_of(table.action(CommandType::Next)), [KeyCode::RightArrow]);
    }

    #[test]
    fn test_iter_yields_declaration_order() {
        let table = ActionTable::defaults();
        let order: Vec<CommandType> = table.iter().map(|(c, _)| c).collect();
        assert_eq!(order, CommandType::ALL);
    }
}
