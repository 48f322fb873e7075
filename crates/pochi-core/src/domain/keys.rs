//! Symbolic keys and key-stroke sequences.
//!
//! A [`KeyStroke`] is one press-and-release of a single key.  A
//! [`KeyboardAction`] is an ordered, non-empty list of strokes; the order is
//! the delivery order.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Symbolic keys the relay knows how to inject.
///
/// These cover what presentation programs listen for: navigation keys, the
/// show start/stop keys, and the blackout/whiteout letter toggles.  The
/// platform tables in [`crate::keymap`] translate each of them to a native code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum KeyCode {
    RightArrow,
    LeftArrow,
    UpArrow,
    DownArrow,
    PageUp,
    PageDown,
    Home,
    End,
    Enter,
    Space,
    F5,
    Escape,
    B,
    W,
    Period,
    Comma,
}

impl KeyCode {
    /// Every key, in declaration order.
    pub const ALL: [KeyCode; 16] = [
        KeyCode::RightArrow,
        KeyCode::LeftArrow,
        KeyCode::UpArrow,
        KeyCode::DownArrow,
        KeyCode::PageUp,
        KeyCode::PageDown,
        KeyCode::Home,
        KeyCode::End,
        KeyCode::Enter,
        KeyCode::Space,
        KeyCode::F5,
        KeyCode::Escape,
        KeyCode::B,
        KeyCode::W,
        KeyCode::Period,
        KeyCode::Comma,
    ];
}

impl fmt::Display for KeyCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// One press-and-release of a single key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct KeyStroke {
    /// The key to press and release.
    pub key: KeyCode,
}

impl KeyStroke {
    /// Creates a stroke for `key`.
    pub const fn with_key(key: KeyCode) -> Self {
        Self { key }
    }
}

impl fmt::Display for KeyStroke {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.key)
    }
}

/// Errors raised while building a [`KeyboardAction`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum KeyboardActionError {
    /// An action must contain at least one stroke.
    #[error("keyboard action must contain at least one key stroke")]
    Empty,
}

/// A non-empty, ordered sequence of key strokes.
///
/// The constructor rejects empty sequences, so every `KeyboardAction` in the
/// program has at least one stroke.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyboardAction {
    sequence: Vec<KeyStroke>,
}

impl KeyboardAction {
    /// Builds an action from an ordered list of strokes.
    ///
    /// # Errors
    ///
    /// Returns [`KeyboardActionError::Empty`] if `sequence` is empty.
    pub fn new(sequence: Vec<KeyStroke>) -> Result<Self, KeyboardActionError> {
        if sequence.is_empty() {
            return Err(KeyboardActionError::Empty);
        }
        Ok(Self { sequence })
    }

    /// Builds an action that presses and releases exactly one key.
    pub fn single(key: KeyCode) -> Self {
        Self {
            sequence: vec![KeyStroke::with_key(key)],
        }
    }

    /// Builds an action from symbolic keys, in order.
    ///
    /// # Errors
    ///
    /// Returns [`KeyboardActionError::Empty`] if `keys` is empty.
    pub fn from_keys(keys: &[KeyCode]) -> Result<Self, KeyboardActionError> {
        Self::new(keys.iter().copied().map(KeyStroke::with_key).collect())
    }

    /// The strokes in delivery order.  Never empty.
    pub fn sequence(&self) -> &[KeyStroke] {
        &self.sequence
    }

    /// Number of strokes in the action.
    pub fn len(&self) -> usize {
        self.sequence.len()
    }

    /// Always `false`; present for API symmetry with `len`.
    pub fn is_empty(&self) -> bool {
        self.sequence.is_empty()
    }
}

impl fmt::Display for KeyboardAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, stroke) in self.sequence.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{stroke}")?;
        }
        Ok(())
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
