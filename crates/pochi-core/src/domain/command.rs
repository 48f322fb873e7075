//! Remote commands: the closed set of things a client can ask the relay to do.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A logical user intent sent by the remote client.
///
/// The set is fixed at compile time; there is no runtime extension.  The
/// variant names double as the wire names (`"Next"`, `"StartPresentation"`)
/// and as the `<CommandName>` in `ok:<CommandName>` replies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum CommandType {
    /// Advance to the next slide.
    Next,
    /// Go back to the previous slide.
    Prev,
    /// Start the slide show.
    StartPresentation,
    /// End the slide show.
    EndPresentation,
    /// Toggle a black screen.
    Blackout,
    /// Toggle a white screen.
    Whiteout,
}

impl CommandType {
    /// Number of command variants.
    pub const COUNT: usize = 6;

    /// Every command, in declaration order.
    ///
    /// `ALL[c.index()] == c` holds for every command `c`.
    pub const ALL: [CommandType; Self::COUNT] = [
        CommandType::Next,
        CommandType::Prev,
        CommandType::StartPresentation,
        CommandType::EndPresentation,
        CommandType::Blackout,
        CommandType::Whiteout,
    ];

    /// Dense index in `0..COUNT`, used for array-backed tables and counters.
    pub const fn index(self) -> usize {
        match self {
            CommandType::Next => 0,
            CommandType::Prev => 1,
            CommandType::StartPresentation => 2,
            CommandType::EndPresentation => 3,
            CommandType::Blackout => 4,
            CommandType::Whiteout => 5,
        }
    }

    /// The canonical wire name of this command.
    pub const fn name(self) -> &'static str {
        match self {
            CommandType::Next => "Next",
            CommandType::Prev => "Prev",
            CommandType::StartPresentation => "StartPresentation",
            CommandType::EndPresentation => "EndPresentation",
            CommandType::Blackout => "Blackout",
            CommandType::Whiteout => "Whiteout",
        }
    }

    /// Resolves a command name, ignoring ASCII case.
    ///
    /// Returns `None` for anything that is not exactly one of the six names
    /// (surrounding whitespace is not stripped here; the parser does that).
    pub fn from_name_ignore_case(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|command| command.name().eq_ignore_ascii_case(name))
    }
}

impl fmt::Display for CommandType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A validated command request.
///
/// Only [`crate::protocol::parser::parse`] constructs these from wire input;
/// tests and the dispatcher may build them directly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandRequest {
    /// The resolved command.
    pub command: CommandType,
    /// Opaque client identifier copied from the envelope, if any.
    pub client_id: Option<String>,
}

impl CommandRequest {
    /// Creates a request for `command` from the given client.
    pub fn new(command: CommandType, client_id: Option<String>) -> Self {
        Self { command, client_id }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
