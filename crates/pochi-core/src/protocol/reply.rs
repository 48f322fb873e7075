//! Outbound text frames.

use std::fmt;

use crate::domain::command::CommandType;

/// A text frame the relay sends to the client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    /// Sent once, right after the upgrade completes.
    Connected,
    /// The command was parsed and its key strokes were delivered.
    Ok(CommandType),
    /// The frame was rejected or the command failed.  The string is the
    /// client-facing reason (`"unknown command"`, `"dispatch failed"`, ...).
    Error(String),
}

impl Reply {
    pub fn error(reason: impl Into<String>) -> Self {
        Reply::Error(reason.into())
    }

    /// Renders the frame text: `connected`, `ok:<CommandName>` or `error:<reason>`.
    pub fn to_text(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Reply {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Reply::Connected => f.write_str("connected"),
            Reply::Ok(command) => write!(f, "ok:{command}"),
            Reply::Error(reason) => write!(f, "error:{reason}"),
        }
    }
}
