//! Decoding of inbound text frames into [`CommandRequest`]s.
//!
//! The envelope is a JSON object with three optional string fields:
//!
//! ```text
//! { "type": "command", "command": "<CommandName>", "clientId": "<opaque>" }
//! ```
//!
//! Field names are matched ignoring ASCII case and unknown fields are ignored.
//! A field whose value is `null` counts as absent.  Naming the same field twice
//! in different casings (`"type"` and `"TYPE"`) is rejected as invalid JSON.
//!
//! The checks run in a fixed order and the first one that fails decides the
//! error:
//!
//! 1. blank input → [`ParseError::Empty`]
//! 2. not a JSON object, or a known field that is not a string → [`ParseError::InvalidJson`]
//! 3. `type` is not `command` → [`ParseError::UnsupportedType`]
//! 4. `command` does not name a [`CommandType`] → [`ParseError::UnknownCommand`]

use serde_json::{Map, Value};
use thiserror::Error;

use crate::domain::command::{CommandRequest, CommandType};

/// The only envelope `type` the relay accepts.
pub const COMMAND_TYPE: &str = "command";

/// Outcome of parsing one frame.
pub type ParseResult = Result<CommandRequest, ParseError>;

/// Reasons a frame was rejected.  The `Display` text is sent to the client
/// verbatim after `error:`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("empty message")]
    Empty,

    /// The frame is not a well-formed envelope.  The detail is diagnostic only.
    #[error("invalid json: {0}")]
    InvalidJson(String),

    #[error("unsupported type")]
    UnsupportedType,

    #[error("unknown command")]
    UnknownCommand,
}

/// The raw, unvalidated envelope fields.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandEnvelope {
    pub message_type: Option<String>,
    pub command: Option<String>,
    pub client_id: Option<String>,
}

impl CommandEnvelope {
    /// Extracts the known fields from a JSON object.
    ///
    /// # Errors
    ///
    /// [`ParseError::InvalidJson`] when a known field holds something other
    /// than a string or `null`, or appears more than once under different
    /// casings.
    pub fn from_object(object: &Map<String, Value>) -> Result<Self, ParseError> {
        let mut envelope = Self::default();
        let mut seen = [false; 3];
        for (name, value) in object {
            let (index, slot) = if name.eq_ignore_ascii_case("type") {
                (0, &mut envelope.message_type)
            } else if name.eq_ignore_ascii_case("command") {
                (1, &mut envelope.command)
            } else if name.eq_ignore_ascii_case("clientId") {
                (2, &mut envelope.client_id)
            } else {
                continue;
            };
            if std::mem::replace(&mut seen[index], true) {
                return Err(ParseError::InvalidJson(format!(
                    "field `{name}` appears more than once"
                )));
            }
            *slot = string_field(name, value)?;
        }
        Ok(envelope)
    }
}

fn string_field(name: &str, value: &Value) -> Result<Option<String>, ParseError> {
    match value {
        Value::Null => Ok(None),
        Value::String(s) => Ok(Some(s.clone())),
        other => Err(ParseError::InvalidJson(format!(
            "field `{name}` must be a string, found {}",
            kind_of(other)
        ))),
    }
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Parses one inbound text frame.
///
/// Pure and deterministic: the same input always yields the same result.
///
/// # Examples
///
/// ```rust
/// use pochi_core::{parse, CommandType, ParseError};
///
/// let request = parse(r#"{"type":"command","command":"next"}"#).unwrap();
/// assert_eq!(request.command, CommandType::Next);
///
/// assert_eq!(parse("   "), Err(ParseError::Empty));
/// ```
pub fn parse(raw: &str) -> ParseResult {
    if raw.trim().is_empty() {
        return Err(ParseError::Empty);
    }

    let value: Value =
        serde_json::from_str(raw).map_err(|e| ParseError::InvalidJson(e.to_string()))?;
    let object = match &value {
        Value::Object(object) => object,
        other => {
            return Err(ParseError::InvalidJson(format!(
                "expected a JSON object, found {}",
                kind_of(other)
            )))
        }
    };
    let envelope = CommandEnvelope::from_object(object)?;

    let is_command = envelope
        .message_type
        .as_deref()
        .is_some_and(|t| t.eq_ignore_ascii_case(COMMAND_TYPE));
    if !is_command {
        return Err(ParseError::UnsupportedType);
    }

    let command = envelope
        .command
        .as_deref()
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .and_then(CommandType::from_name_ignore_case)
        .ok_or(ParseError::UnknownCommand)?;

    Ok(CommandRequest::new(command, envelope.client_id))
}

// ── Tests ─────────────────────────────────────────────────────────────────────
