//! # pochi-core
//!
//! Shared library for the PowerPochi presentation remote.  It holds the command
//! model, the command → key-stroke action table, the wire-format parser, and
//! the tables that translate symbolic keys into native platform key codes.
//!
//! This crate has zero dependencies on OS APIs, async runtimes, or sockets, so
//! everything in it can be unit-tested on any machine.
//!
//! # Architecture overview (for beginners)
//!
//! A phone opens a WebSocket to the relay and sends small JSON messages such as
//! `{"type":"command","command":"Next"}`.  The relay turns each message into a
//! simulated key press (Right Arrow for "Next") so that whatever presentation
//! program has focus advances a slide.
//!
//! - **`domain`** – The closed set of commands ([`CommandType`]), the symbolic
//!   keys ([`KeyCode`]), and the [`ActionTable`] that maps one to the other.
//!   The table is checked for completeness when it is built and never changes
//!   afterwards.
//!
//! - **`protocol`** – How text frames are decoded into validated
//!   [`CommandRequest`]s, and how replies (`connected`, `ok:Next`,
//!   `error:unknown command`) are rendered.
//!
//! - **`keymap`** – Translation from [`KeyCode`] to Windows Virtual Key codes
//!   and macOS `CGKeyCode`s, used by the platform injectors.

pub mod domain;
pub mod keymap;
pub mod protocol;

// Re-export the most-used types at the crate root so callers can write
// `pochi_core::CommandType` instead of `pochi_core::domain::command::CommandType`.
pub use domain::action_table::{ActionTable, ActionTableError};
pub use domain::command::{CommandRequest, CommandType};
pub use domain::keys::{KeyCode, KeyStroke, KeyboardAction, KeyboardActionError};
pub use protocol::parser::{parse, ParseError, ParseResult};
pub use protocol::reply::Reply;
