//! Domain entities for PowerPochi.
//!
//! This module contains pure business logic with no infrastructure dependencies.
//!
//! # What lives here?
//!
//! - [`command`] – the closed set of remote commands and the validated request
//!   value produced by the parser.
//! - [`keys`] – symbolic key codes, single key strokes, and non-empty key-stroke
//!   sequences ([`keys::KeyboardAction`]).
//! - [`action_table`] – the total mapping from every command to the action that
//!   realises it.
//!
//! Code in outer layers (the relay's application and infrastructure layers)
//! depends on the domain, but the domain never depends on them.

pub mod action_table;
pub mod command;
pub mod keys;
