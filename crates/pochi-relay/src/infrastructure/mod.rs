//! Infrastructure layer for pochi-relay.
//!
//! Everything that touches the outside world lives here.
//!
//! # Responsibilities
//!
//! - Binding the single HTTP listener and serving the phone web page
//! - Authorizing clients and upgrading them to WebSocket sessions
//! - Pressing keys through the platform's input API
//! - Reading the optional keyboard mapping file
//!
//! # What does NOT belong here?
//!
//! - Frame parsing and the command model (`pochi-core`)
//! - Dispatch and serialization of key injection (the application layer)
//! - Command-line parsing (done in `main.rs`)

pub mod gateway;
pub mod http_server;
pub mod injection;
pub mod storage;

pub use http_server::{run_server, RelayServer, ServerInfo};
