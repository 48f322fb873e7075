//! Domain layer for pochi-relay.
//!
//! Plain configuration types and the pure functions that validate them.  The
//! command model itself lives in `pochi-core`; this layer only adds what is
//! specific to running the relay as a network service.
//!
//! Nothing here opens sockets, reads files, or touches the environment.
//! `main.rs` gathers raw values from the CLI and environment and hands them to
//! [`config::RelayConfig`].

pub mod config;

pub use config::{parse_listen_urls, ConfigError, ListenUrls, RelayConfig};
