//! pochi-relay library crate.
//!
//! A phone on the same network opens a WebSocket to the relay and sends
//! presentation commands; the relay presses the bound keys on this machine.
//!
//! # Architecture (clean architecture)
//!
//! ```text
//! Phone (JSON text frames over WebSocket)
//!         ↕
//! [pochi-relay]
//!   ├── domain/             RelayConfig, listen URL parsing
//!   ├── application/        Dispatcher, KeyboardController, CommandMetrics
//!   └── infrastructure/
//!         ├── http_server/  axum listener, health and info routes, static web root
//!         ├── gateway/      token check, upgrade, per-session loop
//!         ├── injection/    SendInput / CGEventPost / no-op / recording
//!         └── storage/      keyboard mapping file
//! ```
//!
//! # Layer rules
//!
//! - `domain` performs no I/O.
//! - `application` depends on `domain` and `pochi-core`; platform access goes
//!   through the [`application::KeyboardInjector`] trait.
//! - `infrastructure` depends on all other layers plus `axum` and `tokio`.

/// Domain layer: configuration types (no I/O).
pub mod domain;

/// Application layer: dispatch, key injection serialization, counters.
pub mod application;

/// Infrastructure layer: HTTP/WebSocket host, OS injectors, mapping file.
pub mod infrastructure;
