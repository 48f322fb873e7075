//! Application layer use cases for the relay.
//!
//! Use cases here depend on traits ([`keyboard_controller::KeyboardInjector`],
//! [`keyboard_controller::ActionResolver`]) rather than on OS APIs or sockets,
//! so they can be driven entirely from tests.
//!
//! # Sub-modules
//!
//! - **`keyboard_controller`** – Resolves a command to its key-stroke
//!   sequence and hands it to the platform injector, one sequence at a time.
//!
//! - **`dispatcher`** – Runs a parsed request through the resolver and folds
//!   every outcome into success, a client-safe failure, or cancellation.
//!
//! - **`metrics`** – Lock-free success/failure/parse-failure counters and the
//!   snapshot served on `/metrics`.

pub mod dispatcher;
pub mod keyboard_controller;
pub mod metrics;

pub use dispatcher::{Cancelled, CommandDispatcher, DispatchResult, DISPATCH_FAILED};
pub use keyboard_controller::{ActionResolver, InjectionError, KeyboardController, KeyboardInjector};
pub use metrics::{CommandMetrics, MetricsSnapshot};
