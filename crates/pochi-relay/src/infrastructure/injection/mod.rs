//! Platform keyboard injectors.
//!
//! The implementation is selected at compile time via `#[cfg(target_os = ...)]`
//! and built once at startup by [`create_injector`].  [`mock::RecordingInjector`]
//! is always available for tests.

use std::sync::Arc;

use crate::application::keyboard_controller::KeyboardInjector;

pub mod mock;
pub mod noop;

#[cfg(target_os = "windows")]
pub mod windows;

#[cfg(target_os = "macos")]
pub mod macos;

/// Builds the injector for the current platform.
#[cfg(target_os = "windows")]
pub fn create_injector() -> Arc<dyn KeyboardInjector> {
    Arc::new(windows::SendInputInjector::new())
}

/// Builds the injector for the current platform.
#[cfg(target_os = "macos")]
pub fn create_injector() -> Arc<dyn KeyboardInjector> {
    Arc::new(macos::CoreGraphicsInjector::new())
}

/// Builds the injector for the current platform.
#[cfg(not(any(target_os = "windows", target_os = "macos")))]
pub fn create_injector() -> Arc<dyn KeyboardInjector> {
    Arc::new(noop::NoopInjector::new())
}
