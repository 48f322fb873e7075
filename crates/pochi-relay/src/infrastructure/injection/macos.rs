//! macOS keyboard injection via CoreGraphics.
//!
//! For each stroke:
//!
//! 1. `CGEventSource::new(HIDSystemState)` obtains a source that mimics
//!    hardware state.
//! 2. `CGEvent::new_keyboard_event(source, code, true/false)` builds the
//!    key-down and key-up events.
//! 3. `CGEvent::post(CGEventTapLocation::HID)` injects them at the HID level,
//!    where applications cannot tell them from a physical keyboard.
//!
//! # Accessibility permission
//!
//! Posting at the HID tap requires the Accessibility permission (System
//! Settings → Privacy & Security → Accessibility).  Without it the events are
//! silently dropped; the API gives no error to report.

#![cfg(target_os = "macos")]

use async_trait::async_trait;
use core_graphics::event::{CGEvent, CGEventTapLocation, CGKeyCode};
use core_graphics::event_source::{CGEventSource, CGEventSourceStateID};
use pochi_core::keymap::KeyMapper;
use pochi_core::KeyStroke;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::application::keyboard_controller::{InjectionError, KeyboardInjector};

/// [`KeyboardInjector`] backed by `CGEventPost`.
#[derive(Debug, Default)]
pub struct CoreGraphicsInjector;

impl CoreGraphicsInjector {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl KeyboardInjector for CoreGraphicsInjector {
    async fn inject(
        &self,
        sequence: &[KeyStroke],
        cancel: &CancellationToken,
    ) -> Result<(), InjectionError> {
        for (i, stroke) in sequence.iter().enumerate() {
            if cancel.is_cancelled() {
                debug!(delivered = i, expected = sequence.len(), "injection cancelled between strokes");
                return Err(InjectionError::Cancelled);
            }
            post_stroke(KeyMapper::to_macos_cgkeycode(stroke.key))?;
        }
        Ok(())
    }

    fn name(&self) -> &'static str {
        "macos"
    }
}

// CoreGraphics handles are not `Send`, so they are created and dropped
// inside this synchronous helper and never live across an `.await`.
fn post_stroke(code: CGKeyCode) -> Result<(), InjectionError> {
    let source = CGEventSource::new(CGEventSourceStateID::HIDSystemState)
        .map_err(|()| InjectionError::Platform("failed to create CGEventSource".into()))?;

    let down = CGEvent::new_keyboard_event(source.clone(), code, true)
        .map_err(|()| InjectionError::Platform(format!("failed to create key-down for {code:#04x}")))?;
    let up = CGEvent::new_keyboard_event(source, code, false)
        .map_err(|()| InjectionError::Platform(format!("failed to create key-up for {code:#04x}")))?;

    down.post(CGEventTapLocation::HID);
    up.post(CGEventTapLocation::HID);
    Ok(())
}
