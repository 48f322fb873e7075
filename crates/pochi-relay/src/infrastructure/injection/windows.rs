//! Windows keyboard injection via the `SendInput` API.
//!
//! Each stroke is submitted as one `SendInput` call holding a key-down and a
//! key-up `INPUT`, so a stroke is never split by another process's input.
//! Navigation keys carry `KEYEVENTF_EXTENDEDKEY`; without it Windows reports
//! them as their numeric-keypad twins.

#![cfg(target_os = "windows")]

use async_trait::async_trait;
use pochi_core::keymap::windows_vk::{
    VK_DOWN, VK_END, VK_HOME, VK_LEFT, VK_NEXT, VK_PRIOR, VK_RIGHT, VK_UP,
};
use pochi_core::keymap::KeyMapper;
use pochi_core::KeyStroke;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};
use windows::Win32::UI::Input::KeyboardAndMouse::{
    SendInput, INPUT, INPUT_0, INPUT_KEYBOARD, KEYBDINPUT, KEYBD_EVENT_FLAGS,
    KEYEVENTF_EXTENDEDKEY, KEYEVENTF_KEYUP, VIRTUAL_KEY,
};

use crate::application::keyboard_controller::{InjectionError, KeyboardInjector};

const EXTENDED_VKS: &[u16] = &[
    VK_PRIOR, VK_NEXT, VK_END, VK_HOME, VK_LEFT, VK_UP, VK_RIGHT, VK_DOWN,
];

/// [`KeyboardInjector`] backed by `SendInput`.
#[derive(Debug, Default)]
pub struct SendInputInjector;

impl SendInputInjector {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl KeyboardInjector for SendInputInjector {
    async fn inject(
        &self,
        sequence: &[KeyStroke],
        cancel: &CancellationToken,
    ) -> Result<(), InjectionError> {
        let expected = sequence.len() * 2;
        let mut delivered = 0usize;

        for stroke in sequence {
            if cancel.is_cancelled() {
                debug!(delivered, expected, "injection cancelled between strokes");
                return Err(InjectionError::Cancelled);
            }

            let vk = KeyMapper::to_windows_vk(stroke.key);
            let inputs = [keyboard_input(vk, false), keyboard_input(vk, true)];
            // SAFETY: `inputs` is a valid, initialised INPUT array on the stack
            // and the size argument matches the element type.
            let sent = unsafe { SendInput(&inputs, std::mem::size_of::<INPUT>() as i32) } as usize;
            delivered += sent;

            if sent == 0 {
                let err = windows::core::Error::from_win32();
                warn!(key = %stroke.key, error = %err, "SendInput rejected the stroke");
                return Err(InjectionError::Platform(err.to_string()));
            }
            if sent < inputs.len() {
                return Err(InjectionError::Partial {
                    delivered,
                    expected,
                });
            }
        }

        Ok(())
    }

    fn name(&self) -> &'static str {
        "windows"
    }
}

// ── Helpers ───────────────────────────────────────────────────────────────────

fn key_flags(vk: u16, key_up: bool) -> KEYBD_EVENT_FLAGS {
    let mut flags = KEYBD_EVENT_FLAGS::default();
    if key_up {
        flags |= KEYEVENTF_KEYUP;
    }
    if EXTENDED_VKS.contains(&vk) {
        flags |= KEYEVENTF_EXTENDEDKEY;
    }
    flags
}

fn keyboard_input(vk: u16, key_up: bool) -> INPUT {
    INPUT {
        r#type: INPUT_KEYBOARD,
        Anonymous: INPUT_0 {
            ki: KEYBDINPUT {
                wVk: VIRTUAL_KEY(vk),
                wScan: 0,
                dwFlags: key_flags(vk, key_up),
                time: 0,
                dwExtraInfo: 0,
            },
        },
    }
}
