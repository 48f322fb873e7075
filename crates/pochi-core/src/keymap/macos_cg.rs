//! [`KeyCode`] → macOS `CGKeyCode`.
//!
//! macOS key codes identify physical ANSI key positions, not characters, so
//! letters do not follow ASCII order (`kVK_ANSI_B` is 0x0B).
//!
//! Reference: HIToolbox.framework/Headers/Events.h

use crate::domain::keys::KeyCode;

/// Translates a [`KeyCode`] to its `CGKeyCode`.
pub fn key_to_cgkeycode(key: KeyCode) -> u16 {
    match key {
        KeyCode::RightArrow => 0x7C, // kVK_RightArrow
        KeyCode::LeftArrow => 0x7B,  // kVK_LeftArrow
        KeyCode::UpArrow => 0x7E,    // kVK_UpArrow
        KeyCode::DownArrow => 0x7D,  // kVK_DownArrow
        KeyCode::PageUp => 0x74,     // kVK_PageUp
        KeyCode::PageDown => 0x79,   // kVK_PageDown
        KeyCode::Home => 0x73,       // kVK_Home
        KeyCode::End => 0x77,        // kVK_End
        KeyCode::Enter => 0x24,      // kVK_Return
        KeyCode::Space => 0x31,      // kVK_Space
        KeyCode::F5 => 0x60,         // kVK_F5
        KeyCode::Escape => 0x35,     // kVK_Escape
        KeyCode::B => 0x0B,          // kVK_ANSI_B
        KeyCode::W => 0x0D,          // kVK_ANSI_W
        KeyCode::Period => 0x2F,     // kVK_ANSI_Period
        KeyCode::Comma => 0x2B,      // kVK_ANSI_Comma
    }
}
