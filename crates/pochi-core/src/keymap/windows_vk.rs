//! [`KeyCode`] → Windows Virtual Key code.
//!
//! Virtual Key codes are *logical* keys defined in `<winuser.h>`: `VK_B` is
//! 0x42 whatever the physical layout.  `SendInput` takes them as `u16`
//! (`VIRTUAL_KEY`).
//!
//! Reference: https://learn.microsoft.com/windows/win32/inputdev/virtual-key-codes

use crate::domain::keys::KeyCode;

pub const VK_RETURN: u16 = 0x0D;
pub const VK_ESCAPE: u16 = 0x1B;
pub const VK_SPACE: u16 = 0x20;
pub const VK_PRIOR: u16 = 0x21;
pub const VK_NEXT: u16 = 0x22;
pub const VK_END: u16 = 0x23;
pub const VK_HOME: u16 = 0x24;
pub const VK_LEFT: u16 = 0x25;
pub const VK_UP: u16 = 0x26;
pub const VK_RIGHT: u16 = 0x27;
pub const VK_DOWN: u16 = 0x28;
pub const VK_B: u16 = 0x42;
pub const VK_W: u16 = 0x57;
pub const VK_F5: u16 = 0x74;
pub const VK_OEM_COMMA: u16 = 0xBC;
pub const VK_OEM_PERIOD: u16 = 0xBE;

/// Translates a [`KeyCode`] to its Virtual Key code.
pub fn key_to_vk(key: KeyCode) -> u16 {
    match key {
        KeyCode::RightArrow => VK_RIGHT,
        KeyCode::LeftArrow => VK_LEFT,
        KeyCode::UpArrow => VK_UP,
        KeyCode::DownArrow => VK_DOWN,
        KeyCode::PageUp => VK_PRIOR,
        KeyCode::PageDown => VK_NEXT,
        KeyCode::Home => VK_HOME,
        KeyCode::End => VK_END,
        KeyCode::Enter => VK_RETURN,
        KeyCode::Space => VK_SPACE,
        KeyCode::F5 => VK_F5,
        KeyCode::Escape => VK_ESCAPE,
        KeyCode::B => VK_B,
        KeyCode::W => VK_W,
        KeyCode::Period => VK_OEM_PERIOD,
        KeyCode::Comma => VK_OEM_COMMA,
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
