//! Symbolic key → native key code tables.
//!
//! The platform injectors never see a [`KeyCode`] directly; they ask
//! [`KeyMapper`] for the code their OS API expects.  Every table is an
//! exhaustive `match`, so adding a [`KeyCode`] variant without a native code
//! is a compile error rather than a runtime miss.

pub mod macos_cg;
pub mod windows_vk;

use crate::domain::keys::KeyCode;

/// Unified key mapper for every supported platform.
pub struct KeyMapper;

impl KeyMapper {
    /// Translates a [`KeyCode`] to a Windows Virtual Key code (`VK_*`).
    pub fn to_windows_vk(key: KeyCode) -> u16 {
        windows_vk::key_to_vk(key)
    }

    /// Translates a [`KeyCode`] to a macOS `CGKeyCode` (`kVK_*`).
    pub fn to_macos_cgkeycode(key: KeyCode) -> u16 {
        macos_cg::key_to_cgkeycode(key)
    }
}
