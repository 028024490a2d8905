//! Keyboard/mouse input and window focus.
//!
//! This module provides:
//! - The key set used by screen transitions, as DirectInput scan codes
//! - Provider traits for input injection and window focus
//! - A SendInput-based driver on Windows

#[cfg(windows)]
pub mod sendinput;

#[cfg(windows)]
pub use sendinput::SendInputDriver;

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// How long a key is held for a single tap.
pub const TAP_HOLD: Duration = Duration::from_millis(50);

/// Keys the game's menus respond to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Key {
    Escape,
    Space,
    Enter,
    Tab,
    Left,
    Right,
    Up,
    Down,
    W,
    A,
    S,
    D,
    E,
    F,
    Q,
}

impl Key {
    /// DirectInput scan code and whether it needs the extended-key flag.
    pub fn scan_code(self) -> (u16, bool) {
        match self {
            Key::Escape => (0x01, false),
            Key::Space => (0x39, false),
            Key::Enter => (0x1C, false),
            Key::Tab => (0x0F, false),
            Key::Left => (0x4B, true),
            Key::Right => (0x4D, true),
            Key::Up => (0x48, true),
            Key::Down => (0x50, true),
            Key::W => (0x11, false),
            Key::A => (0x1E, false),
            Key::S => (0x1F, false),
            Key::D => (0x20, false),
            Key::E => (0x12, false),
            Key::F => (0x21, false),
            Key::Q => (0x10, false),
        }
    }
}

impl std::fmt::Display for Key {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}", self)
    }
}

/// Injects input into the game.
///
/// Coordinates are in screen space.
pub trait InputDriver {
    fn move_and_click(&mut self, x: i32, y: i32) -> Result<()>;

    fn press_key(&mut self, key: Key, hold: Duration) -> Result<()>;

    fn press_key_n_times(&mut self, key: Key, presses: u32, delay: Duration) -> Result<()> {
        for i in 0..presses {
            self.press_key(key, TAP_HOLD)?;
            if i + 1 < presses {
                self.pause(delay);
            }
        }
        Ok(())
    }

    /// Blocks while the UI settles.
    fn pause(&mut self, duration: Duration) {
        std::thread::sleep(duration);
    }
}

/// Keeps the game window in front so injected input reaches it.
pub trait WindowFocus {
    fn is_active(&self) -> bool;

    fn bring_to_foreground(&mut self) -> Result<()>;
}

/// Pulls the window to the foreground unless it already is.
pub fn ensure_focus(focus: &mut dyn WindowFocus) -> Result<()> {
    if focus.is_active() {
        return Ok(());
    }
    crate::log("Setting foreground");
    focus.bring_to_foreground()
}
