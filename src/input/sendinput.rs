//! Hardware-level input simulation via SendInput.
//!
//! The game reads input through DirectInput/RawInput, so window messages
//! (PostMessage) are ignored; SendInput moves the real cursor and emits
//! scan codes the game accepts. The window must be in the foreground.

use anyhow::{anyhow, Result};
use std::time::Duration;

use windows::Win32::UI::Input::KeyboardAndMouse::{
    SendInput, INPUT, INPUT_0, INPUT_KEYBOARD, INPUT_MOUSE, KEYBDINPUT, KEYBD_EVENT_FLAGS,
    KEYEVENTF_EXTENDEDKEY, KEYEVENTF_KEYUP, KEYEVENTF_SCANCODE, MOUSEEVENTF_ABSOLUTE,
    MOUSEEVENTF_LEFTDOWN, MOUSEEVENTF_LEFTUP, MOUSEEVENTF_MOVE, MOUSEINPUT, MOUSE_EVENT_FLAGS,
    VIRTUAL_KEY,
};
use windows::Win32::UI::WindowsAndMessaging::{GetSystemMetrics, SM_CXSCREEN, SM_CYSCREEN};

use super::{InputDriver, Key};

/// Delay between cursor move and button press, and between press and release.
const CLICK_STEP: Duration = Duration::from_millis(50);

/// Sends mouse and keyboard input through the Win32 SendInput API.
#[derive(Debug, Default)]
pub struct SendInputDriver;

impl SendInputDriver {
    pub fn new() -> Self {
        Self
    }
}

impl InputDriver for SendInputDriver {
    fn move_and_click(&mut self, x: i32, y: i32) -> Result<()> {
        let (norm_x, norm_y) = normalize(x, y)?;
        crate::log(&format!("Clicking at screen ({}, {})", x, y));

        send(mouse_input(norm_x, norm_y, MOUSEEVENTF_MOVE | MOUSEEVENTF_ABSOLUTE))?;
        std::thread::sleep(CLICK_STEP * 2);
        send(mouse_input(
            norm_x,
            norm_y,
            MOUSEEVENTF_LEFTDOWN | MOUSEEVENTF_ABSOLUTE | MOUSEEVENTF_MOVE,
        ))?;
        std::thread::sleep(CLICK_STEP);
        send(mouse_input(
            norm_x,
            norm_y,
            MOUSEEVENTF_LEFTUP | MOUSEEVENTF_ABSOLUTE | MOUSEEVENTF_MOVE,
        ))
    }

    fn press_key(&mut self, key: Key, hold: Duration) -> Result<()> {
        send(key_input(key, false))?;
        std::thread::sleep(hold);
        send(key_input(key, true))
    }
}

/// Converts screen pixels to the 0-65535 range MOUSEEVENTF_ABSOLUTE expects.
fn normalize(x: i32, y: i32) -> Result<(i32, i32)> {
    let screen_width = unsafe { GetSystemMetrics(SM_CXSCREEN) };
    let screen_height = unsafe { GetSystemMetrics(SM_CYSCREEN) };
    if screen_width <= 0 || screen_height <= 0 {
        return Err(anyhow!("Could not read screen dimensions"));
    }
    if x < 0 || y < 0 || x > screen_width || y > screen_height {
        return Err(anyhow!(
            "Coordinates ({}, {}) are outside the screen bounds {}x{}",
            x,
            y,
            screen_width,
            screen_height
        ));
    }

    let norm_x = ((x as i64 * 65535) / screen_width as i64) as i32;
    let norm_y = ((y as i64 * 65535) / screen_height as i64) as i32;
    Ok((norm_x, norm_y))
}

fn mouse_input(dx: i32, dy: i32, flags: MOUSE_EVENT_FLAGS) -> INPUT {
    INPUT {
        r#type: INPUT_MOUSE,
        Anonymous: INPUT_0 {
            mi: MOUSEINPUT {
                dx,
                dy,
                dwFlags: flags,
                ..Default::default()
            },
        },
    }
}

fn key_input(key: Key, release: bool) -> INPUT {
    let (scan, extended) = key.scan_code();
    let mut flags: KEYBD_EVENT_FLAGS = KEYEVENTF_SCANCODE;
    if extended {
        flags |= KEYEVENTF_EXTENDEDKEY;
    }
    if release {
        flags |= KEYEVENTF_KEYUP;
    }

    INPUT {
        r#type: INPUT_KEYBOARD,
        Anonymous: INPUT_0 {
            ki: KEYBDINPUT {
                wVk: VIRTUAL_KEY(0),
                wScan: scan,
                dwFlags: flags,
                ..Default::default()
            },
        },
    }
}

fn send(input: INPUT) -> Result<()> {
    let sent = unsafe { SendInput(&[input], std::mem::size_of::<INPUT>() as i32) };
    if sent != 1 {
        return Err(anyhow!("SendInput rejected the event (blocked by UIPI?)"));
    }
    Ok(())
}
