//! Window discovery and focus for the game client.

use anyhow::{anyhow, Result};
use std::ffi::OsString;
use std::os::windows::ffi::OsStringExt;
use std::time::Duration;

use windows::Win32::Foundation::{BOOL, HWND, LPARAM, POINT, RECT, TRUE};
use windows::Win32::Graphics::Gdi::ClientToScreen;
use windows::Win32::UI::WindowsAndMessaging::{
    EnumWindows, GetClientRect, GetForegroundWindow, GetWindowRect, GetWindowTextLengthW,
    GetWindowTextW, IsIconic, IsWindow, IsWindowVisible, SetForegroundWindow, ShowWindow,
    SW_RESTORE,
};

use crate::input::WindowFocus;

/// Finds the first visible top-level window whose title is exactly `title`.
pub fn find_window_by_title(title: &str) -> Result<HWND> {
    struct EnumData<'a> {
        title: &'a str,
        hwnd: Option<HWND>,
    }

    unsafe extern "system" fn enum_callback(hwnd: HWND, lparam: LPARAM) -> BOOL {
        unsafe {
            let data = &mut *(lparam.0 as *mut EnumData);

            if !IsWindowVisible(hwnd).as_bool() {
                return TRUE;
            }

            let title_len = GetWindowTextLengthW(hwnd);
            if title_len <= 0 {
                return TRUE;
            }
            let mut title_buf: Vec<u16> = vec![0; (title_len + 1) as usize];
            GetWindowTextW(hwnd, &mut title_buf);
            let title = OsString::from_wide(&title_buf[..title_len as usize])
                .to_string_lossy()
                .to_string();

            if title == data.title {
                data.hwnd = Some(hwnd);
                return BOOL(0); // Stop enumeration
            }

            TRUE
        }
    }

    let mut data = EnumData { title, hwnd: None };
    unsafe {
        // EnumWindows returns FALSE when the callback stops it early, which is
        // how a match is reported
        let _ = EnumWindows(Some(enum_callback), LPARAM(&mut data as *mut _ as isize));
    }

    data.hwnd
        .ok_or_else(|| anyhow!("Could not find window '{}'. Is the game running?", title))
}

/// Client area size, its offset inside the full window, and its top-left
/// corner in screen coordinates.
pub struct ClientArea {
    pub width: u32,
    pub height: u32,
    pub offset: POINT,
    pub screen_origin: POINT,
}

pub fn get_client_area(hwnd: HWND) -> Result<ClientArea> {
    let mut client_rect = RECT::default();
    unsafe { GetClientRect(hwnd, &mut client_rect)? };

    let mut screen_origin = POINT { x: 0, y: 0 };
    unsafe {
        if !ClientToScreen(hwnd, &mut screen_origin).as_bool() {
            return Err(anyhow!("ClientToScreen failed"));
        }
    }

    let mut window_rect = RECT::default();
    unsafe { GetWindowRect(hwnd, &mut window_rect)? };

    Ok(ClientArea {
        width: (client_rect.right - client_rect.left).max(0) as u32,
        height: (client_rect.bottom - client_rect.top).max(0) as u32,
        offset: POINT {
            x: screen_origin.x - window_rect.left,
            y: screen_origin.y - window_rect.top,
        },
        screen_origin,
    })
}

/// The game window, looked up by title and re-found if its handle goes stale
/// (e.g. after the client restarts).
#[derive(Clone, Debug)]
pub struct GameWindow {
    title: String,
    settle: Duration,
    hwnd: Option<HWND>,
}

impl GameWindow {
    pub fn new(title: impl Into<String>, settle: Duration) -> Self {
        Self {
            title: title.into(),
            settle,
            hwnd: None,
        }
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    /// A live handle to the window, searching again if needed.
    pub fn handle(&mut self) -> Result<HWND> {
        if let Some(hwnd) = self.hwnd {
            if unsafe { IsWindow(hwnd) }.as_bool() {
                return Ok(hwnd);
            }
            crate::log("Window handle went stale, searching again");
        }
        let hwnd = find_window_by_title(&self.title)?;
        crate::log(&format!("Found window '{}': {:?}", self.title, hwnd));
        self.hwnd = Some(hwnd);
        Ok(hwnd)
    }
}

impl WindowFocus for GameWindow {
    fn is_active(&self) -> bool {
        match self.hwnd {
            Some(hwnd) => unsafe { GetForegroundWindow() } == hwnd,
            None => false,
        }
    }

    fn bring_to_foreground(&mut self) -> Result<()> {
        let hwnd = self.handle()?;
        unsafe {
            if IsIconic(hwnd).as_bool() {
                let _ = ShowWindow(hwnd, SW_RESTORE);
            }
            if !SetForegroundWindow(hwnd).as_bool() {
                return Err(anyhow!("SetForegroundWindow refused for '{}'", self.title));
            }
        }
        // Let the client finish its focus animation before input arrives
        std::thread::sleep(self.settle);
        Ok(())
    }
}
