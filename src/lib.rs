//! Screen Navigator
//!
//! Drives a closed game client between its UI screens. The current screen is
//! inferred from OCR over fixed regions of a captured frame, a route is planned
//! over a graph of known screens, and each hop is fired as synthesized
//! keyboard/mouse input and verified with a fresh capture.

#[cfg(windows)]
pub mod capture;
pub mod config;
pub mod input;
pub mod navigator;
pub mod ocr;
pub mod paths;
pub mod perception;

#[cfg(test)]
mod testing;

use chrono::Local;
use std::fs::OpenOptions;
use std::io::Write;

/// Logs a message to both console and log file with timestamp.
pub fn log(msg: &str) {
    let timestamp = Local::now().format("%H:%M:%S%.3f");
    let line = format!("[{}] {}\n", timestamp, msg);
    print!("{}", line);
    let log_path = paths::get_logs_dir().join("screen_navigator.log");
    if let Ok(mut file) = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)
    {
        let _ = file.write_all(line.as_bytes());
    }
}
