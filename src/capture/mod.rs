//! Windows providers for the game client.
//!
//! This module provides:
//! - Window lookup by title and focus handling (`GameWindow`)
//! - Client-area frame capture (`WindowCapture`)

pub mod screenshot;
pub mod window;

pub use screenshot::WindowCapture;
pub use window::{find_window_by_title, GameWindow};
