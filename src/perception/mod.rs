//! Perception: turns a captured frame into "which known screen is this".
//!
//! This module provides:
//! - Frame and provider traits for capture and text recognition
//! - Fractional/directional regions of interest
//! - Ordered per-screen detection rules and the detection pass over them

pub mod adapter;
pub mod region;
pub mod rules;

pub use adapter::{Frame, FrameSource, Perception, TextRecognizer};
pub use region::{PixelRect, Region};
pub use rules::{DetectionRule, DetectionRules};

use thiserror::Error;

/// The client could not be seen: no frame, or no text from it.
#[derive(Debug, Error)]
pub enum PerceptionError {
    #[error("game window '{0}' not found")]
    WindowNotFound(String),

    #[error("frame capture failed: {0}")]
    Capture(String),

    #[error("text recognition failed: {0}")]
    Recognition(String),
}
