//! Configuration types for the navigator.
//!
//! Loads settings from config.json at startup. Provides the window title,
//! retry behaviour, OCR tuning and diagnostic switches.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::input::Key;
use crate::navigator::{Action, VerifyPolicy};

/// OCR tuning passed to the Tesseract recognizer.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OcrConfig {
    /// Upscale factor applied to each region before recognition
    pub scale_factor: u32,
    /// Grayscale level separating text from background (0-255)
    pub binary_threshold: u8,
    /// Invert after thresholding (light UI text on dark backgrounds)
    pub invert: bool,
    /// Tesseract language code
    pub language: String,
    /// Explicit path to the Tesseract executable
    pub tesseract_path: Option<PathBuf>,
}

impl Default for OcrConfig {
    fn default() -> Self {
        Self {
            scale_factor: 2,
            binary_threshold: 150,
            invert: true,
            language: "eng".to_string(),
            tesseract_path: None,
        }
    }
}

/// Complete navigator configuration.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NavigatorConfig {
    /// Exact title of the game window
    pub window_title: String,
    /// Player name shown in the in-game HUD, used to recognize "In Game"
    pub bot_name: String,
    /// Attempts at detecting the starting screen (>= 1)
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    /// Input fired between failed initial detection attempts
    #[serde(default = "default_retry_action")]
    pub retry_action: Action,
    /// How post-hop detections are judged while walking a path
    #[serde(default)]
    pub verify_policy: VerifyPolicy,
    /// Wait after pulling the window to the foreground (milliseconds)
    #[serde(default = "default_focus_settle_ms")]
    pub focus_settle_ms: u64,
    /// Save the last frame when a transition fails
    #[serde(default = "default_true")]
    pub debug_snapshots: bool,
    /// Save every captured frame (very verbose)
    #[serde(default)]
    pub save_every_frame: bool,
    /// Screen catalog JSON; the built-in catalog is used when absent
    #[serde(default)]
    pub catalog_path: Option<PathBuf>,
    /// OCR tuning
    #[serde(default)]
    pub ocr: OcrConfig,
}

fn default_max_retries() -> u32 {
    2
}

fn default_retry_action() -> Action {
    Action::PressKey {
        key: Key::Escape,
        hold_ms: 1000,
    }
}

fn default_focus_settle_ms() -> u64 {
    2000
}

fn default_true() -> bool {
    true
}

impl Default for NavigatorConfig {
    fn default() -> Self {
        Self {
            window_title: "Battlefield™ V".to_string(),
            bot_name: "InvisibleHand".to_string(),
            max_retries: default_max_retries(),
            retry_action: default_retry_action(),
            verify_policy: VerifyPolicy::default(),
            focus_settle_ms: default_focus_settle_ms(),
            debug_snapshots: true,
            save_every_frame: false,
            catalog_path: None,
            ocr: OcrConfig::default(),
        }
    }
}

/// Loads configuration from `path` (or config.json next to the executable)
/// and falls back to defaults when it is missing or invalid.
pub fn load_config(path: Option<&Path>) -> NavigatorConfig {
    let config_path = path
        .map(Path::to_path_buf)
        .unwrap_or_else(crate::paths::get_config_path);

    crate::log(&format!("Looking for config at: {}", config_path.display()));

    if config_path.exists() {
        match fs::read_to_string(&config_path) {
            Ok(contents) => match serde_json::from_str(&contents) {
                Ok(config) => {
                    crate::log("Config loaded");
                    return config;
                }
                Err(e) => {
                    crate::log(&format!(
                        "Failed to parse {}: {}. Using defaults.",
                        config_path.display(),
                        e
                    ));
                }
            },
            Err(e) => {
                crate::log(&format!(
                    "Failed to read {}: {}. Using defaults.",
                    config_path.display(),
                    e
                ));
            }
        }
    } else {
        crate::log("Config file not found. Using default config.");
    }

    NavigatorConfig::default()
}
