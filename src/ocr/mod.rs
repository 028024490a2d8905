//! Tesseract-backed text recognition.
//!
//! This module provides:
//! - Locating the Tesseract executable (`setup`)
//! - Image preparation before recognition (`preprocess`)
//! - Running Tesseract and parsing its TSV output into word boxes (`engine`)

pub mod engine;
pub mod preprocess;
pub mod setup;

pub use engine::{BoundingBox, OcrWord, TesseractRecognizer};
pub use setup::{find_tesseract, TesseractPaths};
