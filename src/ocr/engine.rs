use anyhow::{anyhow, Result};
use image::{GrayImage, RgbaImage};
use std::process::Command;
use tempfile::NamedTempFile;

use super::preprocess::prepare_for_ocr;
use super::setup::TesseractPaths;
use crate::config::OcrConfig;
use crate::perception::{PerceptionError, TextRecognizer};

/// Pixel bounding box of a recognized word.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct BoundingBox {
    pub left: u32,
    pub top: u32,
    pub width: u32,
    pub height: u32,
}

impl BoundingBox {
    pub fn center(&self) -> (i32, i32) {
        (
            (self.left + self.width / 2) as i32,
            (self.top + self.height / 2) as i32,
        )
    }

    fn scaled_down(&self, factor: u32) -> Self {
        let factor = factor.max(1);
        Self {
            left: self.left / factor,
            top: self.top / factor,
            width: self.width / factor,
            height: self.height / factor,
        }
    }
}

/// Represents a single word from OCR with confidence score and position
#[derive(Debug, Clone, PartialEq)]
pub struct OcrWord {
    pub text: String,
    pub confidence: f32,
    pub bbox: BoundingBox,
}

/// Text recognizer that shells out to the Tesseract CLI.
pub struct TesseractRecognizer {
    paths: TesseractPaths,
    config: OcrConfig,
}

impl TesseractRecognizer {
    pub fn new(paths: TesseractPaths, config: OcrConfig) -> Self {
        Self { paths, config }
    }

    /// Runs Tesseract on a preprocessed grayscale image.
    /// Boxes are returned in the coordinates of `img`.
    pub fn run(&self, img: &GrayImage) -> Result<Vec<OcrWord>> {
        // Save image to temporary file
        let temp_input = NamedTempFile::with_suffix(".png")?;
        img.save(temp_input.path())?;

        // Create temporary output file (Tesseract adds .tsv extension)
        let temp_output = NamedTempFile::new()?;
        let output_base = temp_output.path().to_string_lossy().to_string();

        let mut command = Command::new(&self.paths.executable);
        command.arg(temp_input.path()).arg(&output_base);
        if let Some(tessdata) = &self.paths.tessdata {
            command.arg("--tessdata-dir").arg(tessdata);
        }
        let output = command
            .arg("-l")
            .arg(&self.config.language)
            .arg("--oem")
            .arg("1") // LSTM engine only
            .arg("tsv") // Output TSV format
            .output()?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(anyhow!("Tesseract failed: {}", stderr));
        }

        // Read TSV output
        let tsv_path = format!("{}.tsv", output_base);
        let tsv_content = std::fs::read_to_string(&tsv_path)
            .map_err(|e| anyhow!("Failed to read Tesseract output: {}", e))?;

        // Clean up output file
        let _ = std::fs::remove_file(&tsv_path);

        Ok(parse_tsv_output(&tsv_content))
    }
}

impl TextRecognizer for TesseractRecognizer {
    fn recognize(&self, region: &RgbaImage) -> Result<Vec<OcrWord>, PerceptionError> {
        let prepared = prepare_for_ocr(
            region,
            self.config.scale_factor,
            self.config.binary_threshold,
            self.config.invert,
        );
        let words = self
            .run(&prepared)
            .map_err(|e| PerceptionError::Recognition(format!("{:#}", e)))?;

        Ok(words
            .into_iter()
            .map(|w| OcrWord {
                bbox: w.bbox.scaled_down(self.config.scale_factor),
                ..w
            })
            .collect())
    }
}

/// Parses Tesseract TSV output into word-level entries, in reading order.
///
/// Rows that are not words (level != 5), empty, or unparseable are skipped.
pub fn parse_tsv_output(tsv: &str) -> Vec<OcrWord> {
    let mut words = Vec::new();

    for line in tsv.lines().skip(1) {
        // Skip header
        let fields: Vec<&str> = line.split('\t').collect();
        if fields.len() < 12 {
            continue;
        }

        // TSV fields: level, page_num, block_num, par_num, line_num, word_num,
        //             left, top, width, height, conf, text
        let level: i32 = fields[0].parse().unwrap_or(-1);
        let text = fields[11].trim();

        // Level 5 = word
        if level != 5 || text.is_empty() {
            continue;
        }

        let coords: Option<Vec<u32>> = fields[6..10].iter().map(|f| f.parse().ok()).collect();
        let Some(coords) = coords else {
            continue;
        };
        let confidence: f32 = fields[10].parse().unwrap_or(-1.0);

        words.push(OcrWord {
            text: text.to_string(),
            confidence,
            bbox: BoundingBox {
                left: coords[0],
                top: coords[1],
                width: coords[2],
                height: coords[3],
            },
        });
    }

    words
}
