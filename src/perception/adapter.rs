//! Perception adapter over the capture and text-recognition providers.

use chrono::Local;
use image::RgbaImage;
use std::path::{Path, PathBuf};

use super::region::Region;
use super::rules::DetectionRules;
use super::PerceptionError;
use crate::ocr::preprocess::crop_region;
use crate::ocr::OcrWord;

/// A captured image of the game window's client area.
#[derive(Clone, Debug)]
pub struct Frame {
    pub image: RgbaImage,
    /// Screen position of the frame's top-left pixel.
    pub origin: (i32, i32),
}

impl Frame {
    pub fn new(image: RgbaImage) -> Self {
        Self {
            image,
            origin: (0, 0),
        }
    }

    pub fn with_origin(image: RgbaImage, origin: (i32, i32)) -> Self {
        Self { image, origin }
    }

    pub fn dimensions(&self) -> (u32, u32) {
        self.image.dimensions()
    }
}

/// Produces frames of the game window.
///
/// Implementations must bring the window to the foreground before capturing.
pub trait FrameSource {
    fn capture_frame(&mut self) -> Result<Frame, PerceptionError>;
}

/// Recognizes text tokens in an image region.
///
/// Bounding boxes are in the pixel coordinates of the image passed in.
pub trait TextRecognizer {
    fn recognize(&self, region: &RgbaImage) -> Result<Vec<OcrWord>, PerceptionError>;
}

/// Wraps the capture and OCR providers.
pub struct Perception {
    source: Box<dyn FrameSource>,
    recognizer: Box<dyn TextRecognizer>,
    snapshot_dir: Option<PathBuf>,
    save_every_frame: bool,
    last_frame: Option<Frame>,
}

impl Perception {
    pub fn new(source: Box<dyn FrameSource>, recognizer: Box<dyn TextRecognizer>) -> Self {
        Self {
            source,
            recognizer,
            snapshot_dir: None,
            save_every_frame: false,
            last_frame: None,
        }
    }

    /// Enables diagnostic snapshots into `dir`.
    pub fn with_snapshots(mut self, dir: PathBuf, save_every_frame: bool) -> Self {
        self.snapshot_dir = Some(dir);
        self.save_every_frame = save_every_frame;
        self
    }

    /// Captures a fresh frame, keeping it as the last frame for diagnostics.
    pub fn capture(&mut self) -> Result<&Frame, PerceptionError> {
        let frame = self.source.capture_frame()?;
        let frame = self.last_frame.insert(frame);
        if self.save_every_frame {
            if let Some(dir) = &self.snapshot_dir {
                write_snapshot(dir, frame, "frame");
            }
        }
        Ok(frame)
    }

    /// The most recently captured frame, if any.
    pub fn last_frame(&self) -> Option<&Frame> {
        self.last_frame.as_ref()
    }

    /// Returns the first screen (in rule order) whose expected text appears
    /// in its region of `frame`.
    pub fn detect_screen(
        &self,
        frame: &Frame,
        rules: &DetectionRules,
    ) -> Result<Option<String>, PerceptionError> {
        let (width, height) = frame.dimensions();

        for (screen, rule) in rules.iter() {
            let rect = rule.region.resolve(width, height);
            if rect.is_empty() {
                continue;
            }
            let cropped = crop_region(&frame.image, &rect);
            let words = self.recognizer.recognize(&cropped)?;
            if rule.matches(words.iter().map(|w| w.text.as_str())) {
                return Ok(Some(screen.to_string()));
            }
        }

        Ok(None)
    }

    /// Captures a fresh frame and detects the screen on it.
    pub fn detect_current(
        &mut self,
        rules: &DetectionRules,
    ) -> Result<Option<String>, PerceptionError> {
        self.capture()?;
        match &self.last_frame {
            Some(frame) => self.detect_screen(frame, rules),
            None => Ok(None),
        }
    }

    /// Finds the first token containing `text` inside `region` and returns
    /// its centre in frame pixel coordinates.
    pub fn find_text(
        &self,
        frame: &Frame,
        text: &str,
        region: &Region,
    ) -> Result<Option<(i32, i32)>, PerceptionError> {
        let (width, height) = frame.dimensions();
        let rect = region.resolve(width, height);
        if rect.is_empty() {
            return Ok(None);
        }

        let cropped = crop_region(&frame.image, &rect);
        let words = self.recognizer.recognize(&cropped)?;

        Ok(words
            .iter()
            .find(|w| w.text.trim().contains(text))
            .map(|w| {
                let (cx, cy) = w.bbox.center();
                (rect.x as i32 + cx, rect.y as i32 + cy)
            }))
    }

    /// Captures a fresh frame and locates `text` in screen coordinates.
    pub fn locate_on_screen(
        &mut self,
        text: &str,
        region: &Region,
    ) -> Result<Option<(i32, i32)>, PerceptionError> {
        self.capture()?;
        let Some(frame) = &self.last_frame else {
            return Ok(None);
        };
        let (ox, oy) = frame.origin;
        Ok(self
            .find_text(frame, text, region)?
            .map(|(x, y)| (ox + x, oy + y)))
    }

    /// Saves the last captured frame for post-mortem inspection.
    ///
    /// Returns the written path, or `None` if snapshots are disabled or no
    /// frame has been captured yet.
    pub fn save_snapshot(&self, label: &str) -> Option<PathBuf> {
        let dir = self.snapshot_dir.as_ref()?;
        let frame = self.last_frame.as_ref()?;
        write_snapshot(dir, frame, label)
    }
}

fn write_snapshot(dir: &Path, frame: &Frame, label: &str) -> Option<PathBuf> {
    if let Err(e) = std::fs::create_dir_all(dir) {
        crate::log(&format!("Failed to create snapshot directory: {}", e));
        return None;
    }

    let timestamp = Local::now().format("%Y%m%d_%H%M%S%.3f");
    let label: String = label
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect();
    let path = dir.join(format!("{}_{}.png", timestamp, label));

    match frame.image.save(&path) {
        Ok(()) => {
            crate::log(&format!("Snapshot saved to {}", path.display()));
            Some(path)
        }
        Err(e) => {
            crate::log(&format!("Failed to save snapshot: {}", e));
            None
        }
    }
}
