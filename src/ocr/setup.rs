use anyhow::{anyhow, Result};
use std::path::{Path, PathBuf};
use std::process::Command;

use crate::log;

#[cfg(windows)]
const EXECUTABLE_NAME: &str = "tesseract.exe";
#[cfg(not(windows))]
const EXECUTABLE_NAME: &str = "tesseract";

/// Default install locations of the UB-Mannheim Windows build.
const COMMON_PATHS: [&str; 2] = [
    r"C:\Program Files\Tesseract-OCR\tesseract.exe",
    r"C:\Program Files (x86)\Tesseract-OCR\tesseract.exe",
];

#[derive(Clone, Debug)]
pub struct TesseractPaths {
    pub executable: PathBuf,
    /// Explicit tessdata directory, when one ships next to the executable.
    pub tessdata: Option<PathBuf>,
}

/// Returns the per-user directory for a private Tesseract copy.
pub fn get_tesseract_dir() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("screen-navigator")
        .join("tesseract")
}

/// Locates the Tesseract executable.
///
/// Search order: the configured path, the per-user data directory, `PATH`,
/// then the default Windows install locations.
pub fn find_tesseract(configured: Option<&Path>) -> Result<TesseractPaths> {
    if let Some(path) = configured {
        if path.exists() {
            log(&format!("Using configured Tesseract: {}", path.display()));
            return Ok(paths_for(path.to_path_buf()));
        }
        log(&format!(
            "Configured Tesseract not found at {}, searching elsewhere",
            path.display()
        ));
    }

    let private = get_tesseract_dir().join(EXECUTABLE_NAME);
    if private.exists() {
        log(&format!("Tesseract found at: {}", private.display()));
        return Ok(paths_for(private));
    }

    if let Ok(output) = Command::new("tesseract").arg("--version").output() {
        if output.status.success() {
            log("Found Tesseract in system PATH");
            return Ok(TesseractPaths {
                executable: PathBuf::from("tesseract"),
                tessdata: None,
            });
        }
    }

    for path in &COMMON_PATHS {
        let path = PathBuf::from(path);
        if path.exists() {
            log(&format!("Found Tesseract at: {}", path.display()));
            return Ok(paths_for(path));
        }
    }

    Err(anyhow!(
        "Tesseract not found. Install it (https://github.com/UB-Mannheim/tesseract/releases), \
         add it to PATH, set ocr.tesseract_path in config.json, or copy it to {}",
        get_tesseract_dir().display()
    ))
}

/// Pairs an executable with a sibling `tessdata` directory if present.
fn paths_for(executable: PathBuf) -> TesseractPaths {
    let tessdata = executable
        .parent()
        .map(|dir| dir.join("tessdata"))
        .filter(|dir| dir.is_dir());
    TesseractPaths {
        executable,
        tessdata,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_configured_path_with_tessdata() {
        let dir = tempfile::tempdir().unwrap();
        let exe = dir.path().join(EXECUTABLE_NAME);
        std::fs::write(&exe, b"").unwrap();
        std::fs::create_dir(dir.path().join("tessdata")).unwrap();

        let paths = find_tesseract(Some(&exe)).unwrap();
        assert_eq!(paths.executable, exe);
        assert_eq!(paths.tessdata, Some(dir.path().join("tessdata")));
    }

    #[test]
    fn test_paths_for_without_tessdata() {
        let dir = tempfile::tempdir().unwrap();
        let paths = paths_for(dir.path().join(EXECUTABLE_NAME));
        assert!(paths.tessdata.is_none());
    }
}
