//! Regions of interest, expressed relative to the frame so they survive
//! window resizes.

use serde::{Deserialize, Serialize};

/// A region of interest within a captured frame.
///
/// Serialized externally tagged, e.g. `{"fraction": [0.0, 0.0, 0.3, 0.25]}`
/// or `{"top": 0.3}`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Region {
    /// `[x_start, y_start, x_end, y_end]` as fractions of width/height.
    /// Values above 1.0 are clamped to the frame edge.
    Fraction([f32; 4]),
    /// Top N (fraction) of the frame, full width.
    Top(f32),
    /// Bottom N of the frame, full width.
    Bottom(f32),
    /// Left N of the frame, full height.
    Left(f32),
    /// Right N of the frame, full height.
    Right(f32),
}

/// A region resolved against concrete frame dimensions, in pixels.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PixelRect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl PixelRect {
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

impl Region {
    /// The whole frame.
    pub const FULL: Region = Region::Fraction([0.0, 0.0, 1.0, 1.0]);

    /// Checks that the region can describe a non-empty area.
    pub fn validate(&self) -> Result<(), String> {
        match *self {
            Region::Fraction([x0, y0, x1, y1]) => {
                let all = [x0, y0, x1, y1];
                if all.iter().any(|v| !v.is_finite() || *v < 0.0) {
                    return Err(format!("fractions must be finite and >= 0, got {:?}", all));
                }
                if x0 >= x1 || y0 >= y1 {
                    return Err(format!("start must be before end, got {:?}", all));
                }
                Ok(())
            }
            Region::Top(n) | Region::Bottom(n) | Region::Left(n) | Region::Right(n) => {
                if n.is_finite() && n > 0.0 && n <= 1.0 {
                    Ok(())
                } else {
                    Err(format!("directional fraction must be in (0, 1], got {}", n))
                }
            }
        }
    }

    /// Resolves the region against a `width` x `height` frame, clamping to
    /// the frame bounds.
    pub fn resolve(&self, width: u32, height: u32) -> PixelRect {
        let w = width as f32;
        let h = height as f32;

        let (x0, y0, x1, y1) = match *self {
            Region::Fraction([fx0, fy0, fx1, fy1]) => (
                (fx0 * w) as u32,
                (fy0 * h) as u32,
                (fx1 * w) as u32,
                (fy1 * h) as u32,
            ),
            Region::Top(n) => (0, 0, width, (h * n).round() as u32),
            Region::Bottom(n) => (0, height.saturating_sub((h * n).round() as u32), width, height),
            Region::Left(n) => (0, 0, (w * n).round() as u32, height),
            Region::Right(n) => (width.saturating_sub((w * n).round() as u32), 0, width, height),
        };

        let x0 = x0.min(width);
        let y0 = y0.min(height);
        let x1 = x1.min(width).max(x0);
        let y1 = y1.min(height).max(y0);

        PixelRect {
            x: x0,
            y: y0,
            width: x1 - x0,
            height: y1 - y0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fraction_truncates_to_pixels() {
        let rect = Region::Fraction([0.1, 0.25, 0.6, 0.5]).resolve(100, 200);
        assert_eq!(rect, PixelRect { x: 10, y: 50, width: 50, height: 50 });
    }

    #[test]
    fn test_fraction_clamps_past_edge() {
        // Regions like (0.8, 0.8, 2, 2) mean "to the bottom-right corner"
        let rect = Region::Fraction([0.8, 0.8, 2.0, 2.0]).resolve(1920, 1080);
        assert_eq!(rect, PixelRect { x: 1536, y: 864, width: 384, height: 216 });
    }

    #[test]
    fn test_directional_regions() {
        assert_eq!(
            Region::Top(0.3).resolve(1000, 500),
            PixelRect { x: 0, y: 0, width: 1000, height: 150 }
        );
        assert_eq!(
            Region::Bottom(0.3).resolve(1000, 500),
            PixelRect { x: 0, y: 350, width: 1000, height: 150 }
        );
        assert_eq!(
            Region::Left(0.25).resolve(1000, 500),
            PixelRect { x: 0, y: 0, width: 250, height: 500 }
        );
        assert_eq!(
            Region::Right(0.25).resolve(1000, 500),
            PixelRect { x: 750, y: 0, width: 250, height: 500 }
        );
    }

    #[test]
    fn test_zero_sized_frame_gives_empty_rect() {
        assert!(Region::FULL.resolve(0, 0).is_empty());
    }

    #[test]
    fn test_validate() {
        assert!(Region::Fraction([0.0, 0.0, 0.3, 0.25]).validate().is_ok());
        assert!(Region::Fraction([0.8, 0.8, 2.0, 2.0]).validate().is_ok());
        assert!(Region::Fraction([0.5, 0.0, 0.5, 1.0]).validate().is_err());
        assert!(Region::Fraction([-0.1, 0.0, 0.5, 1.0]).validate().is_err());
        assert!(Region::Top(0.0).validate().is_err());
        assert!(Region::Right(1.5).validate().is_err());
        assert!(Region::Left(1.0).validate().is_ok());
    }

    #[test]
    fn test_serde_shapes() {
        let region: Region = serde_json::from_str(r#"{"fraction": [0.0, 0.7, 0.271, 1.0]}"#).unwrap();
        assert_eq!(region, Region::Fraction([0.0, 0.7, 0.271, 1.0]));

        let region: Region = serde_json::from_str(r#"{"top": 0.3}"#).unwrap();
        assert_eq!(region, Region::Top(0.3));
    }
}
