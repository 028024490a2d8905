use image::imageops::{self, FilterType};
use image::{GrayImage, ImageBuffer, Luma, Rgba, RgbaImage};

use crate::perception::PixelRect;

/// 3x3 sharpen kernel applied before binarization.
const SHARPEN_KERNEL: [f32; 9] = [0.0, -1.0, 0.0, -1.0, 5.0, -1.0, 0.0, -1.0, 0.0];

/// Crops a resolved pixel rectangle out of a frame.
///
/// The rectangle is clamped to the image bounds.
pub fn crop_region(img: &RgbaImage, rect: &PixelRect) -> RgbaImage {
    let (w, h) = img.dimensions();

    let x0 = rect.x.min(w);
    let y0 = rect.y.min(h);
    let rw = rect.width.min(w - x0);
    let rh = rect.height.min(h - y0);

    imageops::crop_imm(img, x0, y0, rw, rh).to_image()
}

/// Converts a grayscale image to binary.
///
/// Pixels brighter than `threshold` become white, the rest black. With
/// `invert` set the result is flipped, turning the game's light-on-dark UI
/// text into the dark-on-light text Tesseract expects.
pub fn binarize(img: &GrayImage, threshold: u8, invert: bool) -> GrayImage {
    let (width, height) = img.dimensions();
    let mut output = ImageBuffer::new(width, height);

    for (x, y, pixel) in img.enumerate_pixels() {
        let bright = pixel[0] > threshold;
        let value = if bright != invert { 255u8 } else { 0u8 };
        output.put_pixel(x, y, Luma([value]));
    }

    output
}

/// Prepares a cropped region for recognition: upscale, sharpen, grayscale,
/// then binarize.
pub fn prepare_for_ocr(
    img: &ImageBuffer<Rgba<u8>, Vec<u8>>,
    scale_factor: u32,
    threshold: u8,
    invert: bool,
) -> GrayImage {
    let scale = scale_factor.max(1);
    let upscaled = if scale > 1 {
        let (w, h) = img.dimensions();
        imageops::resize(img, w * scale, h * scale, FilterType::CatmullRom)
    } else {
        img.clone()
    };

    let sharpened = imageops::filter3x3(&upscaled, &SHARPEN_KERNEL);
    let gray = imageops::grayscale(&sharpened);
    binarize(&gray, threshold, invert)
}
