//! Image preprocessing for display
//!
//! Uploaded images are scaled down to a fixed display width before decoding
//! and annotation so the result page stays a manageable size.

use image::imageops::FilterType;
use image::RgbImage;

/// Scale an image proportionally to the target width.
///
/// The aspect ratio is preserved: the output height is
/// `round(width * h / w)`. Uses Lanczos3 resampling. Returns a new image;
/// the input is left untouched. `None` (or a zero-dimension image) is a
/// degenerate no-op and yields `None`.
pub fn resize_to_width(image: Option<&RgbImage>, target_width: u32) -> Option<RgbImage> {
    let image = image?;

    let (width, height) = image.dimensions();
    if width == 0 || height == 0 || target_width == 0 {
        return None;
    }

    let aspect_ratio = height as f64 / width as f64;
    let new_height = (target_width as f64 * aspect_ratio).round().max(1.0) as u32;

    Some(image::imageops::resize(
        image,
        target_width,
        new_height,
        FilterType::Lanczos3,
    ))
}
