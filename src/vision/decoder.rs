//! QR detection and decoding collaborator
//!
//! The actual symbol location and decoding is delegated to the `rqrr` crate
//! behind a small trait so the pipeline (and its tests) never depend on a
//! concrete decoder.

use image::RgbImage;
use tracing::{debug, warn};

use crate::error::ScanError;
use crate::vision::polygon::Point;

/// One located-and-decoded QR code within an image.
///
/// The payload is kept as raw bytes; interpretation as UTF-8 happens when
/// the text is actually needed, so a bad payload surfaces as a
/// [`ScanError::DecodeFailure`] instead of being silently mangled.
#[derive(Debug, Clone)]
pub struct Detection {
    /// Decoded payload bytes.
    pub payload: Vec<u8>,
    /// Boundary points reported by the decoder, in decoder order.
    pub polygon: Vec<Point>,
}

impl Detection {
    /// Interpret the payload as UTF-8 text.
    pub fn text(&self) -> Result<&str, ScanError> {
        std::str::from_utf8(&self.payload)
            .map_err(|e| ScanError::DecodeFailure(e.to_string()))
    }
}

/// Boundary to the detection/decoding collaborator.
///
/// Implementations take a raster image and return zero or more detections.
pub trait QrDecoder: Send + Sync {
    fn decode(&self, image: &RgbImage) -> Result<Vec<Detection>, ScanError>;
}

/// Decoder backed by the `rqrr` crate.
pub struct RqrrDecoder;

impl QrDecoder for RqrrDecoder {
    fn decode(&self, image: &RgbImage) -> Result<Vec<Detection>, ScanError> {
        let gray = image::imageops::grayscale(image);
        let (width, height) = gray.dimensions();

        let mut prepared = rqrr::PreparedImage::prepare_from_greyscale(
            width as usize,
            height as usize,
            |x, y| gray.get_pixel(x as u32, y as u32).0[0],
        );

        let grids = prepared.detect_grids();
        debug!("rqrr located {} candidate grid(s)", grids.len());

        let mut detections = Vec::with_capacity(grids.len());
        for grid in grids {
            let polygon: Vec<Point> = grid
                .bounds
                .iter()
                .map(|p| Point::new(p.x, p.y))
                .collect();

            // A located grid can still fail to decode (damage, occlusion).
            // Only successfully decoded symbols are reported, matching
            // typical decoder behavior.
            match grid.decode() {
                Ok((_meta, content)) => detections.push(Detection {
                    payload: content.into_bytes(),
                    polygon,
                }),
                Err(e) => warn!("skipping undecodable grid: {}", e),
            }
        }

        Ok(detections)
    }
}

/// Rasterize a QR code for the given payload onto a white background,
/// with a quiet zone, at `scale` pixels per module.
#[cfg(test)]
pub(crate) fn qr_test_image(payload: &str, scale: u32) -> RgbImage {
    const QUIET_MODULES: u32 = 4;

    let code = qrcode::QrCode::new(payload.as_bytes()).unwrap();
    let modules = code.width() as u32;
    let colors = code.to_colors();

    let size = (modules + 2 * QUIET_MODULES) * scale;
    let mut image = RgbImage::from_pixel(size, size, image::Rgb([255, 255, 255]));

    for (i, color) in colors.iter().enumerate() {
        if *color != qrcode::Color::Dark {
            continue;
        }
        let mx = i as u32 % modules;
        let my = i as u32 / modules;
        for dy in 0..scale {
            for dx in 0..scale {
                let x = (QUIET_MODULES + mx) * scale + dx;
                let y = (QUIET_MODULES + my) * scale + dy;
                image.put_pixel(x, y, image::Rgb([0, 0, 0]));
            }
        }
    }

    image
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_image_yields_no_detections() {
        let image = RgbImage::from_pixel(64, 64, image::Rgb([255, 255, 255]));
        let detections = RqrrDecoder.decode(&image).unwrap();
        assert!(detections.is_empty());
    }

    #[test]
    fn test_hello_qr_image_decodes_to_single_detection() {
        let image = qr_test_image("HELLO", 8);

        let detections = RqrrDecoder.decode(&image).unwrap();

        assert_eq!(detections.len(), 1);
        assert_eq!(detections[0].text().unwrap(), "HELLO");
        assert_eq!(detections[0].polygon.len(), 4);
        // Corners must sit inside the image
        let (w, h) = image.dimensions();
        for p in &detections[0].polygon {
            assert!(p.x >= 0 && (p.x as u32) < w);
            assert!(p.y >= 0 && (p.y as u32) < h);
        }
    }

    #[test]
    fn test_two_qr_codes_yield_two_detections() {
        let left = qr_test_image("one", 6);
        let right = qr_test_image("two", 6);
        let (lw, lh) = left.dimensions();
        let (rw, rh) = right.dimensions();

        let mut combined =
            RgbImage::from_pixel(lw + rw, lh.max(rh), image::Rgb([255, 255, 255]));
        image::imageops::overlay(&mut combined, &left, 0, 0);
        image::imageops::overlay(&mut combined, &right, lw as i64, 0);

        let detections = RqrrDecoder.decode(&combined).unwrap();

        assert_eq!(detections.len(), 2);
        let mut texts: Vec<&str> = detections.iter().map(|d| d.text().unwrap()).collect();
        texts.sort_unstable();
        assert_eq!(texts, ["one", "two"]);
    }

    #[test]
    fn test_detection_text_valid_utf8() {
        let det = Detection {
            payload: b"HELLO".to_vec(),
            polygon: vec![
                Point::new(0, 0),
                Point::new(10, 0),
                Point::new(10, 10),
                Point::new(0, 10),
            ],
        };
        assert_eq!(det.text().unwrap(), "HELLO");
    }

    #[test]
    fn test_detection_text_invalid_utf8_is_decode_failure() {
        let det = Detection {
            payload: vec![0xff, 0xfe],
            polygon: vec![Point::new(0, 0), Point::new(1, 0), Point::new(1, 1)],
        };
        assert!(matches!(det.text(), Err(ScanError::DecodeFailure(_))));
    }
}
