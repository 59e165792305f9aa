//! Detection overlay rendering
//!
//! Draws the boundary polygon and decoded text of each detection onto the
//! image, and collects the decoded payloads into a single text block.

use ab_glyph::{FontVec, PxScale};
use image::{Rgb, RgbImage};
use imageproc::drawing::{draw_line_segment_mut, draw_text_mut};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::config::RenderConfig;
use crate::error::ScanError;
use crate::vision::decoder::Detection;
use crate::vision::polygon::{normalize_polygon, Point};

/// Boundary stroke width in pixels.
const LINE_WIDTH: u32 = 2;

/// Renders detection overlays onto images.
pub struct Annotator {
    font: Option<FontVec>,
    box_color: Rgb<u8>,
    label_color: Rgb<u8>,
    label_offset: i32,
    label_scale: PxScale,
}

impl Annotator {
    /// Create an annotator from render settings, loading the label font
    /// from the configured path or the first usable system location.
    pub fn new(render: &RenderConfig) -> Self {
        let font = load_label_font(render.font_path.as_deref());
        if font.is_none() {
            warn!("no label font found; boundaries will be drawn without text labels");
        }

        Self {
            font,
            box_color: Rgb(render.box_color),
            label_color: Rgb(render.label_color),
            label_offset: render.label_offset_px as i32,
            label_scale: PxScale::from(render.label_scale),
        }
    }

    /// Annotator without a label font. Used by tests; boundaries only.
    #[cfg(test)]
    pub fn without_font() -> Self {
        Self {
            font: None,
            box_color: Rgb([0, 128, 0]),
            label_color: Rgb([255, 0, 0]),
            label_offset: 10,
            label_scale: PxScale::from(14.0),
        }
    }

    /// Draw each detection's boundary and label onto the image, in place.
    ///
    /// Returns the decoded payloads joined with newlines, in detection
    /// order. Zero detections leave the image untouched and yield an empty
    /// string. A payload that is not valid UTF-8 fails the call with
    /// [`ScanError::DecodeFailure`].
    pub fn annotate(
        &self,
        image: &mut RgbImage,
        detections: &[Detection],
    ) -> Result<String, ScanError> {
        let mut lines = Vec::with_capacity(detections.len());

        for detection in detections {
            let boundary = normalize_polygon(&detection.polygon);
            self.draw_boundary(image, &boundary);

            let text = detection.text()?;
            if let Some(&anchor) = boundary.first() {
                self.draw_label(image, text, anchor);
            }
            lines.push(text.to_string());
        }

        debug!("annotated {} detection(s)", detections.len());
        Ok(lines.join("\n"))
    }

    /// Stroke a closed polyline through the boundary points.
    fn draw_boundary(&self, image: &mut RgbImage, boundary: &[Point]) {
        if boundary.len() < 2 {
            return;
        }

        for pair in boundary.windows(2) {
            self.draw_segment(image, pair[0], pair[1]);
        }

        // The normalizer closes hulls already; quads come back open
        let first = boundary[0];
        let last = boundary[boundary.len() - 1];
        if first != last {
            self.draw_segment(image, last, first);
        }
    }

    /// Stroke a segment `LINE_WIDTH` pixels thick by repeating it along
    /// its unit perpendicular.
    fn draw_segment(&self, image: &mut RgbImage, a: Point, b: Point) {
        let dx = (b.x - a.x) as f32;
        let dy = (b.y - a.y) as f32;
        let len = (dx * dx + dy * dy).sqrt();
        let (px, py) = if len > 0.0 {
            (-dy / len, dx / len)
        } else {
            (0.0, 0.0)
        };

        for off in 0..LINE_WIDTH {
            let ox = px * off as f32;
            let oy = py * off as f32;
            draw_line_segment_mut(
                image,
                (a.x as f32 + ox, a.y as f32 + oy),
                (b.x as f32 + ox, b.y as f32 + oy),
                self.box_color,
            );
        }
    }

    /// Draw the decoded text above the boundary's first point, clamped to
    /// the image edges.
    fn draw_label(&self, image: &mut RgbImage, text: &str, anchor: Point) {
        let Some(font) = &self.font else {
            return;
        };

        let x = anchor.x.max(0);
        let y = (anchor.y - self.label_offset).max(0);
        draw_text_mut(image, self.label_color, x, y, self.label_scale, font, text);
    }
}

/// Load the label font from an explicit path, or probe well-known system
/// font locations.
fn load_label_font(configured: Option<&Path>) -> Option<FontVec> {
    let candidates: Vec<PathBuf> = match configured {
        Some(path) => vec![path.to_path_buf()],
        None => font_search_paths(),
    };

    for path in candidates {
        match std::fs::read(&path) {
            Ok(bytes) => match FontVec::try_from_vec(bytes) {
                Ok(font) => {
                    debug!("loaded label font from {:?}", path);
                    return Some(font);
                }
                Err(e) => warn!("font at {:?} could not be parsed: {}", path, e),
            },
            Err(_) => continue,
        }
    }

    None
}

/// Well-known font locations probed when no font path is configured.
pub fn font_search_paths() -> Vec<PathBuf> {
    [
        "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
        "/usr/share/fonts/TTF/DejaVuSans.ttf",
        "/usr/share/fonts/truetype/liberation/LiberationSans-Regular.ttf",
        "/usr/share/fonts/truetype/freefont/FreeSans.ttf",
        "/Library/Fonts/Arial.ttf",
        "C:\\Windows\\Fonts\\arial.ttf",
    ]
    .iter()
    .map(PathBuf::from)
    .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quad(x: i32, y: i32, size: i32) -> Vec<Point> {
        vec![
            Point::new(x, y),
            Point::new(x + size, y),
            Point::new(x + size, y + size),
            Point::new(x, y + size),
        ]
    }

    #[test]
    fn test_zero_detections_leave_image_untouched() {
        let annotator = Annotator::without_font();
        let mut image = RgbImage::from_pixel(50, 50, Rgb([200, 200, 200]));
        let reference = image.clone();

        let text = annotator.annotate(&mut image, &[]).unwrap();

        assert_eq!(text, "");
        assert_eq!(image.as_raw(), reference.as_raw());
    }

    #[test]
    fn test_single_detection_draws_boundary_and_text() {
        let annotator = Annotator::without_font();
        let mut image = RgbImage::from_pixel(50, 50, Rgb([255, 255, 255]));

        let detection = Detection {
            payload: b"HELLO".to_vec(),
            polygon: quad(10, 10, 20),
        };
        let text = annotator.annotate(&mut image, &[detection]).unwrap();

        assert_eq!(text, "HELLO");
        // Top edge of the quad must carry the boundary color
        assert_eq!(image.get_pixel(15, 10).0, [0, 128, 0]);
        // Left edge too
        assert_eq!(image.get_pixel(10, 15).0, [0, 128, 0]);
        // Interior stays white
        assert_eq!(image.get_pixel(20, 20).0, [255, 255, 255]);
    }

    #[test]
    fn test_multiple_detections_one_line_each_in_order() {
        let annotator = Annotator::without_font();
        let mut image = RgbImage::from_pixel(100, 100, Rgb([255, 255, 255]));

        let detections = vec![
            Detection {
                payload: b"first".to_vec(),
                polygon: quad(5, 5, 10),
            },
            Detection {
                payload: b"second".to_vec(),
                polygon: quad(40, 40, 10),
            },
            Detection {
                payload: b"third".to_vec(),
                polygon: quad(70, 70, 10),
            },
        ];
        let text = annotator.annotate(&mut image, &detections).unwrap();

        assert_eq!(text, "first\nsecond\nthird");
        // Each quad is boxed independently
        assert_eq!(image.get_pixel(10, 5).0, [0, 128, 0]);
        assert_eq!(image.get_pixel(45, 40).0, [0, 128, 0]);
        assert_eq!(image.get_pixel(75, 70).0, [0, 128, 0]);
    }

    #[test]
    fn test_invalid_utf8_payload_fails() {
        let annotator = Annotator::without_font();
        let mut image = RgbImage::from_pixel(50, 50, Rgb([255, 255, 255]));

        let detection = Detection {
            payload: vec![0xff, 0xfe, 0xfd],
            polygon: quad(10, 10, 20),
        };
        let result = annotator.annotate(&mut image, &[detection]);

        assert!(matches!(result, Err(ScanError::DecodeFailure(_))));
    }

    #[test]
    fn test_hulled_polygon_draws_closed_boundary() {
        let annotator = Annotator::without_font();
        let mut image = RgbImage::from_pixel(60, 60, Rgb([255, 255, 255]));

        // Five points force the convex hull path
        let detection = Detection {
            payload: b"hull".to_vec(),
            polygon: vec![
                Point::new(10, 10),
                Point::new(40, 10),
                Point::new(40, 40),
                Point::new(10, 40),
                Point::new(25, 25),
            ],
        };
        annotator.annotate(&mut image, &[detection]).unwrap();

        // All four sides of the enclosing square must be stroked
        assert_eq!(image.get_pixel(25, 10).0, [0, 128, 0]);
        assert_eq!(image.get_pixel(25, 40).0, [0, 128, 0]);
        assert_eq!(image.get_pixel(10, 25).0, [0, 128, 0]);
        assert_eq!(image.get_pixel(40, 25).0, [0, 128, 0]);
    }

    #[test]
    fn test_stroke_thickens_inward_without_smearing() {
        let annotator = Annotator::without_font();
        let mut image = RgbImage::from_pixel(50, 50, Rgb([255, 255, 255]));

        let detection = Detection {
            payload: b"box".to_vec(),
            polygon: quad(10, 10, 20),
        };
        annotator.annotate(&mut image, &[detection]).unwrap();

        // Top edge: two rows of stroke, nothing above or further below
        assert_eq!(image.get_pixel(20, 10).0, [0, 128, 0]);
        assert_eq!(image.get_pixel(20, 11).0, [0, 128, 0]);
        assert_eq!(image.get_pixel(20, 9).0, [255, 255, 255]);
        assert_eq!(image.get_pixel(20, 12).0, [255, 255, 255]);

        // Right edge thickens inward, not past the boundary
        assert_eq!(image.get_pixel(30, 20).0, [0, 128, 0]);
        assert_eq!(image.get_pixel(29, 20).0, [0, 128, 0]);
        assert_eq!(image.get_pixel(31, 20).0, [255, 255, 255]);

        // Bottom edge likewise
        assert_eq!(image.get_pixel(20, 30).0, [0, 128, 0]);
        assert_eq!(image.get_pixel(20, 29).0, [0, 128, 0]);
        assert_eq!(image.get_pixel(20, 31).0, [255, 255, 255]);
    }

    #[test]
    fn test_boundary_near_edge_does_not_panic() {
        let annotator = Annotator::without_font();
        let mut image = RgbImage::from_pixel(30, 30, Rgb([255, 255, 255]));

        // Anchor at the very top; the label offset would go negative
        let detection = Detection {
            payload: b"edge".to_vec(),
            polygon: quad(0, 0, 29),
        };
        annotator.annotate(&mut image, &[detection]).unwrap();
        assert_eq!(image.get_pixel(15, 0).0, [0, 128, 0]);
    }
}
