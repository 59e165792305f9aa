//! Vision layer
//!
//! Takes an uploaded image through the full scan flow: resize for display,
//! locate and decode QR codes, draw the overlays, collect the text.

pub mod annotate;
pub mod decoder;
pub mod polygon;
pub mod preprocess;

pub use annotate::Annotator;
pub use decoder::{Detection, QrDecoder, RqrrDecoder};
pub use polygon::Point;

use anyhow::Context;
use image::{DynamicImage, RgbImage};
use std::time::Instant;
use tracing::{debug, warn};

use crate::config::RenderConfig;
use crate::error::ScanError;

/// Result of running an image through the scan pipeline.
pub struct ScanOutcome {
    /// The resized image with detection overlays drawn onto it.
    pub image: RgbImage,
    /// All decoded payloads, one per line, in decoder-reported order.
    pub text: String,
    /// Number of QR codes found.
    pub detections: usize,
}

/// Full scan pipeline: resize, decode, annotate.
///
/// The decoder sits behind a trait so tests can substitute a stub; the
/// default is [`RqrrDecoder`].
pub struct ScanPipeline {
    decoder: Box<dyn QrDecoder>,
    annotator: Annotator,
    display_width: u32,
}

impl ScanPipeline {
    /// Build the pipeline with the stock rqrr decoder.
    pub fn new(render: &RenderConfig) -> Self {
        Self::with_decoder(Box::new(RqrrDecoder), render)
    }

    /// Build the pipeline with a custom decoder implementation.
    ///
    /// A configured display width of 0 cannot produce an image; it is
    /// replaced by the default width with a warning.
    pub fn with_decoder(decoder: Box<dyn QrDecoder>, render: &RenderConfig) -> Self {
        let display_width = if render.display_width == 0 {
            let fallback = RenderConfig::default().display_width;
            warn!(
                "configured display_width of 0 is invalid; falling back to {}",
                fallback
            );
            fallback
        } else {
            render.display_width
        };

        Self {
            decoder,
            annotator: Annotator::new(render),
            display_width,
        }
    }

    /// Process one uploaded image start to finish.
    ///
    /// The image is scaled to the display width first and decoding runs on
    /// the scaled copy, so the reported polygons line up with the rendered
    /// output without any coordinate mapping.
    pub fn process(&self, image: DynamicImage) -> Result<ScanOutcome, ScanError> {
        let start = Instant::now();

        let rgb = image.to_rgb8();
        let mut resized = preprocess::resize_to_width(Some(&rgb), self.display_width)
            .context("uploaded image has no pixels")
            .map_err(ScanError::Internal)?;

        let detections = self.decoder.decode(&resized)?;
        let text = self.annotator.annotate(&mut resized, &detections)?;

        debug!(
            "scan complete in {:?}: {} detection(s)",
            start.elapsed(),
            detections.len()
        );

        Ok(ScanOutcome {
            image: resized,
            text,
            detections: detections.len(),
        })
    }
}
