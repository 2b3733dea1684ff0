//! The image-to-digits pipeline.

pub mod binarize;
pub mod compose;
pub mod contours;
pub mod rectify;

use image::GrayImage;
use tracing::debug;

use crate::config::Configurations;
use crate::decode;
use crate::error::Result;
use crate::models::{ContourRegion, Quadrilateral};

/// Pipeline orchestrator: rectify, binarize, extract and filter contours,
/// compose, estimate the digit layout, decode.
///
/// Holds only validated, immutable configuration; every stage consumes its
/// input and produces a fresh output, so a reader can be shared freely
/// across threads.
pub struct MeterReader {
    config: Configurations,
    quad: Quadrilateral,
}

impl MeterReader {
    /// Validates the configuration and resolves the display quadrilateral.
    /// Fails before any image is touched.
    pub fn new(config: Configurations) -> Result<Self> {
        config.validate()?;
        let quad = config.rectify.corners.to_quadrilateral()?;
        Ok(Self { config, quad })
    }

    pub fn config(&self) -> &Configurations {
        &self.config
    }

    /// Runs the full pipeline on a grayscale photograph and returns the
    /// decoded reading, most significant digit first (3 or 4 characters).
    pub fn read(&self, img: &GrayImage) -> Result<String> {
        let composed = self.composed(img)?;
        let cells = decode::split_digit_cells(&composed, &self.config.estimation);
        let digits = decode::decode_cells(&cells, &self.config.estimation)?;
        debug!(%digits, "panel decoded");
        Ok(digits)
    }

    /// Rectified display region.
    pub fn rectified(&self, img: &GrayImage) -> Result<GrayImage> {
        rectify::rectify(
            img,
            &self.quad,
            self.config.rectify.dst_height,
            self.config.rectify.dst_width,
        )
    }

    /// Binary foreground mask of the rectified region.
    pub fn mask(&self, img: &GrayImage) -> Result<GrayImage> {
        let rectified = self.rectified(img)?;
        debug!(
            width = rectified.width(),
            height = rectified.height(),
            "display region rectified"
        );
        binarize::binarize(&rectified, &self.config.binarize)
    }

    /// Contours that survived the digit-shape filter.
    pub fn digit_regions(&self, img: &GrayImage) -> Result<Vec<ContourRegion>> {
        let mask = self.mask(img)?;
        let regions = contours::extract_regions(&mask);
        debug!(total = regions.len(), "contours extracted");
        let kept =
            contours::filter_digit_regions(regions, mask.width(), mask.height(), &self.config.filter);
        debug!(kept = kept.len(), "digit contours kept");
        Ok(kept)
    }

    /// Composed, cropped and re-padded digit block.
    pub fn composed(&self, img: &GrayImage) -> Result<GrayImage> {
        let regions = self.digit_regions(img)?;
        compose::compose(
            &regions,
            self.config.rectify.dst_width,
            self.config.rectify.dst_height,
            true,
        )
    }
}
