//! Digit-count estimation and panel decoding.

pub mod segments;

use image::GrayImage;
use tracing::debug;

use crate::config::EstimationParams;
use crate::error::Result;
use segments::{decode_digit, split_ranges};

/// One digit position of the panel, most significant first.
#[derive(Debug, Clone)]
pub enum DigitCell {
    /// Device rule: the leading position of a 4-digit panel only ever shows
    /// a literal "1". It carries no image and is never run through the
    /// segment decoder.
    LeadingOne,
    /// A digit sub-image to decode.
    Glyph(GrayImage),
}

/// Ratio of the longer to the shorter side.
pub fn panel_aspect(width: u32, height: u32) -> f64 {
    let (w, h) = (width as f64, height as f64);
    w.max(h) / w.min(h)
}

/// Infers the digit layout of the composed image and splits it into per-digit
/// sub-images.
///
/// A composed aspect above the threshold means a 4-digit panel: the leading
/// literal "1" is emitted without an image, and only the rightmost columns of
/// width `height * three_digit_aspect` are split into the remaining 3 cells.
/// Output length is therefore exactly 3 or 4.
pub fn split_digit_cells(composed: &GrayImage, params: &EstimationParams) -> Vec<DigitCell> {
    let (width, height) = composed.dimensions();
    let aspect = panel_aspect(width, height);

    let mut cells = Vec::with_capacity(4);
    let region = if aspect > params.aspect_thresh {
        debug!(aspect, "panel read as 4-digit");
        cells.push(DigitCell::LeadingOne);
        let crop_width = ((height as f64 * params.three_digit_aspect).round() as u32)
            .clamp(1, width);
        let left = width - crop_width;
        image::imageops::crop_imm(composed, left, 0, crop_width, height).to_image()
    } else {
        debug!(aspect, "panel read as 3-digit");
        composed.clone()
    };

    for (x0, x1) in split_ranges(region.width(), 3) {
        let cell = image::imageops::crop_imm(&region, x0, 0, x1 - x0, region.height())
            .to_image();
        cells.push(DigitCell::Glyph(cell));
    }
    cells
}

/// Decodes every cell, most significant first. An undecodable position
/// surfaces its error; nothing is substituted silently.
pub fn decode_cells(cells: &[DigitCell], params: &EstimationParams) -> Result<String> {
    let mut digits = String::with_capacity(cells.len());
    for cell in cells {
        match cell {
            DigitCell::LeadingOne => digits.push('1'),
            DigitCell::Glyph(img) => digits.push(decode_digit(img, params.segment_fill_thresh)?),
        }
    }
    Ok(digits)
}
