//! Configuration for the extraction pipeline.
//!
//! Loaded once from a JSON document at startup and validated before any
//! image is touched; a malformed document is fatal. All value objects are
//! immutable for the duration of a run.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::models::{Point, Quadrilateral};

/// Named corner points of the display region as they appear in the
/// configuration document. Converted to the canonical [`Quadrilateral`]
/// representation at the boundary.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CornerPoints {
    pub upper_left: Point,
    pub upper_right: Point,
    pub lower_right: Point,
    pub lower_left: Point,
}

impl CornerPoints {
    pub fn to_quadrilateral(&self) -> Result<Quadrilateral> {
        Quadrilateral::from_corners(
            self.upper_left,
            self.upper_right,
            self.lower_right,
            self.lower_left,
        )
    }
}

/// Perspective rectification parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RectifyParams {
    /// Display corners in the source photograph, clockwise from upper left.
    pub corners: CornerPoints,
    /// Height of the rectified image.
    pub dst_height: u32,
    /// Width of the rectified image.
    pub dst_width: u32,
}

/// Binarization parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BinarizeParams {
    /// Gaussian smoothing kernel size; must be odd.
    pub gaussian_kernel_size: u32,
    pub gaussian_sigma: f32,
    /// Edge-preserving (bilateral) filter window size.
    pub bilateral_window_size: u32,
    pub bilateral_sigma_color: f32,
    pub bilateral_sigma_spatial: f32,
    /// Adaptive threshold neighbourhood size; must be odd and larger than
    /// both kernel sizes.
    pub adaptive_block_size: u32,
    /// A pixel is foreground when darker than its local mean by more than
    /// this constant.
    pub adaptive_constant: i32,
    /// Morphological closing kernel size; must be odd.
    pub closing_kernel_size: u32,
}

impl Default for BinarizeParams {
    fn default() -> Self {
        Self {
            gaussian_kernel_size: 15,
            gaussian_sigma: 2.0,
            bilateral_window_size: 7,
            bilateral_sigma_color: 20.0,
            bilateral_sigma_spatial: 10.0,
            adaptive_block_size: 301,
            adaptive_constant: 1,
            closing_kernel_size: 3,
        }
    }
}

impl BinarizeParams {
    pub fn validate(&self) -> Result<()> {
        if self.gaussian_kernel_size == 0 || self.gaussian_kernel_size % 2 == 0 {
            return Err(Error::InvalidParameter(format!(
                "gaussian_kernel_size must be odd and positive, got {}",
                self.gaussian_kernel_size
            )));
        }
        if self.gaussian_sigma <= 0.0 {
            return Err(Error::InvalidParameter(format!(
                "gaussian_sigma must be positive, got {}",
                self.gaussian_sigma
            )));
        }
        if self.bilateral_window_size == 0 {
            return Err(Error::InvalidParameter(
                "bilateral_window_size must be positive".into(),
            ));
        }
        if self.closing_kernel_size == 0 || self.closing_kernel_size % 2 == 0 {
            return Err(Error::InvalidParameter(format!(
                "closing_kernel_size must be odd and positive, got {}",
                self.closing_kernel_size
            )));
        }
        if self.adaptive_block_size % 2 == 0
            || self.adaptive_block_size <= self.gaussian_kernel_size
            || self.adaptive_block_size <= self.closing_kernel_size
        {
            return Err(Error::InvalidParameter(format!(
                "adaptive_block_size must be odd and larger than the kernel sizes, got {}",
                self.adaptive_block_size
            )));
        }
        Ok(())
    }
}

/// An open interval used for the contour aspect heuristic.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct AspectRange {
    pub min: f64,
    pub max: f64,
}

impl AspectRange {
    /// True when `value` lies strictly inside the interval.
    pub fn contains(&self, value: f64) -> bool {
        value > self.min && value < self.max
    }
}

/// Contour filtering thresholds.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FilterParams {
    /// Minimum contour-area / bounding-box-area ratio.
    pub fill_ratio_thresh: f64,
    /// Minimum bounding-box-area / image-area ratio.
    pub image_ratio_thresh: f64,
    /// Open interval the bounding-box aspect must fall inside.
    pub aspect_range: AspectRange,
}

impl Default for FilterParams {
    fn default() -> Self {
        Self {
            fill_ratio_thresh: 0.3,
            image_ratio_thresh: 3e-3,
            aspect_range: AspectRange { min: 1.3, max: 6.0 },
        }
    }
}

impl FilterParams {
    pub fn validate(&self) -> Result<()> {
        if !(0.0..1.0).contains(&self.fill_ratio_thresh) {
            return Err(Error::InvalidParameter(format!(
                "fill_ratio_thresh must lie in [0, 1), got {}",
                self.fill_ratio_thresh
            )));
        }
        if !(0.0..1.0).contains(&self.image_ratio_thresh) {
            return Err(Error::InvalidParameter(format!(
                "image_ratio_thresh must lie in [0, 1), got {}",
                self.image_ratio_thresh
            )));
        }
        if self.aspect_range.min <= 0.0 || self.aspect_range.min >= self.aspect_range.max {
            return Err(Error::InvalidParameter(format!(
                "aspect_range must satisfy 0 < min < max, got ({}, {})",
                self.aspect_range.min, self.aspect_range.max
            )));
        }
        Ok(())
    }
}

/// Digit-count estimation and segment sampling parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EstimationParams {
    /// Composed-image aspect above which the panel is read as 4-digit.
    pub aspect_thresh: f64,
    /// Width/height ratio of a canonical 3-digit block, used to crop the
    /// rightmost digits of a 4-digit panel.
    pub three_digit_aspect: f64,
    /// Minimum nonzero fill ratio for a sampled grid cell to count as lit.
    pub segment_fill_thresh: f64,
}

impl Default for EstimationParams {
    fn default() -> Self {
        Self {
            aspect_thresh: 3.0,
            three_digit_aspect: 2.2,
            segment_fill_thresh: 0.2,
        }
    }
}

impl EstimationParams {
    pub fn validate(&self) -> Result<()> {
        if self.aspect_thresh <= 0.0 || self.three_digit_aspect <= 0.0 {
            return Err(Error::InvalidParameter(
                "aspect_thresh and three_digit_aspect must be positive".into(),
            ));
        }
        if !(self.segment_fill_thresh > 0.0 && self.segment_fill_thresh < 1.0) {
            return Err(Error::InvalidParameter(format!(
                "segment_fill_thresh must lie in (0, 1), got {}",
                self.segment_fill_thresh
            )));
        }
        Ok(())
    }
}

/// Complete pipeline configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Configurations {
    pub rectify: RectifyParams,
    #[serde(default)]
    pub binarize: BinarizeParams,
    #[serde(default)]
    pub filter: FilterParams,
    #[serde(default)]
    pub estimation: EstimationParams,
}

impl Configurations {
    /// Loads and validates a configuration document.
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&text)
            .map_err(|e| Error::Config(format!("{}: {e}", path.display())))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.rectify.dst_height == 0 || self.rectify.dst_width == 0 {
            return Err(Error::InvalidParameter(
                "rectification target size must be positive".into(),
            ));
        }
        self.rectify.corners.to_quadrilateral()?;
        self.binarize.validate()?;
        self.filter.validate()?;
        self.estimation.validate()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn corners() -> CornerPoints {
        CornerPoints {
            upper_left: Point::new(10, 10),
            upper_right: Point::new(200, 12),
            lower_right: Point::new(198, 90),
            lower_left: Point::new(8, 88),
        }
    }

    fn config() -> Configurations {
        Configurations {
            rectify: RectifyParams {
                corners: corners(),
                dst_height: 100,
                dst_width: 300,
            },
            binarize: BinarizeParams::default(),
            filter: FilterParams::default(),
            estimation: EstimationParams::default(),
        }
    }

    #[test]
    fn default_config_validates() {
        config().validate().unwrap();
    }

    #[test]
    fn even_block_size_is_rejected() {
        let mut cfg = config();
        cfg.binarize.adaptive_block_size = 300;
        assert!(matches!(
            cfg.validate(),
            Err(Error::InvalidParameter(_))
        ));
    }

    #[test]
    fn block_size_must_exceed_kernel_sizes() {
        let mut cfg = config();
        cfg.binarize.adaptive_block_size = 11;
        cfg.binarize.gaussian_kernel_size = 15;
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn degenerate_corners_are_fatal() {
        let mut cfg = config();
        cfg.rectify.corners = CornerPoints {
            upper_left: Point::new(0, 0),
            upper_right: Point::new(10, 0),
            lower_right: Point::new(20, 0),
            lower_left: Point::new(30, 0),
        };
        assert!(matches!(cfg.validate(), Err(Error::InvalidGeometry(_))));
    }

    #[test]
    fn load_round_trips_through_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        let text = serde_json::to_string_pretty(&config()).unwrap();
        std::fs::write(&path, text).unwrap();

        let loaded = Configurations::load(&path).unwrap();
        assert_eq!(loaded.rectify.dst_width, 300);
        assert_eq!(loaded.rectify.corners.upper_left, Point::new(10, 10));
    }

    #[test]
    fn malformed_document_fails_before_processing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, "{ not json").unwrap();
        assert!(matches!(
            Configurations::load(&path),
            Err(Error::Config(_))
        ));
    }
}
