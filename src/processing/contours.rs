//! Contour extraction and the digit-shape heuristic filter.

use image::GrayImage;
use imageproc::contours::find_contours;

use crate::config::FilterParams;
use crate::models::ContourRegion;

/// Extracts every outer and hole boundary from a binary mask.
pub fn extract_regions(mask: &GrayImage) -> Vec<ContourRegion> {
    find_contours::<i32>(mask)
        .into_iter()
        .filter_map(ContourRegion::from_contour)
        .collect()
}

/// Keeps regions that look like digit strokes. A region survives only if
/// every heuristic holds:
///
/// - taller than wide,
/// - bounding-box fill ratio above the threshold,
/// - bounding-box area relative to the image above the threshold,
/// - aspect strictly inside the configured open interval.
///
/// Order-preserving; a conjunctive filter with tunable thresholds, not a
/// classifier.
pub fn filter_digit_regions(
    regions: Vec<ContourRegion>,
    image_width: u32,
    image_height: u32,
    params: &FilterParams,
) -> Vec<ContourRegion> {
    regions
        .into_iter()
        .filter(|r| {
            r.is_taller_than_wide()
                && r.fill_ratio() > params.fill_ratio_thresh
                && r.image_ratio(image_width, image_height) > params.image_ratio_thresh
                && params.aspect_range.contains(r.aspect())
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Luma;

    /// Mask with a single filled rectangle.
    fn rect_mask(w: u32, h: u32, left: u32, top: u32, rw: u32, rh: u32) -> GrayImage {
        let mut mask = GrayImage::new(w, h);
        for y in top..top + rh {
            for x in left..left + rw {
                mask.put_pixel(x, y, Luma([255]));
            }
        }
        mask
    }

    #[test]
    fn digit_shaped_region_is_kept() {
        let mask = rect_mask(200, 100, 40, 20, 20, 60);
        let regions = extract_regions(&mask);
        assert!(!regions.is_empty());
        let kept = filter_digit_regions(regions, 200, 100, &FilterParams::default());
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].bbox.width(), 20);
        assert_eq!(kept[0].bbox.height(), 60);
    }

    #[test]
    fn square_region_fails_the_aspect_heuristic() {
        // 40x40: satisfies fill and size but is not taller than wide and
        // its aspect (1.0) is outside the open interval.
        let mask = rect_mask(200, 100, 40, 20, 40, 40);
        let regions = extract_regions(&mask);
        let kept = filter_digit_regions(regions, 200, 100, &FilterParams::default());
        assert!(kept.is_empty());
    }

    #[test]
    fn tiny_region_fails_the_image_ratio_heuristic() {
        // 2x5 satisfies shape heuristics but covers too little of the image.
        let mask = rect_mask(400, 300, 40, 20, 2, 5);
        let regions = extract_regions(&mask);
        let kept = filter_digit_regions(regions, 400, 300, &FilterParams::default());
        assert!(kept.is_empty());
    }

    #[test]
    fn over_tall_region_fails_the_upper_aspect_bound() {
        // Aspect 10 exceeds the default open interval (1.3, 6).
        let mask = rect_mask(200, 100, 40, 5, 9, 90);
        let regions = extract_regions(&mask);
        let kept = filter_digit_regions(regions, 200, 100, &FilterParams::default());
        assert!(kept.is_empty());
    }

    #[test]
    fn hole_boundaries_are_extracted() {
        use imageproc::contours::BorderType;
        // Ring: filled rectangle with a hollow interior.
        let mut mask = rect_mask(100, 100, 20, 10, 40, 70);
        for y in 25..65 {
            for x in 30..50 {
                mask.put_pixel(x, y, Luma([0]));
            }
        }
        let regions = extract_regions(&mask);
        assert!(regions.iter().any(|r| r.border == BorderType::Outer));
        assert!(regions.iter().any(|r| r.border == BorderType::Hole));
    }
}
