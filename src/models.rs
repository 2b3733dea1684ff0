use image::GrayImage;
use imageproc::contours::{BorderType, Contour};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// An integer pixel coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

impl From<(i32, i32)> for Point {
    fn from((x, y): (i32, i32)) -> Self {
        Self { x, y }
    }
}

/// Four corner points of the display region, clockwise from the upper left.
///
/// The canonical representation is the ordered point array; named-corner
/// construction is a boundary conversion over it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Quadrilateral {
    corners: [Point; 4],
}

impl Quadrilateral {
    /// Builds a quadrilateral from points ordered clockwise from the upper
    /// left. Fails if the enclosed area is degenerate.
    pub fn new(corners: [Point; 4]) -> Result<Self> {
        let area = shoelace_area(&corners);
        if area < 1.0 {
            return Err(Error::InvalidGeometry(format!(
                "corner points enclose a degenerate area ({area:.2})"
            )));
        }
        Ok(Self { corners })
    }

    /// Named-corner constructor for callers holding labelled points.
    pub fn from_corners(
        upper_left: Point,
        upper_right: Point,
        lower_right: Point,
        lower_left: Point,
    ) -> Result<Self> {
        Self::new([upper_left, upper_right, lower_right, lower_left])
    }

    pub fn corners(&self) -> [Point; 4] {
        self.corners
    }

    /// Corner points as `(x, y)` floats, in the order expected by
    /// `Projection::from_control_points`.
    pub fn control_points(&self) -> [(f32, f32); 4] {
        self.corners.map(|p| (p.x as f32, p.y as f32))
    }
}

fn shoelace_area(corners: &[Point; 4]) -> f64 {
    let mut doubled: i64 = 0;
    for i in 0..4 {
        let a = corners[i];
        let b = corners[(i + 1) % 4];
        doubled += a.x as i64 * b.y as i64 - b.x as i64 * a.y as i64;
    }
    doubled.abs() as f64 / 2.0
}

/// Inclusive pixel extent of a region within an image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoundingBox {
    pub left: u32,
    pub right: u32,
    pub top: u32,
    pub bottom: u32,
}

impl BoundingBox {
    /// Extent of all non-zero pixels, or `None` for an all-zero image.
    pub fn of_nonzero(img: &GrayImage) -> Option<Self> {
        let mut bbox: Option<Self> = None;
        for (x, y, pixel) in img.enumerate_pixels() {
            if pixel[0] == 0 {
                continue;
            }
            bbox = Some(match bbox {
                None => Self { left: x, right: x, top: y, bottom: y },
                Some(b) => Self {
                    left: b.left.min(x),
                    right: b.right.max(x),
                    top: b.top.min(y),
                    bottom: b.bottom.max(y),
                },
            });
        }
        bbox
    }

    pub fn width(&self) -> u32 {
        self.right - self.left + 1
    }

    pub fn height(&self) -> u32 {
        self.bottom - self.top + 1
    }

    pub fn area(&self) -> f64 {
        self.width() as f64 * self.height() as f64
    }
}

/// One connected foreground boundary with its derived geometry.
///
/// Outer borders and hole borders are both kept: a closed glyph such as "0"
/// produces one of each, and both describe digit-shaped regions.
#[derive(Debug, Clone)]
pub struct ContourRegion {
    pub points: Vec<imageproc::point::Point<i32>>,
    pub border: BorderType,
    pub bbox: BoundingBox,
    /// Absolute area enclosed by the boundary polyline.
    pub area: f64,
}

impl ContourRegion {
    /// Derives geometry from an extracted contour. Returns `None` for an
    /// empty boundary.
    pub fn from_contour(contour: Contour<i32>) -> Option<Self> {
        let points = contour.points;
        let first = *points.first()?;

        let (mut min_x, mut max_x) = (first.x, first.x);
        let (mut min_y, mut max_y) = (first.y, first.y);
        let mut doubled: i64 = 0;
        for i in 0..points.len() {
            let a = points[i];
            let b = points[(i + 1) % points.len()];
            doubled += a.x as i64 * b.y as i64 - b.x as i64 * a.y as i64;
            min_x = min_x.min(a.x);
            max_x = max_x.max(a.x);
            min_y = min_y.min(a.y);
            max_y = max_y.max(a.y);
        }

        Some(Self {
            points,
            border: contour.border_type,
            bbox: BoundingBox {
                left: min_x.max(0) as u32,
                right: max_x.max(0) as u32,
                top: min_y.max(0) as u32,
                bottom: max_y.max(0) as u32,
            },
            area: doubled.abs() as f64 / 2.0,
        })
    }

    pub fn is_taller_than_wide(&self) -> bool {
        self.bbox.height() > self.bbox.width()
    }

    /// Ratio of longer to shorter bounding-box side, always >= 1.
    pub fn aspect(&self) -> f64 {
        let w = self.bbox.width() as f64;
        let h = self.bbox.height() as f64;
        w.max(h) / w.min(h)
    }

    /// Fraction of the bounding box covered by the enclosed area.
    pub fn fill_ratio(&self) -> f64 {
        self.area / self.bbox.area()
    }

    /// Bounding-box area relative to the full image area.
    pub fn image_ratio(&self, image_width: u32, image_height: u32) -> f64 {
        self.bbox.area() / (image_width as f64 * image_height as f64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Luma;

    #[test]
    fn quadrilateral_rejects_collinear_points() {
        let result = Quadrilateral::new([
            Point::new(0, 0),
            Point::new(10, 0),
            Point::new(20, 0),
            Point::new(30, 0),
        ]);
        assert!(matches!(result, Err(Error::InvalidGeometry(_))));
    }

    #[test]
    fn quadrilateral_accepts_rectangle() {
        let quad = Quadrilateral::from_corners(
            Point::new(0, 0),
            Point::new(100, 0),
            Point::new(100, 50),
            Point::new(0, 50),
        )
        .unwrap();
        assert_eq!(quad.corners()[2], Point::new(100, 50));
    }

    #[test]
    fn bounding_box_of_blank_image_is_none() {
        let img = GrayImage::new(20, 20);
        assert!(BoundingBox::of_nonzero(&img).is_none());
    }

    #[test]
    fn bounding_box_covers_nonzero_extent() {
        let mut img = GrayImage::new(20, 20);
        img.put_pixel(3, 4, Luma([255]));
        img.put_pixel(10, 15, Luma([1]));
        let bbox = BoundingBox::of_nonzero(&img).unwrap();
        assert_eq!((bbox.left, bbox.right, bbox.top, bbox.bottom), (3, 10, 4, 15));
        assert_eq!(bbox.width(), 8);
        assert_eq!(bbox.height(), 12);
    }

    #[test]
    fn contour_region_geometry() {
        use imageproc::point::Point as IPoint;
        let contour = Contour {
            points: vec![
                IPoint::new(0, 0),
                IPoint::new(9, 0),
                IPoint::new(9, 19),
                IPoint::new(0, 19),
            ],
            border_type: BorderType::Outer,
            parent: None,
        };
        let region = ContourRegion::from_contour(contour).unwrap();
        assert!(region.is_taller_than_wide());
        assert_eq!(region.bbox.width(), 10);
        assert_eq!(region.bbox.height(), 20);
        assert!((region.aspect() - 2.0).abs() < 1e-9);
        // Corner polygon spans 9x19 of the 10x20 box.
        assert!(region.fill_ratio() > 0.8);
    }
}
