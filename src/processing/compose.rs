//! Composition of surviving contours into a clean digit-block image.

use image::{GrayImage, Luma};
use imageproc::drawing::draw_polygon_mut;

use crate::error::{Error, Result};
use crate::models::{BoundingBox, ContourRegion};

/// Renders every surviving contour as a filled silhouette on a black canvas
/// of the rectified image size, trims the empty margins, and re-pads with a
/// symmetric border so the decoder has sampling margin.
///
/// Filling discards interior noise and stroke gaps that survived closing.
/// Zero surviving contours is an error: an empty bounding box must never be
/// returned silently.
pub fn compose(
    regions: &[ContourRegion],
    canvas_width: u32,
    canvas_height: u32,
    repad: bool,
) -> Result<GrayImage> {
    if regions.is_empty() {
        return Err(Error::EmptyRegion);
    }

    let mut canvas = GrayImage::new(canvas_width, canvas_height);
    for region in regions {
        let mut poly = region.points.clone();
        // draw_polygon_mut requires an open polyline.
        if poly.len() > 1 && poly.first() == poly.last() {
            poly.pop();
        }
        draw_polygon_mut(&mut canvas, &poly, Luma([255u8]));
    }

    let cropped = trim_margins(&canvas)?;
    if repad {
        Ok(pad_image(&cropped, None))
    } else {
        Ok(cropped)
    }
}

/// Crops an image to the inclusive bounding box of its non-zero pixels.
pub fn trim_margins(img: &GrayImage) -> Result<GrayImage> {
    let bbox = BoundingBox::of_nonzero(img).ok_or(Error::EmptyRegion)?;
    Ok(image::imageops::crop_imm(img, bbox.left, bbox.top, bbox.width(), bbox.height())
        .to_image())
}

/// Adds a symmetric black border. When `border` is `None` each side gets 5%
/// of the corresponding cropped dimension.
pub fn pad_image(img: &GrayImage, border: Option<(u32, u32)>) -> GrayImage {
    let (w, h) = img.dimensions();
    let (pad_h, pad_w) = border.unwrap_or((h / 20, w / 20));
    let mut canvas = GrayImage::new(w + 2 * pad_w, h + 2 * pad_h);
    image::imageops::overlay(&mut canvas, img, pad_w as i64, pad_h as i64);
    canvas
}
