//! Perspective rectification of the display region.

use image::{GrayImage, Luma};
use imageproc::geometric_transformations::{Interpolation, Projection, warp_into};

use crate::error::{Error, Result};
use crate::models::Quadrilateral;

/// Projective transform mapping the display corners onto an axis-aligned
/// `width` x `height` rectangle with corners ((0,0),(w,0),(w,h),(0,h)).
///
/// Fails when no unique homography exists, i.e. the corner points are
/// collinear or coincident.
pub fn panel_projection(quad: &Quadrilateral, height: u32, width: u32) -> Result<Projection> {
    let src = quad.control_points();
    let (w, h) = (width as f32, height as f32);
    let dst = [(0.0, 0.0), (w, 0.0), (w, h), (0.0, h)];
    Projection::from_control_points(src, dst).ok_or_else(|| {
        Error::InvalidGeometry("corner points admit no projective transform".into())
    })
}

/// Resamples the quadrilateral region of `src` onto a `width` x `height`
/// rectangle. Pure: the source image is left untouched.
pub fn rectify(
    src: &GrayImage,
    quad: &Quadrilateral,
    height: u32,
    width: u32,
) -> Result<GrayImage> {
    if height == 0 || width == 0 {
        return Err(Error::InvalidParameter(
            "rectification target size must be positive".into(),
        ));
    }
    let projection = panel_projection(quad, height, width)?;
    let mut dst = GrayImage::new(width, height);
    warp_into(src, &projection, Interpolation::Bilinear, Luma([0u8]), &mut dst);
    Ok(dst)
}
