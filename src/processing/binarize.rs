//! Binarization of the rectified display image.
//!
//! Gaussian smoothing, edge-preserving (bilateral) smoothing, inverted
//! adaptive mean thresholding, then morphological closing to bridge small
//! gaps inside a stroke. Deterministic for identical input and parameters.

use image::GrayImage;
use imageproc::distance_transform::Norm;
use imageproc::filter::{bilateral_filter, separable_filter_equal};
use imageproc::morphology::close;

use crate::config::BinarizeParams;
use crate::error::Result;

/// Produces a binary mask of the rectified grayscale image: 255 where a
/// pixel is darker than its local neighbourhood mean by more than the
/// configured constant, 0 elsewhere.
pub fn binarize(img: &GrayImage, params: &BinarizeParams) -> Result<GrayImage> {
    params.validate()?;

    let kernel = gaussian_kernel(params.gaussian_kernel_size, params.gaussian_sigma);
    let blurred = separable_filter_equal(img, &kernel);
    let smoothed = bilateral_filter(
        &blurred,
        params.bilateral_window_size,
        params.bilateral_sigma_color,
        params.bilateral_sigma_spatial,
    );
    let mask = adaptive_threshold_inv(
        &smoothed,
        params.adaptive_block_size,
        params.adaptive_constant,
    );

    let radius = (params.closing_kernel_size / 2) as u8;
    if radius == 0 {
        Ok(mask)
    } else {
        Ok(close(&mask, Norm::LInf, radius))
    }
}

/// Normalised 1-D Gaussian kernel of the given odd size.
fn gaussian_kernel(size: u32, sigma: f32) -> Vec<f32> {
    let half = (size / 2) as i32;
    let mut kernel: Vec<f32> = (-half..=half)
        .map(|i| (-(i * i) as f32 / (2.0 * sigma * sigma)).exp())
        .collect();
    let sum: f32 = kernel.iter().sum();
    for v in &mut kernel {
        *v /= sum;
    }
    kernel
}

/// Local-mean adaptive threshold with inverted polarity.
///
/// Uses a summed-area table so the per-pixel neighbourhood mean is O(1).
fn adaptive_threshold_inv(img: &GrayImage, block_size: u32, constant: i32) -> GrayImage {
    let (width, height) = img.dimensions();
    let radius = block_size / 2;
    let integral = integral_image(img);
    let stride = (width + 1) as usize;

    let mut out = GrayImage::new(width, height);
    for y in 0..height {
        let y1 = y.saturating_sub(radius) as usize;
        let y2 = ((y + radius + 1).min(height)) as usize;
        for x in 0..width {
            let x1 = x.saturating_sub(radius) as usize;
            let x2 = ((x + radius + 1).min(width)) as usize;

            let area = ((x2 - x1) * (y2 - y1)) as f64;
            let sum = integral[y2 * stride + x2] as f64
                - integral[y1 * stride + x2] as f64
                - integral[y2 * stride + x1] as f64
                + integral[y1 * stride + x1] as f64;
            let mean = sum / area;

            let pixel = img.get_pixel(x, y)[0] as f64;
            if pixel < mean - constant as f64 {
                out.put_pixel(x, y, image::Luma([255]));
            }
        }
    }
    out
}

/// Summed-area table with a zero-padded first row and column:
/// `integral[(y+1) * (w+1) + (x+1)]` holds the sum over `[0..=x, 0..=y]`.
fn integral_image(img: &GrayImage) -> Vec<u64> {
    let (w, h) = img.dimensions();
    let stride = (w + 1) as usize;
    let mut table = vec![0u64; stride * (h + 1) as usize];

    for y in 0..h {
        let mut row_sum = 0u64;
        for x in 0..w {
            row_sum += img.get_pixel(x, y)[0] as u64;
            let idx = (y + 1) as usize * stride + (x + 1) as usize;
            table[idx] = row_sum + table[y as usize * stride + (x + 1) as usize];
        }
    }
    table
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use image::Luma;

    fn params() -> BinarizeParams {
        BinarizeParams {
            gaussian_kernel_size: 3,
            gaussian_sigma: 1.0,
            bilateral_window_size: 3,
            bilateral_sigma_color: 20.0,
            bilateral_sigma_spatial: 5.0,
            adaptive_block_size: 31,
            adaptive_constant: 3,
            closing_kernel_size: 3,
        }
    }

    /// Dark 12x40 bar on a light background.
    fn bar_image() -> GrayImage {
        let mut img = GrayImage::from_pixel(100, 80, Luma([200]));
        for y in 20..60 {
            for x in 44..56 {
                img.put_pixel(x, y, Luma([30]));
            }
        }
        img
    }

    #[test]
    fn dark_stroke_becomes_foreground() {
        let mask = binarize(&bar_image(), &params()).unwrap();
        assert_eq!(mask.get_pixel(50, 40)[0], 255);
        assert_eq!(mask.get_pixel(5, 5)[0], 0);
    }

    #[test]
    fn identical_input_gives_identical_mask() {
        let img = bar_image();
        let a = binarize(&img, &params()).unwrap();
        let b = binarize(&img, &params()).unwrap();
        assert_eq!(a.as_raw(), b.as_raw());
    }

    #[test]
    fn undersized_block_is_rejected() {
        let mut p = params();
        p.adaptive_block_size = 3;
        p.gaussian_kernel_size = 5;
        assert!(matches!(
            binarize(&bar_image(), &p),
            Err(Error::InvalidParameter(_))
        ));
    }

    #[test]
    fn gaussian_kernel_is_normalised() {
        let kernel = gaussian_kernel(15, 2.0);
        assert_eq!(kernel.len(), 15);
        let sum: f32 = kernel.iter().sum();
        assert!((sum - 1.0).abs() < 1e-5);
        // Symmetric around the centre tap.
        assert!((kernel[0] - kernel[14]).abs() < 1e-6);
    }

    #[test]
    fn integral_image_total_matches_pixel_sum() {
        let img = bar_image();
        let integral = integral_image(&img);
        let expected: u64 = img.pixels().map(|p| p[0] as u64).sum();
        assert_eq!(*integral.last().unwrap(), expected);
    }
}
