use image::{GrayImage, Luma};
use meterscan::config::{
    BinarizeParams, Configurations, CornerPoints, EstimationParams, FilterParams, RectifyParams,
};
use meterscan::Point;

/// Synthetic 300x200 photograph of a 3-digit panel: three dark digit blobs
/// on a light background. Every segment of every digit is lit, so the panel
/// reads "888".
pub fn panel_image() -> GrayImage {
    let mut img = GrayImage::from_pixel(300, 200, Luma([200]));
    for x0 in [52u32, 120, 188] {
        for y in 45..155 {
            for x in x0..x0 + 60 {
                img.put_pixel(x, y, Luma([30]));
            }
        }
    }
    img
}

/// Configuration matching [`panel_image`]: the quadrilateral covers the full
/// frame and the rectification target keeps its size.
pub fn panel_config() -> Configurations {
    Configurations {
        rectify: RectifyParams {
            corners: CornerPoints {
                upper_left: Point::new(0, 0),
                upper_right: Point::new(299, 0),
                lower_right: Point::new(299, 199),
                lower_left: Point::new(0, 199),
            },
            dst_height: 200,
            dst_width: 300,
        },
        binarize: BinarizeParams {
            gaussian_kernel_size: 3,
            gaussian_sigma: 1.0,
            bilateral_window_size: 3,
            bilateral_sigma_color: 20.0,
            bilateral_sigma_spatial: 5.0,
            adaptive_block_size: 51,
            adaptive_constant: 3,
            closing_kernel_size: 3,
        },
        filter: FilterParams::default(),
        estimation: EstimationParams::default(),
    }
}
