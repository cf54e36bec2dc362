use image::{GrayImage, Luma, Rgb, RgbImage};
use imageproc::edges::canny;
use imageproc::filter::gaussian_blur_f32;
use imageproc::map::map_colors;
use imageproc::morphology::{Mask, grayscale_dilate};

/// Convert image to grayscale with BT.601 luma weights
pub fn to_grayscale(img: &RgbImage) -> GrayImage {
    map_colors(img, |Rgb([r, g, b])| Luma([bt601_luma(r, g, b)]))
}

/// `0.299 R + 0.587 G + 0.114 B` in 14-bit fixed point, rounded half up.
pub fn bt601_luma(r: u8, g: u8, b: u8) -> u8 {
    let y = (r as u32 * 4899 + g as u32 * 9617 + b as u32 * 1868 + (1 << 13)) >> 14;
    y.min(255) as u8
}

/// Apply Gaussian blur to reduce noise
pub fn apply_blur(img: &GrayImage, sigma: f32) -> GrayImage {
    gaussian_blur_f32(img, sigma)
}

/// Detect edges using Canny edge detector.
/// `canny` smooths with its own sigma 1.4 Gaussian first.
pub fn detect_edges(img: &GrayImage, low_threshold: f32, high_threshold: f32) -> GrayImage {
    canny(img, low_threshold, high_threshold)
}

/// Grow edges by one pixel with a 2x2 square, closing
/// single-pixel gaps between edge fragments.
pub fn dilate_edges(edges: &GrayImage) -> GrayImage {
    let kernel = GrayImage::from_pixel(2, 2, Luma([255u8]));
    let mask = Mask::from_image(&kernel, 1, 1);
    grayscale_dilate(edges, &mask)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Contour;

    #[test]
    fn luma_uses_bt601_weights() {
        assert_eq!(bt601_luma(0, 255, 0), 150);
        assert_eq!(bt601_luma(90, 140, 60), 116);
        assert_eq!(bt601_luma(255, 0, 0), 76);
        assert_eq!(bt601_luma(170, 170, 170), 170);
        assert_eq!(bt601_luma(255, 255, 255), 255);
    }

    #[test]
    fn olive_earbud_stays_under_earbud_brightness_limit() {
        let crop = RgbImage::from_pixel(12, 12, Rgb([90, 140, 60]));
        let gray = to_grayscale(&crop);
        assert_eq!(gray.get_pixel(5, 5)[0], 116);

        let contour = Contour {
            points: Vec::new(),
            min_x: 0,
            min_y: 0,
            max_x: 11,
            max_y: 11,
        };
        assert!(contour.average_brightness(&gray) <= 120.0);
    }
}
