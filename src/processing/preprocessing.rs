use image::{DynamicImage, GrayImage, Luma, Rgb, RgbImage};
use imageproc::edges::canny;
use imageproc::filter::box_filter;

/// Edge length of the mean filter applied before grayscale conversion
pub const BLUR_WINDOW: u32 = 5;

/// Normalize any decoded pixel layout to 8-bit RGB
pub fn to_rgb(img: &DynamicImage) -> RgbImage {
    img.to_rgb8()
}

/// Box blur each color channel with a `window` x `window` mean filter
pub fn box_blur(img: &RgbImage, window: u32) -> RgbImage {
    let radius = window / 2;
    let (width, height) = img.dimensions();

    let channels: Vec<GrayImage> = (0..3)
        .map(|c| {
            let plane = GrayImage::from_fn(width, height, |x, y| Luma([img.get_pixel(x, y)[c]]));
            box_filter(&plane, radius, radius)
        })
        .collect();

    RgbImage::from_fn(width, height, |x, y| {
        Rgb([
            channels[0].get_pixel(x, y)[0],
            channels[1].get_pixel(x, y)[0],
            channels[2].get_pixel(x, y)[0],
        ])
    })
}

/// BT.601 luma weights
const RW: f64 = 0.299;
const GW: f64 = 0.587;
const BW: f64 = 0.114;

/// Convert an RGB image to grayscale: Y = 0.299 * R + 0.587 * G + 0.114 * B, rounded
pub fn to_grayscale(img: &RgbImage) -> GrayImage {
    let (width, height) = img.dimensions();
    GrayImage::from_fn(width, height, |x, y| {
        let [r, g, b] = img.get_pixel(x, y).0;
        let luma = RW * r as f64 + GW * g as f64 + BW * b as f64;
        Luma([luma.round().clamp(0.0, 255.0) as u8])
    })
}

/// Brightest value in a grayscale image (0 for an empty image)
pub fn max_intensity(img: &GrayImage) -> u8 {
    img.pixels().map(|p| p[0]).max().unwrap_or(0)
}

/// Inverted binary threshold: pixels strictly darker than `cutoff` become
/// `max_value`, everything else becomes 0
pub fn threshold_binary_inv(img: &GrayImage, cutoff: f32, max_value: u8) -> GrayImage {
    let mut out = img.clone();
    for pixel in out.pixels_mut() {
        *pixel = if (pixel[0] as f32) < cutoff {
            Luma([max_value])
        } else {
            Luma([0])
        };
    }
    out
}

/// Detect edges using Canny edge detector
pub fn detect_edges(img: &GrayImage, low_threshold: f32, high_threshold: f32) -> GrayImage {
    canny(img, low_threshold, high_threshold)
}
