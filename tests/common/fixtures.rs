#![allow(dead_code)]

use image::{DynamicImage, Rgb, RgbImage};
use tempfile::NamedTempFile;

pub const WHITE: Rgb<u8> = Rgb([255, 255, 255]);
pub const BLACK: Rgb<u8> = Rgb([0, 0, 0]);

/// Axis-aligned filled square: top-left corner and side length
#[derive(Clone, Copy)]
pub struct Square {
    pub x: u32,
    pub y: u32,
    pub side: u32,
}

impl Square {
    pub const fn new(x: u32, y: u32, side: u32) -> Self {
        Self { x, y, side }
    }

    pub fn area(&self) -> f64 {
        (self.side * self.side) as f64
    }

    fn contains(&self, x: u32, y: u32) -> bool {
        x >= self.x && x < self.x + self.side && y >= self.y && y < self.y + self.side
    }
}

/// Canvas of `background` with every square filled with `fill`
pub fn squares_image(size: u32, background: Rgb<u8>, fill: Rgb<u8>, squares: &[Square]) -> DynamicImage {
    let img = RgbImage::from_fn(size, size, |x, y| {
        if squares.iter().any(|s| s.contains(x, y)) {
            fill
        } else {
            background
        }
    });
    DynamicImage::ImageRgb8(img)
}

/// 100x100 black image with one 40x40 white square in the middle
pub fn white_square_on_black() -> DynamicImage {
    squares_image(100, BLACK, WHITE, &[Square::new(30, 30, 40)])
}

/// 100x100 white image with one 40x40 black square in the middle
pub fn black_square_on_white() -> DynamicImage {
    squares_image(100, WHITE, BLACK, &[Square::new(30, 30, 40)])
}

/// Smooth color gradient with some texture, 64x48
pub fn gradient_image() -> DynamicImage {
    let img = RgbImage::from_fn(64, 48, |x, y| {
        let r = (x * 255 / 64) as u8;
        let g = (y * 255 / 48) as u8;
        let b = ((x * y) % 256) as u8;
        Rgb([r, g, b])
    });
    DynamicImage::ImageRgb8(img)
}

/// Saves `image` as PNG in a temp file that is removed on drop
pub fn save_temp_png(image: &DynamicImage) -> NamedTempFile {
    let file = tempfile::Builder::new()
        .suffix(".png")
        .tempfile()
        .expect("Failed to create temp image file");
    image
        .save_with_format(file.path(), image::ImageFormat::Png)
        .expect("Failed to save test image");
    file
}
