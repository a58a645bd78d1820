use image::GrayImage;
use imageproc::morphology::{
    Mask, grayscale_close, grayscale_dilate, grayscale_erode, grayscale_open,
};

use crate::error::{Error, Result};

/// Square, all-ones structuring element of odd edge length
pub struct SquareKernel {
    size: u32,
    mask: Mask,
}

impl SquareKernel {
    pub fn new(size: u32) -> Result<Self> {
        if size == 0 || size % 2 == 0 {
            return Err(Error::InvalidArgument(format!(
                "kernel size must be a positive odd number, got {size}"
            )));
        }
        let radius = u8::try_from(size / 2).map_err(|_| {
            Error::InvalidArgument(format!("kernel size {size} is too large (max 511)"))
        })?;
        Ok(Self {
            size,
            mask: Mask::square(radius),
        })
    }

    pub fn size(&self) -> u32 {
        self.size
    }

    pub fn dilate(&self, img: &GrayImage) -> GrayImage {
        grayscale_dilate(img, &self.mask)
    }

    pub fn erode(&self, img: &GrayImage) -> GrayImage {
        grayscale_erode(img, &self.mask)
    }

    /// Erosion followed by dilation
    pub fn open(&self, img: &GrayImage) -> GrayImage {
        grayscale_open(img, &self.mask)
    }

    /// Dilation followed by erosion
    pub fn close(&self, img: &GrayImage) -> GrayImage {
        grayscale_close(img, &self.mask)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Luma;

    fn dot(size: u32, at: (u32, u32)) -> GrayImage {
        let mut img = GrayImage::new(size, size);
        img.put_pixel(at.0, at.1, Luma([200]));
        img
    }

    #[test]
    fn rejects_even_and_zero_sizes() {
        assert!(SquareKernel::new(0).is_err());
        assert!(SquareKernel::new(4).is_err());
        assert!(SquareKernel::new(513).is_err());
        assert_eq!(SquareKernel::new(7).unwrap().size(), 7);
    }

    #[test]
    fn dilate_grows_a_dot_into_a_square() {
        let kernel = SquareKernel::new(3).unwrap();
        let out = kernel.dilate(&dot(7, (3, 3)));
        let lit = out.pixels().filter(|p| p[0] == 200).count();
        assert_eq!(lit, 9);
        assert_eq!(out.get_pixel(2, 2)[0], 200);
        assert_eq!(out.get_pixel(1, 1)[0], 0);
    }

    #[test]
    fn open_removes_specks_smaller_than_the_kernel() {
        let kernel = SquareKernel::new(3).unwrap();
        let out = kernel.open(&dot(7, (3, 3)));
        assert!(out.pixels().all(|p| p[0] == 0));
    }

    #[test]
    fn close_fills_pinholes() {
        let kernel = SquareKernel::new(3).unwrap();
        let mut img = GrayImage::from_pixel(9, 9, Luma([200]));
        img.put_pixel(4, 4, Luma([0]));
        let out = kernel.close(&img);
        assert!(out.pixels().all(|p| p[0] == 200));
    }
}
