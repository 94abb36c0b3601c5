//! Pixel sources the sampler reads colours from.
//!
//! Anything that can report its size and an RGB value per pixel can seed a
//! particle field. [`PixelBuffer`] wraps a flat RGB or RGBA byte buffer
//! indexed by `(x + y * width) * stride`; decoded `image` buffers work
//! directly.
//!
//! # Example
//!
//! ```ignore
//! use pixelbeat::source::PixelBuffer;
//!
//! // 2x2: red, green / blue, white
//! let data = vec![
//!     255, 0, 0, 255,   0, 255, 0, 255,
//!     0, 0, 255, 255,   255, 255, 255, 255,
//! ];
//! let image = PixelBuffer::from_rgba(data, 2, 2)?;
//! ```

use crate::error::SourceError;
use image::{Rgb, RgbImage, Rgba, RgbaImage};
use std::path::Path;

/// Read access to a decoded raster image.
///
/// Coordinates passed to [`PixelSource::rgb`] are always inside
/// `0..width` x `0..height`.
pub trait PixelSource {
    /// Image width in pixels.
    fn width(&self) -> u32;

    /// Image height in pixels.
    fn height(&self) -> u32;

    /// RGB value at `(x, y)`. Any alpha channel is ignored.
    fn rgb(&self, x: u32, y: u32) -> [u8; 3];

    /// Whether the image has no pixels to sample.
    fn is_empty(&self) -> bool {
        self.width() == 0 || self.height() == 0
    }
}

impl<T: PixelSource + ?Sized> PixelSource for &T {
    fn width(&self) -> u32 {
        (**self).width()
    }

    fn height(&self) -> u32 {
        (**self).height()
    }

    fn rgb(&self, x: u32, y: u32) -> [u8; 3] {
        (**self).rgb(x, y)
    }
}

/// Flat pixel buffer with 3 (RGB) or 4 (RGBA) bytes per pixel.
#[derive(Debug, Clone, PartialEq)]
pub struct PixelBuffer {
    data: Vec<u8>,
    width: u32,
    height: u32,
    stride: usize,
}

impl PixelBuffer {
    /// Wrap raw bytes with the given channel stride.
    pub fn from_raw(data: Vec<u8>, width: u32, height: u32, stride: usize) -> Result<Self, SourceError> {
        if stride != 3 && stride != 4 {
            return Err(SourceError::UnsupportedStride(stride));
        }
        let expected = width as usize * height as usize * stride;
        if data.len() != expected {
            return Err(SourceError::SizeMismatch {
                expected,
                actual: data.len(),
            });
        }
        Ok(Self {
            data,
            width,
            height,
            stride,
        })
    }

    /// Wrap raw RGBA data (4 bytes per pixel).
    pub fn from_rgba(data: Vec<u8>, width: u32, height: u32) -> Result<Self, SourceError> {
        Self::from_raw(data, width, height, 4)
    }

    /// Wrap raw RGB data (3 bytes per pixel).
    pub fn from_rgb(data: Vec<u8>, width: u32, height: u32) -> Result<Self, SourceError> {
        Self::from_raw(data, width, height, 3)
    }

    /// Decode an image file (PNG or JPEG) into an RGBA buffer.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, SourceError> {
        let bytes = std::fs::read(path.as_ref())?;
        let img = image::load_from_memory(&bytes)?.into_rgba8();
        let (width, height) = img.dimensions();
        Self::from_rgba(img.into_raw(), width, height)
    }

    /// A `width` x `height` image of a single colour.
    pub fn solid(width: u32, height: u32, rgb: [u8; 3]) -> Self {
        let data = rgb
            .iter()
            .copied()
            .cycle()
            .take(width as usize * height as usize * 3)
            .collect();
        Self {
            data,
            width,
            height,
            stride: 3,
        }
    }

    /// Checkerboard of two colours with square cells of `cell_size` pixels.
    pub fn checkerboard(size: u32, cell_size: u32, color1: [u8; 3], color2: [u8; 3]) -> Self {
        let cell_size = cell_size.max(1);
        let mut data = Vec::with_capacity((size * size * 3) as usize);
        for y in 0..size {
            for x in 0..size {
                let color = if (x / cell_size + y / cell_size) % 2 == 0 { color1 } else { color2 };
                data.extend_from_slice(&color);
            }
        }
        Self {
            data,
            width: size,
            height: size,
            stride: 3,
        }
    }

    /// Bytes per pixel.
    pub fn stride(&self) -> usize {
        self.stride
    }

    /// Raw pixel bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }
}

impl PixelSource for PixelBuffer {
    fn width(&self) -> u32 {
        self.width
    }

    fn height(&self) -> u32 {
        self.height
    }

    #[inline]
    fn rgb(&self, x: u32, y: u32) -> [u8; 3] {
        let index = (x as usize + y as usize * self.width as usize) * self.stride;
        [self.data[index], self.data[index + 1], self.data[index + 2]]
    }
}

impl PixelSource for RgbaImage {
    fn width(&self) -> u32 {
        self.dimensions().0
    }

    fn height(&self) -> u32 {
        self.dimensions().1
    }

    fn rgb(&self, x: u32, y: u32) -> [u8; 3] {
        let Rgba([r, g, b, _]) = *self.get_pixel(x, y);
        [r, g, b]
    }
}

impl PixelSource for RgbImage {
    fn width(&self) -> u32 {
        self.dimensions().0
    }

    fn height(&self) -> u32 {
        self.dimensions().1
    }

    fn rgb(&self, x: u32, y: u32) -> [u8; 3] {
        let Rgb(rgb) = *self.get_pixel(x, y);
        rgb
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rgba_indexing_skips_alpha() {
        let data = vec![
            1, 2, 3, 255, 4, 5, 6, 255, //
            7, 8, 9, 255, 10, 11, 12, 0,
        ];
        let buf = PixelBuffer::from_rgba(data, 2, 2).unwrap();
        assert_eq!(buf.rgb(0, 0), [1, 2, 3]);
        assert_eq!(buf.rgb(1, 0), [4, 5, 6]);
        assert_eq!(buf.rgb(0, 1), [7, 8, 9]);
        assert_eq!(buf.rgb(1, 1), [10, 11, 12]);
    }

    #[test]
    fn test_rgb_stride() {
        let buf = PixelBuffer::from_rgb(vec![9, 8, 7, 6, 5, 4], 2, 1).unwrap();
        assert_eq!(buf.stride(), 3);
        assert_eq!(buf.rgb(1, 0), [6, 5, 4]);
    }

    #[test]
    fn test_size_mismatch() {
        let err = PixelBuffer::from_rgba(vec![0; 15], 2, 2).unwrap_err();
        assert!(matches!(err, SourceError::SizeMismatch { expected: 16, actual: 15 }));
        assert!(matches!(
            PixelBuffer::from_raw(vec![0; 4], 2, 1, 2),
            Err(SourceError::UnsupportedStride(2))
        ));
    }

    #[test]
    fn test_empty_source() {
        let buf = PixelBuffer::from_rgba(Vec::new(), 0, 0).unwrap();
        assert!(buf.is_empty());
        assert!(!PixelBuffer::solid(1, 1, [0, 0, 0]).is_empty());
    }

    #[test]
    fn test_checkerboard() {
        let board = PixelBuffer::checkerboard(4, 2, [255, 255, 255], [0, 0, 0]);
        assert_eq!(board.rgb(0, 0), [255, 255, 255]);
        assert_eq!(board.rgb(2, 0), [0, 0, 0]);
        assert_eq!(board.rgb(2, 2), [255, 255, 255]);
    }

    #[test]
    fn test_image_buffers() {
        let mut img = RgbaImage::new(3, 2);
        img.put_pixel(2, 1, Rgba([10, 20, 30, 40]));
        assert_eq!(PixelSource::width(&img), 3);
        assert_eq!(PixelSource::rgb(&img, 2, 1), [10, 20, 30]);

        let rgb = RgbImage::from_pixel(1, 1, Rgb([5, 6, 7]));
        assert_eq!(PixelSource::rgb(&rgb, 0, 0), [5, 6, 7]);
    }
}
