//! Fit-to-cover placement of the source image inside the canvas.

use glam::Vec2;

/// Where the scaled source image sits on the canvas.
///
/// The rectangle covers the canvas on at least one axis and is centred on the
/// other, so `origin` is zero or negative on each axis.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Layout {
    /// Top-left corner of the fitted image in canvas pixels.
    pub origin: Vec2,
    /// Fitted image width and height in canvas pixels.
    pub size: Vec2,
}

impl Layout {
    /// Scale a `source_width` x `source_height` image to cover `canvas`,
    /// preserving aspect ratio and centring the overflow.
    ///
    /// Returns `None` when either rectangle has a zero (or non-finite) side.
    pub fn fit_to_cover(source_width: u32, source_height: u32, canvas: Vec2) -> Option<Self> {
        if source_width == 0 || source_height == 0 {
            return None;
        }
        if !(canvas.x > 0.0 && canvas.y > 0.0 && canvas.is_finite()) {
            return None;
        }

        let image_ratio = source_width as f32 / source_height as f32;
        let canvas_ratio = canvas.x / canvas.y;

        let size = if image_ratio > canvas_ratio {
            Vec2::new(canvas.y * image_ratio, canvas.y)
        } else {
            Vec2::new(canvas.x, canvas.x / image_ratio)
        };

        Some(Self {
            origin: (canvas - size) * 0.5,
            size,
        })
    }

    /// Map a coordinate inside the fitted rectangle to canvas space.
    #[inline]
    pub fn to_canvas(&self, local: Vec2) -> Vec2 {
        self.origin + local
    }

    /// Bottom-right corner in canvas pixels.
    #[inline]
    pub fn max(&self) -> Vec2 {
        self.origin + self.size
    }

    /// Whether a canvas point lies inside the fitted image.
    pub fn contains(&self, point: Vec2) -> bool {
        let max = self.max();
        point.x >= self.origin.x && point.y >= self.origin.y && point.x < max.x && point.y < max.y
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_cover(layout: Layout, canvas: Vec2) {
        let covers_x = (layout.size.x - canvas.x).abs() < 1e-3 && layout.origin.x.abs() < 1e-3;
        let covers_y = (layout.size.y - canvas.y).abs() < 1e-3 && layout.origin.y.abs() < 1e-3;
        assert!(covers_x || covers_y, "layout {:?} does not cover {:?}", layout, canvas);
        assert!(layout.size.x >= canvas.x - 1e-3);
        assert!(layout.size.y >= canvas.y - 1e-3);
        // Centred on both axes
        let centre = layout.origin + layout.size * 0.5;
        assert!((centre - canvas * 0.5).length() < 1e-3);
    }

    #[test]
    fn test_square_on_square() {
        let layout = Layout::fit_to_cover(2, 2, Vec2::new(100.0, 100.0)).unwrap();
        assert_eq!(layout.origin, Vec2::ZERO);
        assert_eq!(layout.size, Vec2::new(100.0, 100.0));
    }

    #[test]
    fn test_wide_image_overflows_horizontally() {
        let canvas = Vec2::new(800.0, 600.0);
        let layout = Layout::fit_to_cover(1920, 1080, canvas).unwrap();
        assert_eq!(layout.size.y, 600.0);
        assert!(layout.origin.x < 0.0);
        assert_cover(layout, canvas);
    }

    #[test]
    fn test_tall_image_overflows_vertically() {
        let canvas = Vec2::new(800.0, 600.0);
        let layout = Layout::fit_to_cover(300, 2000, canvas).unwrap();
        assert_eq!(layout.size.x, 800.0);
        assert!(layout.origin.y < 0.0);
        assert_cover(layout, canvas);
    }

    #[test]
    fn test_degenerate_aspect_ratios() {
        for (w, h) in [(1, 4000), (4000, 1), (7, 3), (1, 1)] {
            for canvas in [Vec2::new(1280.0, 720.0), Vec2::new(50.0, 900.0)] {
                assert_cover(Layout::fit_to_cover(w, h, canvas).unwrap(), canvas);
            }
        }
    }

    #[test]
    fn test_zero_dimensions() {
        assert!(Layout::fit_to_cover(0, 10, Vec2::new(100.0, 100.0)).is_none());
        assert!(Layout::fit_to_cover(10, 10, Vec2::new(0.0, 100.0)).is_none());
    }

    #[test]
    fn test_contains() {
        let layout = Layout::fit_to_cover(4, 2, Vec2::new(100.0, 100.0)).unwrap();
        assert!(layout.contains(Vec2::new(50.0, 50.0)));
        assert!(!layout.contains(Vec2::new(50.0, 101.0)));
    }
}
