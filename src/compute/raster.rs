//! Integer line rasterization onto a clipping canvas.

use image::{Rgb, RgbImage};

/// Pixel buffer that drops writes outside its bounds.
///
/// Genotype-scaled coordinates routinely leave the canvas, so clipping is
/// silent: no panic, no wraparound.
pub struct Canvas {
    image: RgbImage,
}

impl Canvas {
    /// Create a canvas filled with `background`.
    pub fn new(width: u32, height: u32, background: [u8; 3]) -> Self {
        Self {
            image: RgbImage::from_pixel(width, height, Rgb(background)),
        }
    }

    /// Set one pixel. Out-of-range coordinates are ignored.
    #[inline]
    pub fn plot(&mut self, x: i64, y: i64, color: [u8; 3]) {
        let (width, height) = self.image.dimensions();
        if x < 0 || y < 0 || x >= i64::from(width) || y >= i64::from(height) {
            return;
        }
        self.image.put_pixel(x as u32, y as u32, Rgb(color));
    }

    /// Borrow the pixels.
    pub fn image(&self) -> &RgbImage {
        &self.image
    }

    /// Consume into the finished image.
    pub fn into_image(self) -> RgbImage {
        self.image
    }
}

/// Draw a Bresenham line from `from` to `to`, both endpoints included.
///
/// Steps along the 8-connected path, advancing on the dominant axis every
/// step and on the minor axis when the error term says so.
pub fn draw_line(canvas: &mut Canvas, from: (i64, i64), to: (i64, i64), color: [u8; 3]) {
    let (mut x, mut y) = from;
    let (x1, y1) = to;

    let dx = (x1 - x).abs();
    let dy = (y1 - y).abs();
    let sx = if x < x1 { 1 } else { -1 };
    let sy = if y < y1 { 1 } else { -1 };
    let mut err = dx - dy;

    loop {
        canvas.plot(x, y, color);
        if x == x1 && y == y1 {
            break;
        }
        let e2 = err * 2;
        if e2 > -dy {
            err -= dy;
            x += sx;
        }
        if e2 < dx {
            err += dx;
            y += sy;
        }
    }
}
