//! Genotype to raster rendering.
//!
//! The figure is a chain of mirrored strokes. Starting from the canvas
//! centre, each pair of shape genes `(gx, gy)` scaled by the length gene
//! gives an offset; a stroke is drawn from the pen to `pen + offset` and
//! another to `pen - offset`, then the pen moves to `pen + offset`.

use image::RgbImage;

use super::evolution::Genotype;
use super::raster::{Canvas, draw_line};
use crate::schema::CanvasConfig;

/// Render a genotype. Pure and integer-only: equal inputs give
/// bit-identical images.
pub fn render(genotype: &Genotype, canvas: &CanvasConfig) -> RgbImage {
    let mut target = Canvas::new(canvas.width, canvas.height, canvas.background);
    draw_biomorph(&mut target, genotype, canvas.center(), canvas.foreground);
    target.into_image()
}

/// Draw the strokes of `genotype` onto an existing canvas, pen starting at `origin`.
pub fn draw_biomorph(
    canvas: &mut Canvas,
    genotype: &Genotype,
    origin: (i64, i64),
    color: [u8; 3],
) {
    let length = i64::from(genotype.length());
    let (mut px, mut py) = origin;

    for pair in genotype.shape().chunks(2) {
        let gx = i64::from(pair[0]);
        // A trailing unpaired gene strokes horizontally
        let gy = pair.get(1).copied().map_or(0, i64::from);

        let forward = (px + length * gx, py + length * gy);
        let mirrored = (px - length * gx, py - length * gy);

        draw_line(canvas, (px, py), forward, color);
        draw_line(canvas, (px, py), mirrored, color);
        (px, py) = forward;
    }
}
