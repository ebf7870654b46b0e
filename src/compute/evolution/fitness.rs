//! Pixel-difference fitness between a candidate raster and the target.
//!
//! The score is the mean absolute per-pixel channel difference: the sum of
//! `|Δr| + |Δg| + |Δb|` over all pixels divided by the pixel count. Lower is
//! better and zero means pixel-identical.

use image::RgbImage;

use crate::schema::CanvasConfig;

/// Largest possible score: every pixel differs by 255 in all three channels.
pub const MAX_SIMILARITY: f64 = 3.0 * 255.0;

/// Fitness errors.
#[derive(Debug, thiserror::Error)]
pub enum FitnessError {
    #[error("Image dimensions {actual:?} do not match expected {expected:?}")]
    DimensionMismatch {
        expected: (u32, u32),
        actual: (u32, u32),
    },
}

/// Mean absolute per-pixel channel difference between `a` and `b`.
pub fn similarity(a: &RgbImage, b: &RgbImage) -> Result<f64, FitnessError> {
    if a.dimensions() != b.dimensions() {
        return Err(FitnessError::DimensionMismatch {
            expected: a.dimensions(),
            actual: b.dimensions(),
        });
    }
    Ok(mean_abs_difference(a, b))
}

/// Caller guarantees equal dimensions.
fn mean_abs_difference(a: &RgbImage, b: &RgbImage) -> f64 {
    let pixels = a.width() as usize * a.height() as usize;
    if pixels == 0 {
        return 0.0;
    }

    let total: u64 = a
        .as_raw()
        .iter()
        .zip(b.as_raw())
        .map(|(x, y)| u64::from(x.abs_diff(*y)))
        .sum();

    total as f64 / pixels as f64
}

/// Scores candidates against a fixed target.
///
/// Construction checks the target against the canvas once, so scoring a
/// rendered candidate cannot fail afterwards.
pub struct FitnessEvaluator {
    target: RgbImage,
}

impl FitnessEvaluator {
    /// Create an evaluator for `target`, which must match the canvas size.
    pub fn new(target: RgbImage, canvas: &CanvasConfig) -> Result<Self, FitnessError> {
        let expected = (canvas.width, canvas.height);
        if target.dimensions() != expected {
            return Err(FitnessError::DimensionMismatch {
                expected,
                actual: target.dimensions(),
            });
        }
        Ok(Self { target })
    }

    /// The target image.
    pub fn target(&self) -> &RgbImage {
        &self.target
    }

    /// Score a candidate rendered on the evaluator's canvas.
    pub fn score(&self, candidate: &RgbImage) -> f64 {
        debug_assert_eq!(candidate.dimensions(), self.target.dimensions());
        mean_abs_difference(candidate, &self.target)
    }
}
