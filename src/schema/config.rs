//! Configuration types for canvas and genotype parameters.

use serde::{Deserialize, Serialize};

/// An RGB colour triple.
pub type Rgb = [u8; 3];

fn default_width() -> u32 {
    150
}
fn default_height() -> u32 {
    150
}
fn default_background() -> Rgb {
    [255, 255, 255]
}
fn default_foreground() -> Rgb {
    [0, 0, 0]
}

/// Canvas that genotypes are rendered onto.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CanvasConfig {
    /// Canvas width in pixels.
    #[serde(default = "default_width")]
    pub width: u32,
    /// Canvas height in pixels.
    #[serde(default = "default_height")]
    pub height: u32,
    /// Fill colour of a blank canvas.
    #[serde(default = "default_background")]
    pub background: Rgb,
    /// Colour of the biomorph strokes.
    #[serde(default = "default_foreground")]
    pub foreground: Rgb,
}

impl Default for CanvasConfig {
    fn default() -> Self {
        Self {
            width: default_width(),
            height: default_height(),
            background: default_background(),
            foreground: default_foreground(),
        }
    }
}

impl CanvasConfig {
    /// Pen start position (canvas centre).
    #[inline]
    pub fn center(&self) -> (i64, i64) {
        (i64::from(self.width / 2), i64::from(self.height / 2))
    }

    /// Validate canvas parameters.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.width == 0 || self.height == 0 {
            return Err(ConfigError::InvalidDimensions);
        }
        Ok(())
    }
}

/// Largest distance, in pixels, the pen may travel from the canvas centre.
///
/// Every plotted step of every stroke is walked, on canvas or not, so render
/// time grows with this and stroke coordinates must stay well inside `i64`.
pub const MAX_REACH: u64 = 1 << 16;

fn default_shape_genes() -> usize {
    15
}
fn default_shape_bounds() -> (i32, i32) {
    (-9, 9)
}
fn default_length_bounds() -> (i32, i32) {
    (2, 12)
}

/// Gene count and value bounds for genotypes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenomeConstraints {
    /// Number of shape genes (the length gene comes on top of these).
    #[serde(default = "default_shape_genes")]
    pub shape_genes: usize,
    /// Inclusive bounds for every shape gene.
    #[serde(default = "default_shape_bounds")]
    pub shape_bounds: (i32, i32),
    /// Inclusive bounds for the length gene.
    #[serde(default = "default_length_bounds")]
    pub length_bounds: (i32, i32),
}

impl Default for GenomeConstraints {
    fn default() -> Self {
        Self {
            shape_genes: default_shape_genes(),
            shape_bounds: default_shape_bounds(),
            length_bounds: default_length_bounds(),
        }
    }
}

impl GenomeConstraints {
    /// Total genotype length: shape genes plus the length gene.
    #[inline]
    pub fn gene_count(&self) -> usize {
        self.shape_genes + 1
    }

    /// Bounds of the gene at flat index `index`.
    #[inline]
    pub fn bounds_of(&self, index: usize) -> (i32, i32) {
        if index < self.shape_genes {
            self.shape_bounds
        } else {
            self.length_bounds
        }
    }

    /// Upper bound on the pen's distance from the start point along either
    /// axis: largest shape magnitude times largest length, once per gene pair.
    pub fn reach(&self) -> u64 {
        let shape = self.shape_bounds.0.unsigned_abs().max(self.shape_bounds.1.unsigned_abs());
        let length = self.length_bounds.0.unsigned_abs().max(self.length_bounds.1.unsigned_abs());
        let pairs = self.shape_genes.div_ceil(2) as u64;
        u64::from(shape)
            .saturating_mul(u64::from(length))
            .saturating_mul(pairs)
    }

    /// Validate gene count and bounds.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.shape_genes == 0 {
            return Err(ConfigError::NoShapeGenes);
        }
        let check = |bounds: (i32, i32), name: &'static str| {
            if bounds.0 > bounds.1 {
                Err(ConfigError::InvalidBounds {
                    name,
                    min: bounds.0,
                    max: bounds.1,
                })
            } else {
                Ok(())
            }
        };
        check(self.shape_bounds, "shape")?;
        check(self.length_bounds, "length")?;

        let reach = self.reach();
        if reach > MAX_REACH {
            return Err(ConfigError::ReachTooLarge {
                reach,
                max: MAX_REACH,
            });
        }
        Ok(())
    }
}

/// Configuration validation errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Canvas dimensions (width, height) must be non-zero")]
    InvalidDimensions,
    #[error("Genotype needs at least one shape gene")]
    NoShapeGenes,
    #[error("Invalid {name} gene bounds: min ({min}) > max ({max})")]
    InvalidBounds {
        name: &'static str,
        min: i32,
        max: i32,
    },
    #[error("Gene bounds let strokes reach {reach} pixels from the centre (max {max})")]
    ReachTooLarge { reach: u64, max: u64 },
}
