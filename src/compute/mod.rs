//! Compute module - Genotype operations, rasterization and search.

pub mod evolution;
pub mod raster;
pub mod render;
mod rng;

pub use raster::{Canvas, draw_line};
pub use render::{draw_biomorph, render};
pub use rng::{GenomeRng, UniformInt};
