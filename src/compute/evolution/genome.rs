//! Genotype representation, random generation and point mutation.

use serde::Serialize;

use crate::compute::rng::UniformInt;
use crate::schema::GenomeConstraints;

/// A biomorph genotype: bounded shape genes plus one length gene.
///
/// Fields are private so every value in circulation has passed through a
/// bounds check or a clamp.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Genotype {
    shape: Vec<i32>,
    length: i32,
}

impl Genotype {
    /// Build from a flat gene list (shape genes followed by the length gene).
    pub fn from_genes(
        genes: &[i32],
        constraints: &GenomeConstraints,
    ) -> Result<Self, GenotypeError> {
        if genes.len() != constraints.gene_count() {
            return Err(GenotypeError::WrongLength {
                expected: constraints.gene_count(),
                actual: genes.len(),
            });
        }
        for (index, &value) in genes.iter().enumerate() {
            let (min, max) = constraints.bounds_of(index);
            if value < min || value > max {
                return Err(GenotypeError::OutOfBounds {
                    index,
                    value,
                    min,
                    max,
                });
            }
        }

        let (shape, length) = genes.split_at(constraints.shape_genes);
        Ok(Self {
            shape: shape.to_vec(),
            length: length[0],
        })
    }

    /// Shape genes in order.
    #[inline]
    pub fn shape(&self) -> &[i32] {
        &self.shape
    }

    /// The length gene (stroke scale).
    #[inline]
    pub fn length(&self) -> i32 {
        self.length
    }

    /// Total gene count.
    #[inline]
    pub fn len(&self) -> usize {
        self.shape.len() + 1
    }

    /// Always false: a genotype carries at least the length gene.
    #[inline]
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Gene at flat index `index`.
    pub fn gene(&self, index: usize) -> Option<i32> {
        match index.cmp(&self.shape.len()) {
            std::cmp::Ordering::Less => Some(self.shape[index]),
            std::cmp::Ordering::Equal => Some(self.length),
            std::cmp::Ordering::Greater => None,
        }
    }

    /// Flat gene list (shape genes followed by the length gene).
    pub fn genes(&self) -> Vec<i32> {
        let mut genes = self.shape.clone();
        genes.push(self.length);
        genes
    }

    fn gene_mut(&mut self, index: usize) -> &mut i32 {
        if index < self.shape.len() {
            &mut self.shape[index]
        } else {
            &mut self.length
        }
    }
}

impl std::fmt::Display for Genotype {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}", self.genes())
    }
}

/// Genotype construction errors.
#[derive(Debug, thiserror::Error)]
pub enum GenotypeError {
    #[error("Genotype needs {expected} genes, got {actual}")]
    WrongLength { expected: usize, actual: usize },
    #[error("Gene {index} = {value} outside [{min}, {max}]")]
    OutOfBounds {
        index: usize,
        value: i32,
        min: i32,
        max: i32,
    },
}

/// Draw a genotype uniformly within the constraints.
pub fn random_genotype<R: UniformInt + ?Sized>(
    rng: &mut R,
    constraints: &GenomeConstraints,
) -> Genotype {
    let (lo, hi) = constraints.shape_bounds;
    let shape = (0..constraints.shape_genes)
        .map(|_| rng.uniform_int(lo, hi))
        .collect();
    let length = rng.uniform_int(constraints.length_bounds.0, constraints.length_bounds.1);

    Genotype { shape, length }
}

/// Point mutation: copy `parent`, nudge one uniformly chosen gene by
/// -1, 0 or +1 and clamp it back into its bounds.
///
/// Draws the gene index first, then the delta.
pub fn mutate<R: UniformInt + ?Sized>(
    parent: &Genotype,
    rng: &mut R,
    constraints: &GenomeConstraints,
) -> Genotype {
    let mut child = parent.clone();
    let last = child.len() as i32 - 1;
    let index = rng.uniform_int(0, last) as usize;
    let delta = rng.uniform_int(-1, 1);

    let (min, max) = constraints.bounds_of(index);
    let gene = child.gene_mut(index);
    *gene = (*gene + delta).clamp(min, max);
    child
}

/// L1 distance between two genotypes of the same shape.
pub fn genotype_distance(a: &Genotype, b: &Genotype) -> u32 {
    a.shape
        .iter()
        .zip(&b.shape)
        .map(|(x, y)| x.abs_diff(*y))
        .sum::<u32>()
        + a.length.abs_diff(b.length)
}
