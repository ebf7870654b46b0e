//! Evolution configuration and reporting types for the biomorph hill-climb.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use super::{CanvasConfig, ConfigError, GenomeConstraints};

/// Top-level configuration for a run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvolutionConfig {
    /// Canvas size and colours.
    #[serde(default)]
    pub canvas: CanvasConfig,
    /// Genotype shape and bounds.
    #[serde(default)]
    pub constraints: GenomeConstraints,
    /// Candidates mutated from the current best per generation.
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
    /// Generation cap.
    #[serde(default = "default_max_generations")]
    pub max_generations: usize,
    /// Stagnation cap.
    #[serde(default = "default_stagnation_limit")]
    pub stagnation_limit: usize,
    /// What one tick of the stagnation counter means.
    #[serde(default)]
    pub stagnation_unit: StagnationUnit,
    /// Evaluate candidates of a generation on the rayon pool.
    #[serde(default)]
    pub parallel: bool,
    /// Starting genotype as a flat gene list. Random when absent.
    #[serde(default)]
    pub initial_genotype: Option<Vec<i32>>,
    /// Path of the target PNG.
    #[serde(default = "default_target_path")]
    pub target_path: PathBuf,
    /// Where candidate and final images go.
    #[serde(default)]
    pub output: OutputConfig,
    /// Random seed for reproducibility.
    #[serde(default)]
    pub random_seed: Option<u64>,
}

impl Default for EvolutionConfig {
    fn default() -> Self {
        Self {
            canvas: CanvasConfig::default(),
            constraints: GenomeConstraints::default(),
            batch_size: default_batch_size(),
            max_generations: default_max_generations(),
            stagnation_limit: default_stagnation_limit(),
            stagnation_unit: StagnationUnit::default(),
            parallel: false,
            initial_genotype: None,
            target_path: default_target_path(),
            output: OutputConfig::default(),
            random_seed: None,
        }
    }
}

fn default_batch_size() -> usize {
    16
}
fn default_max_generations() -> usize {
    1000
}
fn default_stagnation_limit() -> usize {
    10
}
fn default_target_path() -> PathBuf {
    PathBuf::from("target.png")
}

/// Granularity of the stagnation counter.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StagnationUnit {
    /// Every non-improving candidate counts.
    #[default]
    Candidate,
    /// Only a whole generation without an adopted candidate counts.
    Generation,
}

/// Output locations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Directory for per-candidate images. `None` disables them.
    #[serde(default = "default_candidate_dir")]
    pub candidate_dir: Option<PathBuf>,
    /// Path of the final best biomorph.
    #[serde(default = "default_final_path")]
    pub final_path: PathBuf,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            candidate_dir: default_candidate_dir(),
            final_path: default_final_path(),
        }
    }
}

fn default_candidate_dir() -> Option<PathBuf> {
    Some(PathBuf::from("images"))
}
fn default_final_path() -> PathBuf {
    PathBuf::from("final_biomorph.png")
}

// ============================================================================
// Progress & results
// ============================================================================

/// Driver phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EvolutionPhase {
    /// Best-so-far state seeded, no generation run yet.
    Initializing,
    /// Running generations.
    Evolving,
    /// Stopped.
    Done,
}

/// Summary of one generation, passed to the progress callback.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationReport {
    /// Zero-based generation index.
    pub generation: usize,
    /// Best similarity after this generation.
    pub best_similarity: f64,
    /// Lowest similarity among this generation's candidates.
    pub generation_best: f64,
    /// Whether a candidate was adopted.
    pub improved: bool,
    /// Stagnation counter after this generation.
    pub stagnation_count: usize,
    /// L1 distance of the current best from the initial genotype.
    pub distance_from_initial: u32,
    /// Candidate images that failed to save.
    pub failed_writes: usize,
}

/// Why the run stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StopReason {
    /// Best similarity reached zero.
    ExactMatch,
    /// Stagnation limit hit.
    Stagnation,
    /// Generation cap hit.
    MaxGenerations,
}

/// Run statistics.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvolutionStats {
    /// Generations completed.
    pub generations: usize,
    /// Candidates rendered and scored.
    pub candidates_evaluated: u64,
    /// Candidate images that failed to save.
    pub failed_writes: u64,
    /// Similarity of the initial genotype.
    pub initial_similarity: f64,
    /// Similarity of the final best genotype.
    pub best_similarity: f64,
    /// Wall-clock duration.
    pub elapsed_seconds: f64,
    /// Why evolution stopped.
    pub stop_reason: StopReason,
}

// ============================================================================
// Validation
// ============================================================================

/// Evolution configuration validation errors.
#[derive(Debug, thiserror::Error)]
pub enum EvolutionConfigError {
    #[error("Batch size must be at least 1")]
    EmptyBatch,
    #[error("Stagnation limit must be at least 1")]
    InvalidStagnationLimit,
    #[error("Base config validation failed: {0}")]
    BaseConfigError(#[from] ConfigError),
}

impl EvolutionConfig {
    /// Validate evolution configuration.
    pub fn validate(&self) -> Result<(), EvolutionConfigError> {
        self.canvas.validate()?;
        self.constraints.validate()?;

        if self.batch_size == 0 {
            return Err(EvolutionConfigError::EmptyBatch);
        }
        if self.stagnation_limit == 0 {
            return Err(EvolutionConfigError::InvalidStagnationLimit);
        }
        Ok(())
    }
}
