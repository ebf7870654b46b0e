//! Biomorph evolution - hill-climbing line figures toward a target image.
//!
//! A biomorph is a chain of mirrored line strokes described by a short
//! integer genotype. Starting from one genotype, every generation mutates
//! the current best a fixed number of times, renders each mutant, scores it
//! against the target by mean absolute pixel difference and keeps a mutant
//! only if it is strictly better. The run ends on an exact match, after too
//! many non-improving candidates, or at the generation cap.
//!
//! # Architecture
//!
//! - `schema`: Configuration and reporting types
//! - `compute`: Genotypes, rasterization, fitness and the search driver
//! - `storage`: Target loading and candidate image output
//!
//! # Example
//!
//! ```rust,no_run
//! use biomorph::{
//!     compute::{GenomeRng, evolution::{EvolutionEngine, FitnessEvaluator}},
//!     schema::EvolutionConfig,
//!     storage::{DirectorySink, load_target},
//! };
//!
//! let config = EvolutionConfig::default();
//! let target = load_target(&config.target_path)?;
//! let evaluator = FitnessEvaluator::new(target, &config.canvas)?;
//! let sink = DirectorySink::new("images")?;
//!
//! let mut engine = EvolutionEngine::new(config, evaluator, GenomeRng::new(42))?;
//! let result = engine.run(&sink);
//!
//! println!("Best similarity after {} generations: {}",
//!     result.stats.generations, result.stats.best_similarity);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod compute;
pub mod schema;
pub mod storage;

// Re-export commonly used types
pub use compute::evolution::{EvolutionEngine, EvolutionResult, Genotype};
pub use schema::{CanvasConfig, EvolutionConfig, GenomeConstraints};
