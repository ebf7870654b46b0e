//! Evolutionary search for biomorphs resembling a target image.
//!
//! # Overview
//!
//! - **Genome** (`genome`): bounded genotype, random generation, point mutation
//! - **Fitness** (`fitness`): mean absolute channel difference to the target
//! - **Search** (`search`): hill-climbing driver with stagnation cut-off
//!
//! # Example
//!
//! ```rust,no_run
//! use biomorph::compute::evolution::EvolutionEngine;
//! use biomorph::schema::EvolutionConfig;
//! use biomorph::storage::{NullSink, load_target};
//!
//! let config = EvolutionConfig::default();
//! let target = load_target(&config.target_path)?;
//!
//! let mut engine = EvolutionEngine::from_target(config, target)?;
//! let result = engine.run_with_callback(&NullSink, |report| {
//!     println!("Generation {}: best similarity {:.3}",
//!         report.generation, report.best_similarity);
//! });
//! println!("Best genotype: {}", result.best);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

mod fitness;
mod genome;
mod search;

pub use fitness::{FitnessError, FitnessEvaluator, MAX_SIMILARITY, similarity};
pub use genome::{Genotype, GenotypeError, genotype_distance, mutate, random_genotype};
pub use search::{BestState, Candidate, EvolutionEngine, EvolutionError, EvolutionResult};
