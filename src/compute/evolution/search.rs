//! Hill-climbing driver: mutate the current best, render, score, keep strict improvements.

use std::time::Instant;

use image::RgbImage;
use rayon::prelude::*;
use serde::Serialize;

use crate::compute::render::render;
use crate::compute::rng::{GenomeRng, UniformInt};
use crate::schema::{
    CanvasConfig, EvolutionConfig, EvolutionConfigError, EvolutionPhase, EvolutionStats,
    GenerationReport, StagnationUnit, StopReason,
};
use crate::storage::CandidateSink;

use super::fitness::{FitnessError, FitnessEvaluator};
use super::genome::{Genotype, GenotypeError, genotype_distance, mutate, random_genotype};

/// Best-so-far state threaded through the loop. Replaced as a whole once
/// per generation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BestState {
    /// Current best genotype.
    pub genotype: Genotype,
    /// Its similarity to the target.
    pub similarity: f64,
    /// Stagnation counter.
    pub stagnation: usize,
}

/// A scored candidate of one generation.
#[derive(Debug, Clone)]
pub struct Candidate {
    /// Position in the batch.
    pub index: usize,
    /// The mutated genotype.
    pub genotype: Genotype,
    /// Similarity to the target.
    pub similarity: f64,
    /// Whether the sink accepted the image.
    pub saved: bool,
}

/// Outcome of a run.
#[derive(Debug, Clone, Serialize)]
pub struct EvolutionResult {
    /// Best genotype found.
    pub best: Genotype,
    /// Genotype the run started from.
    pub initial: Genotype,
    /// Run statistics.
    pub stats: EvolutionStats,
    /// Best similarity after each generation.
    pub history: Vec<f64>,
}

/// Errors raised while setting up a run.
#[derive(Debug, thiserror::Error)]
pub enum EvolutionError {
    #[error("Invalid configuration: {0}")]
    Config(#[from] EvolutionConfigError),
    #[error("Invalid initial genotype: {0}")]
    Genotype(#[from] GenotypeError),
    #[error(transparent)]
    Fitness(#[from] FitnessError),
}

/// Evolution engine that runs the hill-climb.
pub struct EvolutionEngine<R: UniformInt = GenomeRng> {
    config: EvolutionConfig,
    evaluator: FitnessEvaluator,
    rng: R,
    phase: EvolutionPhase,
    initial: Genotype,
    initial_similarity: f64,
    best: BestState,
    generation: usize,
    history: Vec<f64>,
    candidates_evaluated: u64,
    failed_writes: u64,
}

impl EvolutionEngine<GenomeRng> {
    /// Build an engine for `target` using the configured random seed.
    pub fn from_target(
        config: EvolutionConfig,
        target: RgbImage,
    ) -> Result<Self, EvolutionError> {
        let evaluator = FitnessEvaluator::new(target, &config.canvas)?;
        let rng = GenomeRng::from_option(config.random_seed);
        Self::new(config, evaluator, rng)
    }
}

impl<R: UniformInt> EvolutionEngine<R> {
    /// Create an engine and seed the best-so-far state.
    ///
    /// The starting genotype is `config.initial_genotype` when set, random
    /// otherwise.
    pub fn new(
        config: EvolutionConfig,
        evaluator: FitnessEvaluator,
        mut rng: R,
    ) -> Result<Self, EvolutionError> {
        config.validate()?;

        let expected = (config.canvas.width, config.canvas.height);
        if evaluator.target().dimensions() != expected {
            return Err(FitnessError::DimensionMismatch {
                expected,
                actual: evaluator.target().dimensions(),
            }
            .into());
        }

        let initial = match &config.initial_genotype {
            Some(genes) => Genotype::from_genes(genes, &config.constraints)?,
            None => random_genotype(&mut rng, &config.constraints),
        };
        let initial_similarity = evaluator.score(&render(&initial, &config.canvas));
        log::info!(
            "Initial genotype {} (similarity {:.6})",
            initial,
            initial_similarity
        );

        let best = BestState {
            genotype: initial.clone(),
            similarity: initial_similarity,
            stagnation: 0,
        };

        Ok(Self {
            config,
            evaluator,
            rng,
            phase: EvolutionPhase::Initializing,
            initial,
            initial_similarity,
            best,
            generation: 0,
            history: Vec::new(),
            candidates_evaluated: 0,
            failed_writes: 0,
        })
    }

    /// Current best-so-far state.
    pub fn best(&self) -> &BestState {
        &self.best
    }

    /// Current phase.
    pub fn phase(&self) -> EvolutionPhase {
        self.phase
    }

    /// Generations completed.
    pub fn generation(&self) -> usize {
        self.generation
    }

    /// Run configuration.
    pub fn config(&self) -> &EvolutionConfig {
        &self.config
    }

    /// Run one generation: mutate the current best `batch_size` times,
    /// evaluate every candidate, then fold the results in batch order.
    pub fn step_generation(&mut self, sink: &dyn CandidateSink) -> GenerationReport {
        let generation = self.generation;
        let parent = self.best.genotype.clone();

        // Mutations are drawn sequentially so RNG use is identical in both modes
        let genotypes: Vec<Genotype> = (0..self.config.batch_size)
            .map(|_| mutate(&parent, &mut self.rng, &self.config.constraints))
            .collect();

        let canvas = &self.config.canvas;
        let evaluator = &self.evaluator;
        let candidates: Vec<Candidate> = if self.config.parallel {
            genotypes
                .into_par_iter()
                .enumerate()
                .map(|(index, genotype)| {
                    evaluate_candidate(generation, index, genotype, canvas, evaluator, sink)
                })
                .collect()
        } else {
            genotypes
                .into_iter()
                .enumerate()
                .map(|(index, genotype)| {
                    evaluate_candidate(generation, index, genotype, canvas, evaluator, sink)
                })
                .collect()
        };

        let failed = candidates.iter().filter(|c| !c.saved).count();
        let generation_best = candidates
            .iter()
            .map(|c| c.similarity)
            .fold(f64::INFINITY, f64::min);

        let (next, improved) = reduce(&self.best, candidates, self.config.stagnation_unit);
        if improved {
            log::info!(
                "Generation {}: improved {:.6} -> {:.6}",
                generation,
                self.best.similarity,
                next.similarity
            );
        }
        self.best = next;

        self.candidates_evaluated += self.config.batch_size as u64;
        self.failed_writes += failed as u64;
        self.history.push(self.best.similarity);
        self.generation += 1;

        GenerationReport {
            generation,
            best_similarity: self.best.similarity,
            generation_best,
            improved,
            stagnation_count: self.best.stagnation,
            distance_from_initial: genotype_distance(&self.initial, &self.best.genotype),
            failed_writes: failed,
        }
    }

    /// Check if evolution should stop.
    fn should_stop(&self) -> Option<StopReason> {
        if self.best.similarity == 0.0 {
            return Some(StopReason::ExactMatch);
        }
        if self.best.stagnation >= self.config.stagnation_limit {
            return Some(StopReason::Stagnation);
        }
        if self.generation >= self.config.max_generations {
            return Some(StopReason::MaxGenerations);
        }
        None
    }

    /// Run evolution with a per-generation progress callback.
    pub fn run_with_callback<F>(
        &mut self,
        sink: &dyn CandidateSink,
        mut callback: F,
    ) -> EvolutionResult
    where
        F: FnMut(&GenerationReport),
    {
        let start_time = Instant::now();
        self.phase = EvolutionPhase::Evolving;

        let stop_reason = loop {
            if let Some(reason) = self.should_stop() {
                break reason;
            }
            let report = self.step_generation(sink);
            callback(&report);
        };

        self.phase = EvolutionPhase::Done;
        log::info!(
            "Stopped after {} generations ({:?}), best similarity {:.6}",
            self.generation,
            stop_reason,
            self.best.similarity
        );

        EvolutionResult {
            best: self.best.genotype.clone(),
            initial: self.initial.clone(),
            stats: EvolutionStats {
                generations: self.generation,
                candidates_evaluated: self.candidates_evaluated,
                failed_writes: self.failed_writes,
                initial_similarity: self.initial_similarity,
                best_similarity: self.best.similarity,
                elapsed_seconds: start_time.elapsed().as_secs_f64(),
                stop_reason,
            },
            history: self.history.clone(),
        }
    }

    /// Run evolution (blocking).
    pub fn run(&mut self, sink: &dyn CandidateSink) -> EvolutionResult {
        self.run_with_callback(sink, |_| {})
    }
}

/// Render, score and persist one candidate. A failed save is logged and
/// reported through `saved` only.
fn evaluate_candidate(
    generation: usize,
    index: usize,
    genotype: Genotype,
    canvas: &CanvasConfig,
    evaluator: &FitnessEvaluator,
    sink: &dyn CandidateSink,
) -> Candidate {
    let image = render(&genotype, canvas);
    let similarity = evaluator.score(&image);

    let saved = match sink.save_candidate(generation, index, &image) {
        Ok(()) => true,
        Err(e) => {
            log::warn!("{}", e);
            false
        }
    };
    log::debug!(
        "Generation {} candidate {}: similarity {:.6}",
        generation,
        index,
        similarity
    );

    Candidate {
        index,
        genotype,
        similarity,
        saved,
    }
}

/// Fold a generation's candidates, in batch order, into the next state.
/// Returns the new state and whether any candidate was adopted.
fn reduce(
    current: &BestState,
    candidates: Vec<Candidate>,
    unit: StagnationUnit,
) -> (BestState, bool) {
    let mut next = current.clone();
    let mut improved = false;

    for candidate in candidates {
        if candidate.similarity < next.similarity {
            log::debug!(
                "Adopted candidate {} ({:.6} -> {:.6})",
                candidate.index,
                next.similarity,
                candidate.similarity
            );
            next = BestState {
                genotype: candidate.genotype,
                similarity: candidate.similarity,
                stagnation: 0,
            };
            improved = true;
        } else if unit == StagnationUnit::Candidate {
            next.stagnation += 1;
        }
    }

    if unit == StagnationUnit::Generation && !improved {
        next.stagnation += 1;
    }
    (next, improved)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compute::rng::ScriptedRng;
    use crate::schema::{GenomeConstraints, OutputConfig};
    use crate::storage::{DirectorySink, NullSink, StorageError};
    use image::Rgb;
    use tempfile::tempdir;

    const GOAL: [i32; 4] = [3, -2, 1, 4];

    fn test_config() -> EvolutionConfig {
        EvolutionConfig {
            canvas: CanvasConfig {
                width: 41,
                height: 41,
                ..Default::default()
            },
            constraints: GenomeConstraints {
                shape_genes: 3,
                ..Default::default()
            },
            output: OutputConfig {
                candidate_dir: None,
                ..Default::default()
            },
            ..Default::default()
        }
    }

    fn rendered_target(config: &EvolutionConfig, genes: &[i32]) -> RgbImage {
        let g = Genotype::from_genes(genes, &config.constraints).unwrap();
        render(&g, &config.canvas)
    }

    fn blank_target(config: &EvolutionConfig) -> RgbImage {
        RgbImage::from_pixel(
            config.canvas.width,
            config.canvas.height,
            Rgb(config.canvas.background),
        )
    }

    fn engine<R: UniformInt>(
        config: EvolutionConfig,
        target: RgbImage,
        rng: R,
    ) -> EvolutionEngine<R> {
        let evaluator = FitnessEvaluator::new(target, &config.canvas).unwrap();
        EvolutionEngine::new(config, evaluator, rng).unwrap()
    }

    struct FailingSink;

    impl CandidateSink for FailingSink {
        fn save_candidate(&self, _: usize, _: usize, _: &RgbImage) -> Result<(), StorageError> {
            Err(StorageError::ImageWrite {
                path: "unwritable.png".into(),
                source: image::ImageError::IoError(std::io::Error::other("disk full")),
            })
        }
    }

    #[test]
    fn test_converges_from_neighbor() {
        let config = EvolutionConfig {
            initial_genotype: Some(vec![2, -2, 1, 4]),
            ..test_config()
        };
        let target = rendered_target(&config, &GOAL);
        // Every mutation picks gene 0 and adds 1: the first candidate is the goal
        let mut engine = engine(config, target, ScriptedRng::new(vec![0, 1]));
        assert!(engine.best().similarity > 0.0);
        assert_eq!(engine.phase(), EvolutionPhase::Initializing);

        let result = engine.run(&NullSink);
        assert_eq!(result.stats.stop_reason, StopReason::ExactMatch);
        assert_eq!(result.stats.generations, 1);
        assert_eq!(result.stats.best_similarity, 0.0);
        assert_eq!(result.best.genes(), GOAL.to_vec());
        assert_eq!(result.initial.genes(), vec![2, -2, 1, 4]);
        assert_eq!(engine.phase(), EvolutionPhase::Done);
    }

    #[test]
    fn test_exact_initial_runs_no_generation() {
        let config = EvolutionConfig {
            initial_genotype: Some(GOAL.to_vec()),
            ..test_config()
        };
        let target = rendered_target(&config, &GOAL);
        let mut engine = engine(config, target, GenomeRng::new(1));

        let result = engine.run(&NullSink);
        assert_eq!(result.stats.stop_reason, StopReason::ExactMatch);
        assert_eq!(result.stats.generations, 0);
        assert!(result.history.is_empty());
    }

    #[test]
    fn test_candidate_stagnation_stops_after_first_generation() {
        let config = EvolutionConfig {
            initial_genotype: Some(GOAL.to_vec()),
            ..test_config()
        };
        let target = blank_target(&config);
        // Gene 0, delta 0: every candidate equals the parent
        let mut engine = engine(config, target, ScriptedRng::new(vec![0]));

        let result = engine.run(&NullSink);
        assert_eq!(result.stats.stop_reason, StopReason::Stagnation);
        assert_eq!(result.stats.generations, 1);
        assert_eq!(result.stats.candidates_evaluated, 16);
        assert_eq!(engine.best().stagnation, 16);
    }

    #[test]
    fn test_generation_stagnation_stops_at_limit() {
        let config = EvolutionConfig {
            initial_genotype: Some(GOAL.to_vec()),
            batch_size: 4,
            stagnation_limit: 3,
            stagnation_unit: StagnationUnit::Generation,
            ..test_config()
        };
        let target = blank_target(&config);
        let mut engine = engine(config, target, ScriptedRng::new(vec![0]));
        assert_eq!(engine.generation(), 0);

        let mut seen = Vec::new();
        let result = engine.run_with_callback(&NullSink, |report| {
            seen.push((report.generation, report.stagnation_count, report.improved));
        });
        assert_eq!(result.stats.stop_reason, StopReason::Stagnation);
        assert_eq!(result.stats.generations, 3);
        assert_eq!(result.stats.candidates_evaluated, 12);
        assert_eq!(seen, vec![(0, 1, false), (1, 2, false), (2, 3, false)]);
    }

    #[test]
    fn test_max_generations() {
        let config = EvolutionConfig {
            initial_genotype: Some(GOAL.to_vec()),
            batch_size: 2,
            max_generations: 5,
            stagnation_limit: 100,
            stagnation_unit: StagnationUnit::Generation,
            ..test_config()
        };
        let target = blank_target(&config);
        let mut engine = engine(config, target, ScriptedRng::new(vec![0]));

        let result = engine.run(&NullSink);
        assert_eq!(result.stats.stop_reason, StopReason::MaxGenerations);
        assert_eq!(result.stats.generations, 5);
        assert_eq!(engine.generation(), 5);
        assert_eq!(result.history.len(), 5);
    }

    #[test]
    fn test_hill_climb_never_worsens() {
        let config = EvolutionConfig {
            max_generations: 50,
            stagnation_limit: 20,
            stagnation_unit: StagnationUnit::Generation,
            random_seed: Some(7),
            ..test_config()
        };
        let target = rendered_target(&config, &GOAL);
        let mut engine = EvolutionEngine::from_target(config, target).unwrap();
        let initial = engine.best().similarity;

        let result = engine.run(&NullSink);
        assert!(result.stats.best_similarity <= initial);
        assert_eq!(result.stats.initial_similarity, initial);
        assert!(result.history.windows(2).all(|w| w[1] <= w[0]));
    }

    #[test]
    fn test_parallel_matches_sequential() {
        let base = EvolutionConfig {
            max_generations: 20,
            random_seed: Some(99),
            ..test_config()
        };
        let target = rendered_target(&base, &GOAL);

        let sequential = EvolutionEngine::from_target(base.clone(), target.clone())
            .unwrap()
            .run(&NullSink);
        let parallel = EvolutionEngine::from_target(
            EvolutionConfig {
                parallel: true,
                ..base
            },
            target,
        )
        .unwrap()
        .run(&NullSink);

        assert_eq!(sequential.best, parallel.best);
        assert_eq!(sequential.history, parallel.history);
        assert_eq!(sequential.stats.generations, parallel.stats.generations);
        assert_eq!(sequential.stats.stop_reason, parallel.stats.stop_reason);
    }

    #[test]
    fn test_failed_writes_do_not_change_search() {
        let config = EvolutionConfig {
            max_generations: 10,
            random_seed: Some(3),
            ..test_config()
        };
        let target = rendered_target(&config, &GOAL);

        let clean = EvolutionEngine::from_target(config.clone(), target.clone())
            .unwrap()
            .run(&NullSink);
        let failing = EvolutionEngine::from_target(config, target)
            .unwrap()
            .run(&FailingSink);

        assert_eq!(clean.best, failing.best);
        assert_eq!(clean.history, failing.history);
        assert_eq!(clean.stats.failed_writes, 0);
        assert_eq!(
            failing.stats.failed_writes,
            failing.stats.candidates_evaluated
        );
    }

    #[test]
    fn test_candidates_written_to_directory() {
        let dir = tempdir().unwrap();
        let sink = DirectorySink::new(dir.path()).unwrap();
        let config = EvolutionConfig {
            initial_genotype: Some(GOAL.to_vec()),
            batch_size: 3,
            max_generations: 2,
            stagnation_limit: 100,
            ..test_config()
        };
        let target = blank_target(&config);
        let mut engine = engine(config, target, ScriptedRng::new(vec![0]));

        let result = engine.run(&sink);
        assert_eq!(result.stats.generations, 2);
        for generation in 0..2 {
            for index in 0..3 {
                assert!(sink.candidate_path(generation, index).is_file());
            }
        }
        assert!(!sink.candidate_path(2, 0).exists());
    }

    #[test]
    fn test_setup_errors() {
        let config = test_config();
        let wrong_size = RgbImage::new(10, 10);
        assert!(matches!(
            EvolutionEngine::from_target(config.clone(), wrong_size),
            Err(EvolutionError::Fitness(FitnessError::DimensionMismatch { .. }))
        ));

        let bad_initial = EvolutionConfig {
            initial_genotype: Some(vec![0, 0, 0, 99]),
            ..test_config()
        };
        let target = blank_target(&bad_initial);
        assert!(matches!(
            EvolutionEngine::from_target(bad_initial, target),
            Err(EvolutionError::Genotype(_))
        ));

        let bad_config = EvolutionConfig {
            batch_size: 0,
            ..config.clone()
        };
        let target = blank_target(&bad_config);
        assert!(matches!(
            EvolutionEngine::from_target(bad_config, target),
            Err(EvolutionError::Config(_))
        ));
    }

    #[test]
    fn test_evaluator_for_other_canvas_rejected() {
        let config = test_config();
        let small = CanvasConfig {
            width: 20,
            height: 20,
            ..Default::default()
        };
        let evaluator = FitnessEvaluator::new(RgbImage::new(20, 20), &small).unwrap();
        assert_eq!(evaluator.target().dimensions(), (20, 20));

        assert!(matches!(
            EvolutionEngine::new(config, evaluator, GenomeRng::new(5)),
            Err(EvolutionError::Fitness(FitnessError::DimensionMismatch {
                expected: (41, 41),
                actual: (20, 20)
            }))
        ));
    }

    #[test]
    fn test_reduce_counts_per_candidate() {
        let constraints = GenomeConstraints {
            shape_genes: 3,
            ..Default::default()
        };
        let g = Genotype::from_genes(&GOAL, &constraints).unwrap();
        let current = BestState {
            genotype: g.clone(),
            similarity: 10.0,
            stagnation: 4,
        };
        let candidate = |index, similarity| Candidate {
            index,
            genotype: g.clone(),
            similarity,
            saved: true,
        };

        // Worse, better, equal, worse: reset at the second, then two more ticks
        let batch = vec![
            candidate(0, 12.0),
            candidate(1, 8.0),
            candidate(2, 8.0),
            candidate(3, 9.0),
        ];
        let (next, improved) = reduce(&current, batch.clone(), StagnationUnit::Candidate);
        assert!(improved);
        assert_eq!(next.similarity, 8.0);
        assert_eq!(next.stagnation, 2);

        let (next, improved) = reduce(&current, batch, StagnationUnit::Generation);
        assert!(improved);
        assert_eq!(next.stagnation, 0);

        let (next, improved) =
            reduce(&current, vec![candidate(0, 10.0)], StagnationUnit::Generation);
        assert!(!improved);
        assert_eq!(next.stagnation, 5);
        assert_eq!(next.similarity, 10.0);
    }
}
