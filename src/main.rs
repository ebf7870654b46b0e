//! Biomorph CLI - Evolve a biomorph toward a target image.

#[cfg(feature = "dhat-heap")]
#[global_allocator]
static ALLOC: dhat::Alloc = dhat::Alloc;

use std::fs;
use std::path::Path;

use biomorph::{
    compute::{evolution::EvolutionEngine, render},
    schema::{EvolutionConfig, StopReason},
    storage::{CandidateSink, DirectorySink, NullSink, load_target, save_image},
};

fn main() {
    #[cfg(feature = "dhat-heap")]
    let _profiler = dhat::Profiler::new_heap();

    env_logger::init();

    let args: Vec<String> = std::env::args().collect();

    match args.get(1).map(String::as_str) {
        Some("--example") => {
            print_example_config();
            return;
        }
        Some("-h") | Some("--help") => {
            print_usage(&args[0]);
            return;
        }
        _ => {}
    }

    let config = match args.get(1) {
        Some(path) => load_config(Path::new(path)),
        None => EvolutionConfig::default(),
    };

    if let Err(e) = config.validate() {
        eprintln!("Invalid configuration: {}", e);
        std::process::exit(1);
    }

    // Target must load before anything is evolved or written
    let target = load_target(&config.target_path).unwrap_or_else(|e| {
        eprintln!("{}", e);
        std::process::exit(1);
    });

    let final_path = config.output.final_path.clone();
    let canvas = config.canvas.clone();

    let sink: Box<dyn CandidateSink> = match &config.output.candidate_dir {
        Some(dir) => match DirectorySink::new(dir) {
            Ok(sink) => {
                log::info!("Writing candidate images to {}", sink.dir().display());
                Box::new(sink)
            }
            Err(e) => {
                log::warn!("{}; candidate images disabled", e);
                Box::new(NullSink)
            }
        },
        None => Box::new(NullSink),
    };

    let mut engine = EvolutionEngine::from_target(config, target).unwrap_or_else(|e| {
        eprintln!("{}", e);
        std::process::exit(1);
    });

    println!("Biomorph Evolution");
    println!("==================");
    println!("Canvas: {}x{}", canvas.width, canvas.height);
    println!("Genes: {}", engine.config().constraints.gene_count());
    println!(
        "Batch: {}, max generations: {}, stagnation limit: {}",
        engine.config().batch_size,
        engine.config().max_generations,
        engine.config().stagnation_limit
    );
    println!("Initial similarity: {:.6}", engine.best().similarity);
    println!();

    let result = engine.run_with_callback(sink.as_ref(), |report| {
        println!(
            "Generation {}: best similarity {:.6}",
            report.generation, report.best_similarity
        );
    });

    println!();
    match result.stats.stop_reason {
        StopReason::ExactMatch => println!("Exact match found."),
        StopReason::Stagnation => {
            println!("Stagnation limit reached. Ending evolution.")
        }
        StopReason::MaxGenerations => println!("Generation limit reached."),
    }
    println!("Best genotype: {}", result.best);
    println!(
        "Similarity: {:.6} -> {:.6} in {} generations ({} candidates, {:.2}s)",
        result.stats.initial_similarity,
        result.stats.best_similarity,
        result.stats.generations,
        result.stats.candidates_evaluated,
        result.stats.elapsed_seconds
    );
    if result.stats.failed_writes > 0 {
        println!("Failed candidate writes: {}", result.stats.failed_writes);
    }

    let final_image = render(&result.best, &canvas);
    match save_image(&final_image, &final_path) {
        Ok(()) => println!("Final biomorph saved as {}", final_path.display()),
        Err(e) => {
            log::error!("{}", e);
            std::process::exit(1);
        }
    }
}

fn load_config(path: &Path) -> EvolutionConfig {
    let config_str = fs::read_to_string(path).unwrap_or_else(|e| {
        eprintln!("Error reading config file: {}", e);
        std::process::exit(1);
    });

    serde_json::from_str(&config_str).unwrap_or_else(|e| {
        eprintln!("Error parsing config: {}", e);
        std::process::exit(1);
    })
}

fn print_usage(program: &str) {
    eprintln!("Usage: {} [config.json]", program);
    eprintln!();
    eprintln!("Evolve a biomorph toward a target image.");
    eprintln!();
    eprintln!("Arguments:");
    eprintln!("  config.json  Run configuration (default: built-in reference settings)");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --example    Print the default configuration as JSON");
    eprintln!("  -h, --help   Show this message");
}

fn print_example_config() {
    let config = EvolutionConfig::default();
    match serde_json::to_string_pretty(&config) {
        Ok(json) => println!("{}", json),
        Err(e) => eprintln!("Error serializing config: {}", e),
    }
}
