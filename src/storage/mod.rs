//! Image input and output for evolution runs.
//!
//! The target is decoded once before evolution starts; candidate images go
//! through a [`CandidateSink`], which the driver treats as an optional side
//! effect: a failed write is reported and never changes the search.

mod sink;
mod target;

pub use sink::{CandidateSink, DirectorySink, NullSink, candidate_file_name, save_image};
pub use target::load_target;

use std::path::PathBuf;

/// Storage errors.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("Failed to load target image {path}: {source}")]
    TargetLoad {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
    #[error("Failed to write image {path}: {source}")]
    ImageWrite {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
    #[error("Failed to create output directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
