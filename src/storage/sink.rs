//! Destinations for rendered candidate images.

use std::fs;
use std::path::{Path, PathBuf};

use image::RgbImage;

use super::StorageError;

/// Receives every rendered candidate.
///
/// `Sync` so candidates of one generation can be saved from worker threads.
pub trait CandidateSink: Sync {
    /// Persist the candidate `index` of `generation`.
    fn save_candidate(
        &self,
        generation: usize,
        index: usize,
        image: &RgbImage,
    ) -> Result<(), StorageError>;
}

/// Discards candidates.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl CandidateSink for NullSink {
    fn save_candidate(&self, _: usize, _: usize, _: &RgbImage) -> Result<(), StorageError> {
        Ok(())
    }
}

/// Writes candidates as PNG files into one directory.
#[derive(Debug, Clone)]
pub struct DirectorySink {
    dir: PathBuf,
}

impl DirectorySink {
    /// Create the sink, creating `dir` if needed.
    pub fn new<P: AsRef<Path>>(dir: P) -> Result<Self, StorageError> {
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir).map_err(|source| StorageError::CreateDir {
            path: dir.clone(),
            source,
        })?;
        Ok(Self { dir })
    }

    /// Output directory.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Full path of a candidate file.
    pub fn candidate_path(&self, generation: usize, index: usize) -> PathBuf {
        self.dir.join(candidate_file_name(generation, index))
    }
}

impl CandidateSink for DirectorySink {
    fn save_candidate(
        &self,
        generation: usize,
        index: usize,
        image: &RgbImage,
    ) -> Result<(), StorageError> {
        save_image(image, self.candidate_path(generation, index))
    }
}

/// File name for a candidate, e.g. `generation_007_biomorph_03.png`.
pub fn candidate_file_name(generation: usize, index: usize) -> String {
    format!("generation_{:03}_biomorph_{:02}.png", generation, index)
}

/// Save `image` to `path`; the format follows the extension.
pub fn save_image<P: AsRef<Path>>(image: &RgbImage, path: P) -> Result<(), StorageError> {
    let path = path.as_ref();
    image.save(path).map_err(|source| StorageError::ImageWrite {
        path: path.to_path_buf(),
        source,
    })
}
