//! Target image loading.

use std::path::Path;

use image::RgbImage;

use super::StorageError;

/// Decode the target image at `path` into 8-bit RGB.
///
/// Any format the `image` crate was built with is accepted; alpha is
/// dropped. Size is not checked here, see `FitnessEvaluator::new`.
pub fn load_target<P: AsRef<Path>>(path: P) -> Result<RgbImage, StorageError> {
    let path = path.as_ref();
    let image = image::open(path).map_err(|source| StorageError::TargetLoad {
        path: path.to_path_buf(),
        source,
    })?;
    log::debug!(
        "Loaded target {} ({}x{})",
        path.display(),
        image.width(),
        image.height()
    );
    Ok(image.to_rgb8())
}
