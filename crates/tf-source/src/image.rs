use std::path::Path;

use anyhow::{Context, Result};
use tf_core::GrayFrame;

use crate::resize::resize_gray;

/// Charge une image fixe en niveaux de gris (luma BT.601).
///
/// # Errors
/// Returns an error if the file cannot be opened or decoded.
///
/// # Example
/// ```no_run
/// use std::path::Path;
/// use tf_source::image::load_gray;
/// let frame = load_gray(Path::new("photo.png")).unwrap();
/// ```
pub fn load_gray(path: &Path) -> Result<GrayFrame> {
    let img = image::open(path)
        .with_context(|| format!("Impossible de charger {}", path.display()))?;
    let rgba = img.to_rgba8();
    let (width, height) = rgba.dimensions();
    log::info!("image {}x{} chargée : {}", width, height, path.display());
    Ok(GrayFrame::from_rgba(width, height, rgba.as_raw()))
}

/// [`load_gray`] puis redimensionnement à `width × height`.
///
/// # Errors
/// Returns an error if loading or resizing fails.
pub fn load_gray_resized(path: &Path, width: u32, height: u32) -> Result<GrayFrame> {
    let frame = load_gray(path)?;
    resize_gray(&frame, width, height)
}
