//! Palette aléatoire de référence.
//!
//! Bruit uniforme, flouté puis seuillé : des taches binaires sans rapport
//! avec la source, utiles pour mesurer ce que la quantification apporte.

use tf_core::{Palette, Tile, TileError, TileShape};

use crate::blur::{BLUR_SIGMA, GaussianKernel};

/// `n` random binary swatches of `shape`, reproducible from `seed`.
///
/// Each swatch is uniform byte noise blurred with σ = 2 then thresholded:
/// `≥ 128` becomes 255, the rest 0.
///
/// # Errors
/// Returns [`TileError::EmptyPalette`] if `n` is zero.
///
/// # Example
/// ```
/// use tf_core::TileShape;
/// use tf_palette::random::random_palette;
///
/// let shape = TileShape::new(8, 8).unwrap();
/// let a = random_palette(16, shape, 42).unwrap();
/// assert_eq!(a.len(), 16);
/// assert_eq!(a, random_palette(16, shape, 42).unwrap());
/// ```
pub fn random_palette(n: usize, shape: TileShape, seed: u64) -> Result<Palette, TileError> {
    if n == 0 {
        return Err(TileError::EmptyPalette);
    }
    let mut rng = fastrand::Rng::with_seed(seed);
    let kernel = GaussianKernel::new(BLUR_SIGMA);
    let mut palette = Palette::new(shape);
    let mut noise = vec![0u8; shape.area()];
    for _ in 0..n {
        rng.fill(&mut noise);
        let pixels = kernel
            .blur(&noise, shape.width, shape.height)?
            .into_iter()
            .map(|v| if v >= 128.0 { 255 } else { 0 })
            .collect();
        palette.push(Tile::new(shape, pixels)?)?;
    }
    log::debug!("palette aléatoire : {n} swatches (graine {seed})");
    Ok(palette)
}
