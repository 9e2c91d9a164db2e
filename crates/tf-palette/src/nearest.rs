//! Affectation de chaque tuile à la swatch la plus proche.
//!
//! Tuiles et swatches passent par le même flou gaussien (σ = 2) avant la
//! comparaison en distance euclidienne. Les swatches sont floutées une fois à
//! la construction, le corpus est traité en parallèle.

use rayon::prelude::*;
use tf_core::{
    Assignment, NoProgress, Palette, ProgressObserver, TileCorpus, TileError, TileShape,
};

use crate::blur::{BLUR_SIGMA, GaussianKernel};

/// Palette pré-floutée prête à répondre aux requêtes.
///
/// # Example
/// ```
/// use tf_core::{Palette, Tile, TileShape};
/// use tf_palette::nearest::NearestAssigner;
///
/// let shape = TileShape::new(4, 4).unwrap();
/// let palette = Palette::from_swatches(
///     shape,
///     vec![Tile::filled(shape, 0), Tile::filled(shape, 255)],
/// )
/// .unwrap();
/// let assigner = NearestAssigner::new(&palette).unwrap();
/// let (index, _) = assigner.nearest(&[200; 16]).unwrap();
/// assert_eq!(index, 1);
/// ```
#[derive(Debug)]
pub struct NearestAssigner {
    shape: TileShape,
    kernel: GaussianKernel,
    swatches: Vec<Vec<f32>>,
}

impl NearestAssigner {
    /// Blur every swatch of `palette` once.
    ///
    /// # Errors
    /// Returns [`TileError::EmptyPalette`] if `palette` has no swatch.
    pub fn new(palette: &Palette) -> Result<Self, TileError> {
        if palette.is_empty() {
            return Err(TileError::EmptyPalette);
        }
        let shape = palette.shape();
        let kernel = GaussianKernel::new(BLUR_SIGMA);
        let swatches: Vec<Vec<f32>> = palette
            .iter()
            .map(|s| kernel.blur(s.pixels(), shape.width, shape.height))
            .collect::<Result<_, _>>()?;
        Ok(Self {
            shape,
            kernel,
            swatches,
        })
    }

    /// Tile shape this assigner accepts.
    #[must_use]
    pub fn shape(&self) -> TileShape {
        self.shape
    }

    /// Index and Euclidean distance of the closest swatch.
    ///
    /// Ties resolve to the lowest index.
    ///
    /// # Errors
    /// Returns [`TileError::ShapeMismatch`] unless `pixels` holds exactly one
    /// tile of [`Self::shape`].
    pub fn nearest(&self, pixels: &[u8]) -> Result<(usize, f32), TileError> {
        self.shape.ensure_len(pixels.len())?;
        let blurred = self
            .kernel
            .blur(pixels, self.shape.width, self.shape.height)?;
        let mut best = (0usize, f32::INFINITY);
        for (i, swatch) in self.swatches.iter().enumerate() {
            let d = squared_distance(&blurred, swatch);
            // strict : la première swatch à distance minimale gagne
            if d < best.1 {
                best = (i, d);
            }
        }
        Ok((best.0, best.1.sqrt()))
    }

    /// Assign every tile of `corpus`.
    ///
    /// # Errors
    /// Returns [`TileError::ShapeMismatch`] if the corpus tile shape differs
    /// from the palette's.
    pub fn assign(&self, corpus: &TileCorpus) -> Result<Assignment, TileError> {
        self.assign_observed(corpus, &mut NoProgress)
    }

    /// [`Self::assign`], reporting completion to `observer`.
    ///
    /// # Errors
    /// Returns [`TileError::ShapeMismatch`] on differing tile shapes.
    pub fn assign_observed(
        &self,
        corpus: &TileCorpus,
        observer: &mut dyn ProgressObserver,
    ) -> Result<Assignment, TileError> {
        self.shape.ensure(corpus.shape())?;
        let indices: Vec<usize> = (0..corpus.len())
            .into_par_iter()
            .map(|i| self.nearest(corpus.tile(i)).map(|(best, _)| best))
            .collect::<Result<_, _>>()?;
        observer.tiles_assigned(indices.len(), self.swatches.len());
        Ok(Assignment::new(indices))
    }
}

/// One-shot nearest assignment of `corpus` against `palette`.
///
/// # Errors
/// - [`TileError::EmptyPalette`] if `palette` is empty.
/// - [`TileError::ShapeMismatch`] on differing tile shapes.
pub fn assign_nearest(corpus: &TileCorpus, palette: &Palette) -> Result<Assignment, TileError> {
    NearestAssigner::new(palette)?.assign(corpus)
}

#[inline]
fn squared_distance(a: &[f32], b: &[f32]) -> f32 {
    a.iter().zip(b).map(|(x, y)| (x - y) * (x - y)).sum()
}
