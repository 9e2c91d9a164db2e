use tf_core::{DitherMode, Tile, TileCorpus, TileError, TileShape};

use crate::matrix::DitherMatrix;
use crate::stucki::stucki_in_place;

/// Seuil fixe du mode `none` et de la passe finale Stucki.
pub const FLAT_THRESHOLD: u8 = 127;

/// Réduit un ensemble de tuiles à une swatch binaire.
///
/// La matrice de Bayer n'est construite qu'en mode `ordered`, une fois, puis
/// réutilisée pour chaque bin.
///
/// # Example
/// ```
/// use tf_core::{DitherMode, TileCorpus, TileShape, Tile};
/// use tf_dither::swatch::SwatchBuilder;
///
/// let shape = TileShape::new(2, 2).unwrap();
/// let corpus = TileCorpus::from_tiles(shape, [Tile::filled(shape, 200), Tile::filled(shape, 100)]).unwrap();
/// let builder = SwatchBuilder::new(DitherMode::None, 8).unwrap();
/// let swatch = builder.build(&corpus, &[0, 1]).unwrap();
/// assert_eq!(swatch, Tile::filled(shape, 255));
/// ```
#[derive(Clone, Debug)]
pub struct SwatchBuilder {
    mode: DitherMode,
    method: Method,
}

#[derive(Clone, Debug)]
enum Method {
    Ordered(DitherMatrix),
    Stucki,
    Flat,
}

impl SwatchBuilder {
    /// Builder for `mode`; `matrix_size` is only used by ordered dithering.
    ///
    /// # Errors
    /// Returns [`TileError::InvalidSize`] if the mode is ordered and
    /// `matrix_size` is not a power of two.
    pub fn new(mode: DitherMode, matrix_size: usize) -> Result<Self, TileError> {
        let method = match mode {
            DitherMode::Ordered => Method::Ordered(DitherMatrix::new(matrix_size)?),
            DitherMode::Error => Method::Stucki,
            DitherMode::None => Method::Flat,
        };
        Ok(Self { mode, method })
    }

    /// Binarisation mode.
    #[must_use]
    pub fn mode(&self) -> DitherMode {
        self.mode
    }

    /// Mean of the selected tiles, binarised.
    ///
    /// # Errors
    /// See [`mean_tile`].
    pub fn build(&self, corpus: &TileCorpus, indices: &[usize]) -> Result<Tile, TileError> {
        let mean = mean_tile(corpus, indices)?;
        self.binarize(&mean)
    }

    /// Binarise an already averaged tile.
    ///
    /// # Errors
    /// Propagates [`TileError::ShapeMismatch`] from buffer reconstruction;
    /// a well-formed tile never triggers it.
    pub fn binarize(&self, mean: &Tile) -> Result<Tile, TileError> {
        let shape = mean.shape();
        match &self.method {
            Method::Ordered(matrix) => ordered(mean, matrix),
            Method::Stucki => {
                let mut buf: Vec<i32> = mean.pixels().iter().map(|&p| i32::from(p)).collect();
                stucki_in_place(&mut buf, shape.width, shape.height)?;
                Tile::new(shape, buf.into_iter().map(|v| v as u8).collect())
            }
            Method::Flat => threshold(mean),
        }
    }
}

/// Elementwise integer mean of the selected tiles, truncated.
///
/// # Errors
/// - [`TileError::EmptyBin`] if `indices` is empty.
/// - [`TileError::IndexOutOfRange`] if an index is past the end of `corpus`.
///
/// # Example
/// ```
/// use tf_core::{TileCorpus, TileShape, Tile};
/// use tf_dither::swatch::mean_tile;
///
/// let shape = TileShape::new(1, 1).unwrap();
/// let corpus = TileCorpus::from_tiles(shape, [Tile::filled(shape, 10), Tile::filled(shape, 13)]).unwrap();
/// assert_eq!(mean_tile(&corpus, &[0, 1]).unwrap().pixels(), &[11]);
/// ```
pub fn mean_tile(corpus: &TileCorpus, indices: &[usize]) -> Result<Tile, TileError> {
    if indices.is_empty() {
        return Err(TileError::EmptyBin);
    }
    if let Some(&index) = indices.iter().find(|&&i| i >= corpus.len()) {
        return Err(TileError::IndexOutOfRange {
            index,
            len: corpus.len(),
        });
    }
    let shape: TileShape = corpus.shape();
    let mut sums = vec![0u64; shape.area()];
    for &i in indices {
        for (acc, &p) in sums.iter_mut().zip(corpus.tile(i)) {
            *acc += u64::from(p);
        }
    }
    let count = indices.len() as u64;
    Tile::new(shape, sums.into_iter().map(|s| (s / count) as u8).collect())
}

fn threshold(mean: &Tile) -> Result<Tile, TileError> {
    let pixels = mean
        .pixels()
        .iter()
        .map(|&p| if p > FLAT_THRESHOLD { 255 } else { 0 })
        .collect();
    Tile::new(mean.shape(), pixels)
}

fn ordered(mean: &Tile, matrix: &DitherMatrix) -> Result<Tile, TileError> {
    let shape = mean.shape();
    let mut pixels = Vec::with_capacity(shape.area());
    for y in 0..shape.height {
        for x in 0..shape.width {
            let v = f64::from(mean.get(x, y));
            pixels.push(if v > matrix.threshold_at_pixel(x, y) { 255 } else { 0 });
        }
    }
    Tile::new(shape, pixels)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn corpus_of(shape: TileShape, values: &[u8]) -> TileCorpus {
        TileCorpus::from_tiles(shape, values.iter().map(|&v| Tile::filled(shape, v))).unwrap()
    }

    #[test]
    fn empty_bin_fails() {
        let shape = TileShape::new(2, 2).unwrap();
        let corpus = corpus_of(shape, &[10]);
        for mode in [DitherMode::Ordered, DitherMode::Error, DitherMode::None] {
            let builder = SwatchBuilder::new(mode, 8).unwrap();
            assert_eq!(builder.build(&corpus, &[]), Err(TileError::EmptyBin));
        }
    }

    #[test]
    fn index_past_the_corpus_fails() {
        let shape = TileShape::new(2, 2).unwrap();
        let corpus = corpus_of(shape, &[10, 20]);
        let builder = SwatchBuilder::new(DitherMode::None, 8).unwrap();
        assert_eq!(
            builder.build(&corpus, &[1, 5]),
            Err(TileError::IndexOutOfRange { index: 5, len: 2 })
        );
    }

    #[test]
    fn flat_threshold_sides() {
        let shape = TileShape::new(3, 3).unwrap();
        let corpus = corpus_of(shape, &[127, 128, 129]);
        let builder = SwatchBuilder::new(DitherMode::None, 8).unwrap();
        assert_eq!(builder.build(&corpus, &[0]).unwrap(), Tile::filled(shape, 0));
        assert_eq!(builder.build(&corpus, &[1]).unwrap(), Tile::filled(shape, 255));
        assert_eq!(builder.build(&corpus, &[2]).unwrap(), Tile::filled(shape, 255));
    }

    #[test]
    fn mean_truncates() {
        let shape = TileShape::new(1, 1).unwrap();
        let corpus = corpus_of(shape, &[127, 128]);
        // (127 + 128) / 2 = 127.5 → 127 → noir en mode none
        assert_eq!(mean_tile(&corpus, &[0, 1]).unwrap().pixels(), &[127]);
        let builder = SwatchBuilder::new(DitherMode::None, 8).unwrap();
        assert_eq!(builder.build(&corpus, &[0, 1]).unwrap().pixels(), &[0]);
    }

    #[test]
    fn ordered_mid_gray_on_two_by_two() {
        let shape = TileShape::new(2, 2).unwrap();
        let corpus = corpus_of(shape, &[128]);
        let builder = SwatchBuilder::new(DitherMode::Ordered, 2).unwrap();
        // seuils lus en [x][y] : (0,0)=0, (1,0)=191.25, (0,1)=127.5, (1,1)=63.75
        let swatch = builder.build(&corpus, &[0]).unwrap();
        assert_eq!(swatch.pixels(), &[255, 0, 255, 255]);
    }

    #[test]
    fn ordered_black_stays_black_and_white_stays_white() {
        let shape = TileShape::new(8, 8).unwrap();
        let corpus = corpus_of(shape, &[0, 255]);
        let builder = SwatchBuilder::new(DitherMode::Ordered, 8).unwrap();
        assert_eq!(builder.build(&corpus, &[0]).unwrap(), Tile::filled(shape, 0));
        assert_eq!(builder.build(&corpus, &[1]).unwrap(), Tile::filled(shape, 255));
    }

    #[test]
    fn ordered_coverage_tracks_gray_level() {
        let shape = TileShape::new(8, 8).unwrap();
        let corpus = corpus_of(shape, &[64, 192]);
        let builder = SwatchBuilder::new(DitherMode::Ordered, 8).unwrap();
        let dark = builder.build(&corpus, &[0]).unwrap();
        let light = builder.build(&corpus, &[1]).unwrap();
        let on = |t: &Tile| t.pixels().iter().filter(|&&p| p == 255).count();
        assert!(on(&dark) < on(&light));
        // 64 > r·255/64 ⇔ r ≤ 16 → 17 cellules allumées
        assert_eq!(on(&dark), 17);
    }

    #[test]
    fn error_mode_is_binary() {
        let shape = TileShape::new(8, 8).unwrap();
        let corpus = corpus_of(shape, &[90, 140, 200]);
        let builder = SwatchBuilder::new(DitherMode::Error, 8).unwrap();
        let swatch = builder.build(&corpus, &[0, 1, 2]).unwrap();
        assert!(swatch.is_binary());
    }

    #[test]
    fn bad_matrix_size_only_matters_for_ordered() {
        assert_eq!(
            SwatchBuilder::new(DitherMode::Ordered, 6).unwrap_err(),
            TileError::InvalidSize(6)
        );
        assert!(SwatchBuilder::new(DitherMode::None, 6).is_ok());
    }
}
