//! Matrice de seuils pour le tramage ordonné (Bayer récursif).
//!
//! `R(1) = [0]`, puis chaque quadrant de `R(n)` est `4·R(n/2)` décalé de
//! 0 (haut-gauche), 2 (haut-droite), 3 (bas-gauche), 1 (bas-droite).
//! Le niveau normalisé d'une cellule vaut `R / n²`, le seuil `R / n² · 255`.

use tf_core::TileError;

/// Matrice de Bayer `n × n`, `n` puissance de deux.
///
/// # Example
/// ```
/// use tf_dither::matrix::DitherMatrix;
/// let m = DitherMatrix::new(2).unwrap();
/// assert_eq!(m.rank(0, 1), 2);
/// assert_eq!(m.threshold(1, 0), 191.25);
/// assert!(DitherMatrix::new(3).is_err());
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DitherMatrix {
    size: usize,
    ranks: Vec<u32>,
}

impl DitherMatrix {
    /// Build the `size × size` matrix.
    ///
    /// # Errors
    /// Returns [`TileError::InvalidSize`] unless `size` is a power of two ≥ 1.
    pub fn new(size: usize) -> Result<Self, TileError> {
        if !size.is_power_of_two() {
            return Err(TileError::InvalidSize(size));
        }
        Ok(Self {
            size,
            ranks: bayer_ranks(size),
        })
    }

    /// Side length.
    #[inline(always)]
    #[must_use]
    pub fn size(&self) -> usize {
        self.size
    }

    /// Integer rank in `0..size²` at (`row`, `col`).
    #[inline(always)]
    #[must_use]
    pub fn rank(&self, row: usize, col: usize) -> u32 {
        self.ranks[row * self.size + col]
    }

    /// Normalized level `rank / size²` in `[0, 1)`.
    #[inline(always)]
    #[must_use]
    pub fn level(&self, row: usize, col: usize) -> f64 {
        f64::from(self.rank(row, col)) / (self.size * self.size) as f64
    }

    /// Threshold on the `[0, 255]` intensity scale.
    #[inline(always)]
    #[must_use]
    pub fn threshold(&self, row: usize, col: usize) -> f64 {
        self.level(row, col) * 255.0
    }

    /// Threshold applied to the tile pixel at column `x`, row `y`.
    ///
    /// The matrix is indexed `[x mod n][y mod n]`: the column coordinate
    /// selects the matrix row. Reference swatches were produced with this
    /// lookup, so it is kept.
    #[inline(always)]
    #[must_use]
    pub fn threshold_at_pixel(&self, x: usize, y: usize) -> f64 {
        self.threshold(x % self.size, y % self.size)
    }
}

fn bayer_ranks(n: usize) -> Vec<u32> {
    if n == 1 {
        return vec![0];
    }
    let m = n / 2;
    let half = bayer_ranks(m);
    let mut out = vec![0u32; n * n];
    for row in 0..n {
        for col in 0..n {
            let offset = match (row >= m, col >= m) {
                (false, false) => 0,
                (false, true) => 2,
                (true, false) => 3,
                (true, true) => 1,
            };
            out[row * n + col] = 4 * half[(row % m) * m + col % m] + offset;
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Bayer 8×8 classique (niveaux 0-63).
    const BAYER_8X8: [[u32; 8]; 8] = [
        [0, 32, 8, 40, 2, 34, 10, 42],
        [48, 16, 56, 24, 50, 18, 58, 26],
        [12, 44, 4, 36, 14, 46, 6, 38],
        [60, 28, 52, 20, 62, 30, 54, 22],
        [3, 35, 11, 43, 1, 33, 9, 41],
        [51, 19, 59, 27, 49, 17, 57, 25],
        [15, 47, 7, 39, 13, 45, 5, 37],
        [63, 31, 55, 23, 61, 29, 53, 21],
    ];

    #[test]
    fn size_one_is_zero() {
        let m = DitherMatrix::new(1).unwrap();
        assert_eq!(m.rank(0, 0), 0);
        assert_eq!(m.threshold(0, 0), 0.0);
    }

    #[test]
    fn size_two_quadrant_offsets() {
        let m = DitherMatrix::new(2).unwrap();
        assert_eq!(
            [m.rank(0, 0), m.rank(0, 1), m.rank(1, 0), m.rank(1, 1)],
            [0, 2, 3, 1]
        );
        assert_eq!(m.threshold(0, 0), 0.0);
        assert_eq!(m.threshold(0, 1), 127.5);
        assert_eq!(m.threshold(1, 0), 191.25);
        assert_eq!(m.threshold(1, 1), 63.75);
    }

    #[test]
    fn size_eight_matches_classic_table() {
        let m = DitherMatrix::new(8).unwrap();
        for (row, expected) in BAYER_8X8.iter().enumerate() {
            for (col, &rank) in expected.iter().enumerate() {
                assert_eq!(m.rank(row, col), rank, "cellule ({row}, {col})");
            }
        }
    }

    #[test]
    fn ranks_are_a_permutation() {
        for n in [1usize, 2, 4, 16, 32] {
            let m = DitherMatrix::new(n).unwrap();
            let mut seen = vec![false; n * n];
            for row in 0..n {
                for col in 0..n {
                    let r = m.rank(row, col) as usize;
                    assert!(!seen[r], "rang {r} dupliqué pour n={n}");
                    seen[r] = true;
                }
            }
        }
    }

    #[test]
    fn non_powers_of_two_fail() {
        for n in [0usize, 3, 5, 6, 7, 12, 24, 100] {
            assert_eq!(DitherMatrix::new(n), Err(TileError::InvalidSize(n)));
        }
    }

    #[test]
    fn pixel_lookup_is_transposed() {
        let m = DitherMatrix::new(2).unwrap();
        // pixel column 1, row 0 reads matrix row 1, column 0
        assert_eq!(m.threshold_at_pixel(1, 0), 191.25);
        assert_eq!(m.threshold_at_pixel(0, 1), 127.5);
        assert_eq!(m.threshold_at_pixel(3, 2), m.threshold(1, 0));
    }
}
