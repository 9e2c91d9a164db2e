//! Construction de palette par bissection récursive du corpus.
//!
//! Chaque bin porte un ensemble de tuiles et un budget de swatches. Un bin de
//! budget 1 devient une swatch ; au-delà il est coupé en deux sur le pixel de
//! variance maximale, le budget partagé `b/2` / `b - b/2` sans regarder la
//! taille des deux moitiés.

use std::collections::VecDeque;

use tf_core::{
    Assignment, DitherMode, NoProgress, Palette, ProgressObserver, Tile, TileCorpus, TileError,
};
use tf_dither::SwatchBuilder;

/// Ordre de dépilement de la file de bins.
///
/// N'influe que sur l'ordre de la palette, jamais sur quelles tuiles
/// partagent une swatch ni sur son contenu.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum QueueOrder {
    /// Breadth-first (default).
    #[default]
    Fifo,
    /// Depth-first.
    Lifo,
}

/// Unité de travail : des index de tuiles et le nombre de swatches à en tirer.
#[derive(Debug)]
struct Bin {
    indices: Vec<usize>,
    budget: usize,
}

/// Moteur de quantification.
///
/// # Example
/// ```
/// use tf_core::{DitherMode, NoProgress, Tile, TileCorpus, TileShape};
/// use tf_palette::quantize::{QueueOrder, Quantizer};
///
/// let shape = TileShape::new(2, 2).unwrap();
/// let tiles = [30u8, 40, 200, 210].map(|v| Tile::filled(shape, v));
/// let corpus = TileCorpus::from_tiles(shape, tiles).unwrap();
/// let (palette, assignment) = Quantizer::new(DitherMode::None)
///     .order(QueueOrder::Lifo)
///     .run(&corpus, 2, &mut NoProgress)
///     .unwrap();
/// assert_eq!(palette.len(), 2);
/// assert_eq!(assignment[0], assignment[1]);
/// assert_ne!(assignment[1], assignment[2]);
/// ```
#[derive(Clone, Debug)]
pub struct Quantizer {
    mode: DitherMode,
    matrix_size: usize,
    order: QueueOrder,
}

impl Quantizer {
    /// Quantizer with an 8×8 Bayer matrix and FIFO processing.
    #[must_use]
    pub fn new(mode: DitherMode) -> Self {
        Self {
            mode,
            matrix_size: 8,
            order: QueueOrder::Fifo,
        }
    }

    /// Side of the Bayer matrix used by ordered dithering.
    #[must_use]
    pub fn matrix_size(mut self, size: usize) -> Self {
        self.matrix_size = size;
        self
    }

    /// Work queue processing order.
    #[must_use]
    pub fn order(mut self, order: QueueOrder) -> Self {
        self.order = order;
        self
    }

    /// Build a palette of at most `n` swatches and assign every tile to one.
    ///
    /// Pure white tiles get their own swatch first, then pure black ones,
    /// each taking one unit of budget. A split that leaves one side empty
    /// drops that side's budget: the palette then holds fewer than `n`
    /// swatches.
    ///
    /// # Errors
    /// - [`TileError::InvalidSize`] for a bad matrix size in ordered mode.
    /// - [`TileError::InvalidBudget`] if tiles remain once the budget is
    ///   exhausted (e.g. `n = 0`, or `n = 1` with white tiles and others).
    pub fn run(
        &self,
        corpus: &TileCorpus,
        n: usize,
        observer: &mut dyn ProgressObserver,
    ) -> Result<(Palette, Assignment), TileError> {
        let builder = SwatchBuilder::new(self.mode, self.matrix_size)?;
        let shape = corpus.shape();
        let mut palette = Palette::new(shape);
        let mut assignment = vec![0usize; corpus.len()];
        let mut covered = 0usize;

        // === Pré-extraction blanc / noir pur ===
        let mut white = Vec::new();
        let mut black = Vec::new();
        let mut rest = Vec::with_capacity(corpus.len());
        for (i, tile) in corpus.iter().enumerate() {
            if tile.iter().all(|&p| p == 255) {
                white.push(i);
            } else if tile.iter().all(|&p| p == 0) {
                black.push(i);
            } else {
                rest.push(i);
            }
        }
        observer.special_tiles(white.len(), black.len(), rest.len());

        let mut budget = n as i64;
        for (indices, value) in [(&white, 255u8), (&black, 0u8)] {
            if indices.is_empty() {
                continue;
            }
            let idx = palette.push(Tile::filled(shape, value))?;
            for &i in indices {
                assignment[i] = idx;
            }
            covered += indices.len();
            observer.swatch_built(idx, indices.len());
            budget -= 1;
        }

        let budget = match usize::try_from(budget) {
            Ok(b) => b,
            Err(_) if rest.is_empty() => 0,
            Err(_) => {
                return Err(TileError::InvalidBudget {
                    tiles: rest.len(),
                    budget,
                });
            }
        };

        // === Bissection ===
        let mut queue = VecDeque::new();
        queue.push_back(Bin {
            indices: rest,
            budget,
        });

        while let Some(bin) = self.pop(&mut queue) {
            if bin.indices.is_empty() {
                if bin.budget > 0 {
                    observer.bin_dropped(bin.budget);
                }
                continue;
            }
            match bin.budget {
                0 => {
                    return Err(TileError::InvalidBudget {
                        tiles: bin.indices.len(),
                        budget: 0,
                    });
                }
                1 => {
                    let swatch = builder.build(corpus, &bin.indices)?;
                    let idx = palette.push(swatch)?;
                    for &i in &bin.indices {
                        assignment[i] = idx;
                    }
                    covered += bin.indices.len();
                    observer.swatch_built(idx, bin.indices.len());
                }
                b => {
                    observer.bin_split(bin.indices.len(), b);
                    let (low, high) = split_bin(corpus, &bin.indices);
                    let b1 = b / 2;
                    queue.push_back(Bin {
                        indices: low,
                        budget: b1,
                    });
                    queue.push_back(Bin {
                        indices: high,
                        budget: b - b1,
                    });
                }
            }
        }

        debug_assert_eq!(covered, corpus.len(), "every tile must be assigned once");
        log::info!(
            "palette de {} swatches pour {} tuiles ({} demandées)",
            palette.len(),
            corpus.len(),
            n
        );
        Ok((palette, Assignment::new(assignment)))
    }

    fn pop(&self, queue: &mut VecDeque<Bin>) -> Option<Bin> {
        match self.order {
            QueueOrder::Fifo => queue.pop_front(),
            QueueOrder::Lifo => queue.pop_back(),
        }
    }
}

/// `quantize(tiles, n, mode)` with defaults: 8×8 matrix, FIFO, no observer.
///
/// # Errors
/// See [`Quantizer::run`].
pub fn quantize(
    corpus: &TileCorpus,
    n: usize,
    mode: DitherMode,
) -> Result<(Palette, Assignment), TileError> {
    Quantizer::new(mode).run(corpus, n, &mut NoProgress)
}

/// Position (row-major) of the pixel with the largest population variance
/// across the selected tiles; the first one wins on ties.
///
/// Computed exactly: `count² · var = count · Σx² − (Σx)²`.
///
/// # Panics
/// Panics if an index is past the end of `corpus`; the quantizer only
/// passes indices it took from the corpus itself.
#[must_use]
pub fn most_varied_pixel(corpus: &TileCorpus, indices: &[usize]) -> usize {
    let area = corpus.shape().area();
    let mut sums = vec![0u64; area];
    let mut squares = vec![0u64; area];
    for &i in indices {
        for (k, &p) in corpus.tile(i).iter().enumerate() {
            let v = u64::from(p);
            sums[k] += v;
            squares[k] += v * v;
        }
    }
    let count = indices.len() as u128;
    let mut best = 0usize;
    let mut best_score = 0u128;
    for k in 0..area {
        let s = u128::from(sums[k]);
        let score = count * u128::from(squares[k]) - s * s;
        if score > best_score {
            best = k;
            best_score = score;
        }
    }
    best
}

/// Split `indices` on their most varied pixel: values strictly below the
/// mean go low, the rest high. Order within each side is preserved.
fn split_bin(corpus: &TileCorpus, indices: &[usize]) -> (Vec<usize>, Vec<usize>) {
    let pixel = most_varied_pixel(corpus, indices);
    let sum: u64 = indices.iter().map(|&i| u64::from(corpus.tile(i)[pixel])).sum();
    let count = indices.len() as u64;
    // v < sum / count  ⇔  v · count < sum
    indices
        .iter()
        .copied()
        .partition(|&i| u64::from(corpus.tile(i)[pixel]) * count < sum)
}
