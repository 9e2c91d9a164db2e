/// Reçoit la progression de la construction de palette.
///
/// Remplace l'affichage direct : le coeur reste pur, l'appelant décide quoi
/// faire des événements. Toutes les méthodes ont un défaut vide.
///
/// # Example
/// ```
/// use tf_core::traits::ProgressObserver;
///
/// #[derive(Default)]
/// struct Counter { swatches: usize }
/// impl ProgressObserver for Counter {
///     fn swatch_built(&mut self, _index: usize, _tiles: usize) { self.swatches += 1; }
/// }
/// ```
pub trait ProgressObserver {
    /// Pure white / pure black tiles were pulled out before partitioning.
    fn special_tiles(&mut self, _white: usize, _black: usize, _remaining: usize) {}

    /// A bin of `tiles` tiles with `budget` > 1 was split in two.
    fn bin_split(&mut self, _tiles: usize, _budget: usize) {}

    /// A bin emptied out by a split was dropped along with its budget.
    fn bin_dropped(&mut self, _budget: usize) {}

    /// Swatch `index` was appended to the palette, owning `tiles` tiles.
    fn swatch_built(&mut self, _index: usize, _tiles: usize) {}

    /// Nearest assignment finished for `tiles` tiles against `swatches` swatches.
    fn tiles_assigned(&mut self, _tiles: usize, _swatches: usize) {}
}

/// Observer qui ignore tout.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoProgress;

impl ProgressObserver for NoProgress {}

/// Observer qui relaie la progression vers `log`.
///
/// Les splits sont comptés et journalisés en `debug` tous les `every` splits.
#[derive(Clone, Debug)]
pub struct LogProgress {
    every: usize,
    splits: usize,
    dropped_budget: usize,
}

impl LogProgress {
    /// Log one split line every `every` splits (at least 1).
    #[must_use]
    pub fn new(every: usize) -> Self {
        Self {
            every: every.max(1),
            splits: 0,
            dropped_budget: 0,
        }
    }

    /// Splits seen so far.
    #[must_use]
    pub fn splits(&self) -> usize {
        self.splits
    }

    /// Total budget lost to empty bins.
    #[must_use]
    pub fn dropped_budget(&self) -> usize {
        self.dropped_budget
    }
}

impl Default for LogProgress {
    fn default() -> Self {
        Self::new(256)
    }
}

impl ProgressObserver for LogProgress {
    fn special_tiles(&mut self, white: usize, black: usize, remaining: usize) {
        if white > 0 {
            log::info!("{white} tuiles blanc pur trouvées");
        }
        if black > 0 {
            log::info!("{black} tuiles noir pur trouvées");
        }
        if white > 0 || black > 0 {
            log::info!("{remaining} tuiles restantes");
        }
    }

    fn bin_split(&mut self, tiles: usize, budget: usize) {
        self.splits += 1;
        if self.splits % self.every == 0 {
            log::debug!("[{}] découpe de {tiles} tuiles pour {budget} swatches", self.splits);
        }
    }

    fn bin_dropped(&mut self, budget: usize) {
        self.dropped_budget += budget;
        log::debug!("bin vide abandonné (budget {budget})");
    }

    fn swatch_built(&mut self, index: usize, tiles: usize) {
        log::trace!("swatch {index} : {tiles} tuiles");
    }

    fn tiles_assigned(&mut self, tiles: usize, swatches: usize) {
        log::info!("{tiles} tuiles assignées parmi {swatches} swatches");
    }
}
