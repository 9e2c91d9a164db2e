use thiserror::Error;

/// Contract violations raised by the tile palette core.
///
/// None of these are transient: each one means the caller handed over bad
/// input (or, for [`TileError::InvalidBudget`], that a palette budget could
/// not be honoured). The run is aborted and the error surfaced as-is.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TileError {
    /// Dither matrix size is not a power of two ≥ 1.
    #[error("Taille de matrice de tramage invalide : {0} (puissance de deux attendue)")]
    InvalidSize(usize),

    /// Unrecognized dithering mode string.
    #[error("Mode de tramage inconnu : '{0}' (ordered, error ou none)")]
    InvalidDitherMode(String),

    /// A swatch was requested from zero tiles.
    #[error("Impossible de construire une swatch à partir d'un bin vide")]
    EmptyBin,

    /// A bin with tiles left to cover ended up with no palette budget.
    #[error("Budget de palette invalide : {tiles} tuiles pour un budget de {budget}")]
    InvalidBudget {
        /// Tiles still waiting for a swatch.
        tiles: usize,
        /// Budget left for them (negative when pre-extraction overdrew it).
        budget: i64,
    },

    /// Tiles or buffers of inconsistent dimensions.
    #[error("Dimensions incohérentes : attendu {expected:?}, reçu {found:?}")]
    ShapeMismatch {
        /// `(width, height)` the component was built for.
        expected: (usize, usize),
        /// `(width, height)` it was given.
        found: (usize, usize),
    },

    /// A tile dimension of zero.
    #[error("Dimensions de tuile invalides : {width}×{height}")]
    InvalidShape {
        /// Width value.
        width: usize,
        /// Height value.
        height: usize,
    },

    /// Nearest assignment against a palette with no swatch.
    #[error("Palette vide : aucune swatch à assigner")]
    EmptyPalette,

    /// An index points past the end of the palette or corpus it addresses.
    #[error("Index {index} hors limites ({len} éléments)")]
    IndexOutOfRange {
        /// Offending index.
        index: usize,
        /// Length of the indexed collection.
        len: usize,
    },
}
