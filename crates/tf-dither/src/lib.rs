/// Binarisation de tuiles pour tilefont.
///
/// Matrice de Bayer récursive, diffusion d'erreur Stucki, et construction
/// d'une swatch binaire à partir d'un ensemble de tuiles.
pub mod matrix;
pub mod stucki;
pub mod swatch;

pub use matrix::DitherMatrix;
pub use stucki::stucki_in_place;
pub use swatch::{SwatchBuilder, mean_tile};
