/// Construction de palette et affectation des tuiles pour tilefont.
///
/// Quantification par bissection récursive, affectation au plus proche
/// après flou gaussien, et palette aléatoire de référence.
pub mod blur;
pub mod nearest;
pub mod quantize;
pub mod random;

pub use nearest::{NearestAssigner, assign_nearest};
pub use quantize::{QueueOrder, Quantizer, quantize};
pub use random::random_palette;
