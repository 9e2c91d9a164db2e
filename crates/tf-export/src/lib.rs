/// Sorties de tilefont : fichiers FONT (palette et index), reconstruction des
/// frames à partir des swatches et encodage vidéo via ffmpeg.
pub mod font;
pub mod mosaic;
pub mod muxer;

pub use font::{save_indices, save_palette, write_indices, write_palette};
pub use mosaic::frame_from_tiles;
pub use muxer::GrayMuxer;
