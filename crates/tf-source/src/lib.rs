/// Sources de frames pour tilefont : vidéo via ffmpeg, images fixes,
/// redimensionnement et découpage en tuiles.
pub mod image;
pub mod resize;
pub mod tiling;

#[cfg(feature = "video")]
pub mod video;

pub use tiling::tiles_from_frame;
