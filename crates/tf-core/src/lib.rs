//! Types, errors, and configuration shared across the tilefont workspace.
//!
//! Tiles, corpora, palettes and assignments live here so that the dithering,
//! quantization, source and export crates agree on one representation.

pub mod config;
pub mod error;
pub mod frame;
pub mod tile;
pub mod traits;

pub use config::{DitherMode, RunConfig};
pub use error::TileError;
pub use frame::{CONTRAST_GAIN, GrayFrame};
pub use tile::{Assignment, Palette, Tile, TileCorpus, TileShape};
pub use traits::{LogProgress, NoProgress, ProgressObserver};
