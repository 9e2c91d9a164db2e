use rayon::prelude::*;
use tf_core::{GrayFrame, Palette, TileError};

/// Rebuild a gray frame by laying swatches out on an `nx × ny` grid.
///
/// `indices` lists one palette index per tile, row-major, the same order
/// tiles were sliced in.
///
/// # Errors
/// - [`TileError::ShapeMismatch`] if `indices.len() != nx · ny` (reported as
///   `(nx, ny)` vs `(len, 1)`).
/// - [`TileError::IndexOutOfRange`] if an index points past the palette.
///
/// # Example
/// ```
/// use tf_core::{Palette, Tile, TileShape};
/// use tf_export::mosaic::frame_from_tiles;
///
/// let shape = TileShape::new(1, 1).unwrap();
/// let palette = Palette::from_swatches(shape, vec![Tile::filled(shape, 0), Tile::filled(shape, 255)]).unwrap();
/// let frame = frame_from_tiles(&palette, &[1, 0, 0, 1], 2, 2).unwrap();
/// assert_eq!(frame.data, vec![255, 0, 0, 255]);
/// ```
pub fn frame_from_tiles(
    palette: &Palette,
    indices: &[usize],
    nx: usize,
    ny: usize,
) -> Result<GrayFrame, TileError> {
    if indices.len() != nx * ny {
        return Err(TileError::ShapeMismatch {
            expected: (nx, ny),
            found: (indices.len(), 1),
        });
    }
    if let Some(&index) = indices.iter().find(|&&i| i >= palette.len()) {
        return Err(TileError::IndexOutOfRange {
            index,
            len: palette.len(),
        });
    }

    let shape = palette.shape();
    let width = shape.width * nx;
    let height = shape.height * ny;
    let mut frame = GrayFrame::new(width as u32, height as u32);
    if width == 0 || height == 0 {
        return Ok(frame);
    }

    // Une bande horizontale de tuiles par tâche.
    frame
        .data
        .par_chunks_mut(width * shape.height)
        .zip(indices.par_chunks(nx))
        .for_each(|(band, row_indices)| {
            for (tx, &idx) in row_indices.iter().enumerate() {
                let Some(swatch) = palette.get(idx) else {
                    continue;
                };
                for (y, row) in swatch.rows().enumerate() {
                    let start = y * width + tx * shape.width;
                    band[start..start + shape.width].copy_from_slice(row);
                }
            }
        });
    Ok(frame)
}
