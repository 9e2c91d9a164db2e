use tf_core::{GrayFrame, TileCorpus, TileError};

/// Découpe `frame` en `nx × ny` tuiles et les ajoute à `corpus`.
///
/// Parcours row-major sur la grille : ligne de tuiles par ligne, de gauche à
/// droite. La frame doit mesurer exactement `width·nx × height·ny`.
///
/// # Errors
/// Returns [`TileError::ShapeMismatch`] with `(width·nx, height·ny)` as the
/// expected dimensions if the frame has any other size.
///
/// # Example
/// ```
/// use tf_core::{GrayFrame, TileCorpus, TileShape};
/// use tf_source::tiling::tiles_from_frame;
///
/// let frame = GrayFrame { data: (0..16).collect(), width: 4, height: 4 };
/// let mut corpus = TileCorpus::new(TileShape::new(2, 2).unwrap());
/// tiles_from_frame(&frame, 2, 2, &mut corpus).unwrap();
/// assert_eq!(corpus.len(), 4);
/// assert_eq!(corpus.tile(1), &[2, 3, 6, 7]);
/// ```
pub fn tiles_from_frame(
    frame: &GrayFrame,
    nx: usize,
    ny: usize,
    corpus: &mut TileCorpus,
) -> Result<(), TileError> {
    let shape = corpus.shape();
    let (fw, fh) = (frame.width as usize, frame.height as usize);
    let expected = (shape.width * nx, shape.height * ny);
    if (fw, fh) != expected || frame.data.len() != fw * fh {
        return Err(TileError::ShapeMismatch {
            expected,
            found: (fw, fh),
        });
    }

    let mut scratch = vec![0u8; shape.area()];
    for ty in 0..ny {
        for tx in 0..nx {
            for row in 0..shape.height {
                let src = (ty * shape.height + row) * fw + tx * shape.width;
                scratch[row * shape.width..(row + 1) * shape.width]
                    .copy_from_slice(&frame.data[src..src + shape.width]);
            }
            corpus.push_pixels(&scratch)?;
        }
    }
    Ok(())
}
