use std::ops::Deref;

use crate::error::TileError;

/// Dimensions d'une tuile : `width` = sizeX, `height` = sizeY.
///
/// # Example
/// ```
/// use tf_core::tile::TileShape;
/// let shape = TileShape::new(8, 8).unwrap();
/// assert_eq!(shape.area(), 64);
/// assert!(TileShape::new(0, 8).is_err());
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TileShape {
    /// Width in pixels (sizeX).
    pub width: usize,
    /// Height in pixels (sizeY).
    pub height: usize,
}

impl TileShape {
    /// Build a shape, rejecting zero dimensions.
    ///
    /// # Errors
    /// Returns [`TileError::InvalidShape`] if either dimension is zero.
    pub fn new(width: usize, height: usize) -> Result<Self, TileError> {
        if width == 0 || height == 0 {
            return Err(TileError::InvalidShape { width, height });
        }
        Ok(Self { width, height })
    }

    /// Number of pixels in one tile.
    #[inline(always)]
    #[must_use]
    pub const fn area(self) -> usize {
        self.width * self.height
    }

    /// `(width, height)` pair, as reported in errors.
    #[inline(always)]
    #[must_use]
    pub const fn dims(self) -> (usize, usize) {
        (self.width, self.height)
    }

    /// Fail with [`TileError::ShapeMismatch`] unless `other` equals `self`.
    ///
    /// # Errors
    /// Returns [`TileError::ShapeMismatch`] on differing dimensions.
    pub fn ensure(self, other: TileShape) -> Result<(), TileError> {
        if self == other {
            Ok(())
        } else {
            Err(TileError::ShapeMismatch {
                expected: self.dims(),
                found: other.dims(),
            })
        }
    }

    /// Fail with [`TileError::ShapeMismatch`] unless a flat buffer has
    /// exactly [`TileShape::area`] pixels. The mismatch reports `(len, 1)`.
    ///
    /// # Errors
    /// Returns [`TileError::ShapeMismatch`] on a wrong buffer length.
    pub fn ensure_len(self, len: usize) -> Result<(), TileError> {
        if len == self.area() {
            Ok(())
        } else {
            Err(TileError::ShapeMismatch {
                expected: self.dims(),
                found: (len, 1),
            })
        }
    }
}

/// Tuile en niveaux de gris, row-major, immuable une fois construite.
///
/// Une [`Tile`] dont tous les pixels valent 0 ou 255 est une swatch.
///
/// # Example
/// ```
/// use tf_core::tile::{Tile, TileShape};
/// let shape = TileShape::new(2, 2).unwrap();
/// let tile = Tile::new(shape, vec![0, 255, 255, 0]).unwrap();
/// assert_eq!(tile.get(1, 0), 255);
/// assert!(tile.is_binary());
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Tile {
    shape: TileShape,
    pixels: Vec<u8>,
}

impl Tile {
    /// Wrap a row-major pixel buffer.
    ///
    /// # Errors
    /// Returns [`TileError::ShapeMismatch`] if `pixels.len()` is not the
    /// shape's area.
    pub fn new(shape: TileShape, pixels: Vec<u8>) -> Result<Self, TileError> {
        shape.ensure_len(pixels.len())?;
        Ok(Self { shape, pixels })
    }

    /// Tile with every pixel set to `value`.
    #[must_use]
    pub fn filled(shape: TileShape, value: u8) -> Self {
        Self {
            shape,
            pixels: vec![value; shape.area()],
        }
    }

    /// Dimensions of this tile.
    #[inline(always)]
    #[must_use]
    pub fn shape(&self) -> TileShape {
        self.shape
    }

    /// Row-major pixels.
    #[inline(always)]
    #[must_use]
    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    /// Pixel at column `x`, row `y`.
    #[inline(always)]
    #[must_use]
    pub fn get(&self, x: usize, y: usize) -> u8 {
        debug_assert!(x < self.shape.width && y < self.shape.height, "pixel out of bounds");
        self.pixels[y * self.shape.width + x]
    }

    /// Iterate over rows.
    pub fn rows(&self) -> impl Iterator<Item = &[u8]> {
        self.pixels.chunks_exact(self.shape.width)
    }

    /// True if every pixel is 0 or 255.
    #[must_use]
    pub fn is_binary(&self) -> bool {
        self.pixels.iter().all(|&p| p == 0 || p == 255)
    }

    /// Consume the tile and return its pixels.
    #[must_use]
    pub fn into_pixels(self) -> Vec<u8> {
        self.pixels
    }
}

/// Corpus plat de tuiles d'une même forme.
///
/// L'index d'une tuile est sa position. Les tuiles d'une frame sont poussées
/// row-major, les frames dans l'ordre temporel : la reconstruction en aval
/// dépend de cet ordre.
///
/// # Example
/// ```
/// use tf_core::tile::{TileCorpus, TileShape};
/// let shape = TileShape::new(2, 1).unwrap();
/// let mut corpus = TileCorpus::new(shape);
/// corpus.push_pixels(&[10, 20]).unwrap();
/// corpus.push_pixels(&[30, 40]).unwrap();
/// assert_eq!(corpus.len(), 2);
/// assert_eq!(corpus.tile(1), &[30, 40]);
/// assert!(corpus.push_pixels(&[1, 2, 3]).is_err());
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TileCorpus {
    shape: TileShape,
    data: Vec<u8>,
}

impl TileCorpus {
    /// Empty corpus for tiles of `shape`.
    #[must_use]
    pub fn new(shape: TileShape) -> Self {
        Self {
            shape,
            data: Vec::new(),
        }
    }

    /// Empty corpus with room for `tiles` tiles.
    #[must_use]
    pub fn with_capacity(shape: TileShape, tiles: usize) -> Self {
        Self {
            shape,
            data: Vec::with_capacity(tiles * shape.area()),
        }
    }

    /// Build a corpus from owned tiles.
    ///
    /// # Errors
    /// Returns [`TileError::ShapeMismatch`] on the first tile whose shape
    /// differs from `shape`.
    pub fn from_tiles<I>(shape: TileShape, tiles: I) -> Result<Self, TileError>
    where
        I: IntoIterator<Item = Tile>,
    {
        let mut corpus = Self::new(shape);
        for tile in tiles {
            corpus.push(&tile)?;
        }
        Ok(corpus)
    }

    /// Append a tile.
    ///
    /// # Errors
    /// Returns [`TileError::ShapeMismatch`] if the tile's shape differs.
    pub fn push(&mut self, tile: &Tile) -> Result<(), TileError> {
        self.shape.ensure(tile.shape())?;
        self.data.extend_from_slice(tile.pixels());
        Ok(())
    }

    /// Append a tile given as a row-major pixel slice.
    ///
    /// # Errors
    /// Returns [`TileError::ShapeMismatch`] on a wrong slice length.
    pub fn push_pixels(&mut self, pixels: &[u8]) -> Result<(), TileError> {
        self.shape.ensure_len(pixels.len())?;
        self.data.extend_from_slice(pixels);
        Ok(())
    }

    /// Shape shared by every tile.
    #[inline(always)]
    #[must_use]
    pub fn shape(&self) -> TileShape {
        self.shape
    }

    /// Number of tiles.
    #[inline(always)]
    #[must_use]
    pub fn len(&self) -> usize {
        self.data.len() / self.shape.area()
    }

    /// True if the corpus holds no tile.
    #[inline(always)]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Pixels of tile `index`.
    ///
    /// # Panics
    /// Panics if `index >= self.len()`.
    #[inline(always)]
    #[must_use]
    pub fn tile(&self, index: usize) -> &[u8] {
        let area = self.shape.area();
        &self.data[index * area..(index + 1) * area]
    }

    /// Owned copy of tile `index`.
    #[must_use]
    pub fn to_tile(&self, index: usize) -> Tile {
        Tile {
            shape: self.shape,
            pixels: self.tile(index).to_vec(),
        }
    }

    /// Iterate over tiles in index order.
    pub fn iter(&self) -> std::slice::ChunksExact<'_, u8> {
        self.data.chunks_exact(self.shape.area())
    }

    /// New corpus made of the selected tiles, in the given order.
    ///
    /// # Panics
    /// Panics if an index is out of range.
    #[must_use]
    pub fn select<I>(&self, indices: I) -> Self
    where
        I: IntoIterator<Item = usize>,
    {
        let mut out = Self::new(self.shape);
        for i in indices {
            out.data.extend_from_slice(self.tile(i));
        }
        out
    }
}

/// Palette ordonnée de swatches binaires de même forme.
///
/// L'ordre n'a pas de sens en soi mais reste stable : les index de
/// l'[`Assignment`] pointent dedans.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Palette {
    shape: TileShape,
    swatches: Vec<Tile>,
}

impl Palette {
    /// Empty palette for swatches of `shape`.
    #[must_use]
    pub fn new(shape: TileShape) -> Self {
        Self {
            shape,
            swatches: Vec::new(),
        }
    }

    /// Build a palette from swatches.
    ///
    /// # Errors
    /// Returns [`TileError::ShapeMismatch`] if a swatch has another shape.
    pub fn from_swatches(shape: TileShape, swatches: Vec<Tile>) -> Result<Self, TileError> {
        for s in &swatches {
            shape.ensure(s.shape())?;
        }
        Ok(Self { shape, swatches })
    }

    /// Append a swatch and return its palette index.
    ///
    /// # Errors
    /// Returns [`TileError::ShapeMismatch`] if the swatch has another shape.
    pub fn push(&mut self, swatch: Tile) -> Result<usize, TileError> {
        self.shape.ensure(swatch.shape())?;
        debug_assert!(swatch.is_binary(), "swatch must only contain 0 and 255");
        self.swatches.push(swatch);
        Ok(self.swatches.len() - 1)
    }

    /// Shape shared by every swatch.
    #[must_use]
    pub fn shape(&self) -> TileShape {
        self.shape
    }

    /// Number of swatches.
    #[must_use]
    pub fn len(&self) -> usize {
        self.swatches.len()
    }

    /// True if the palette has no swatch.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.swatches.is_empty()
    }

    /// Swatch at `index`, if any.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&Tile> {
        self.swatches.get(index)
    }

    /// All swatches in palette order.
    #[must_use]
    pub fn swatches(&self) -> &[Tile] {
        &self.swatches
    }

    /// Iterate over swatches in palette order.
    pub fn iter(&self) -> std::slice::Iter<'_, Tile> {
        self.swatches.iter()
    }

    /// Index of the first swatch equal to `tile`.
    #[must_use]
    pub fn position(&self, tile: &Tile) -> Option<usize> {
        self.swatches.iter().position(|s| s == tile)
    }
}

/// Tile index → palette index, one entry per corpus tile.
///
/// # Example
/// ```
/// use tf_core::tile::Assignment;
/// let a = Assignment::new(vec![0, 1, 1, 0, 2, 2]);
/// assert!(a.is_valid_for(3));
/// let frames: Vec<&[usize]> = a.frames(3).collect();
/// assert_eq!(frames[1], &[0, 2, 2]);
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Assignment(Vec<usize>);

impl Assignment {
    /// Wrap a vector of palette indices.
    #[must_use]
    pub fn new(indices: Vec<usize>) -> Self {
        Self(indices)
    }

    /// True if every index points into a palette of `palette_len` swatches.
    #[must_use]
    pub fn is_valid_for(&self, palette_len: usize) -> bool {
        self.0.iter().all(|&i| i < palette_len)
    }

    /// Split into per-frame chunks of `tiles_per_frame` entries.
    ///
    /// # Panics
    /// Panics if `tiles_per_frame` is zero.
    pub fn frames(&self, tiles_per_frame: usize) -> std::slice::Chunks<'_, usize> {
        self.0.chunks(tiles_per_frame)
    }

    /// Consume and return the raw indices.
    #[must_use]
    pub fn into_vec(self) -> Vec<usize> {
        self.0
    }
}

impl Deref for Assignment {
    type Target = [usize];

    fn deref(&self) -> &[usize] {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn shape(w: usize, h: usize) -> TileShape {
        TileShape::new(w, h).unwrap()
    }

    #[test]
    fn zero_dimension_is_rejected() {
        assert_eq!(
            TileShape::new(4, 0),
            Err(TileError::InvalidShape {
                width: 4,
                height: 0
            })
        );
    }

    #[test]
    fn corpus_keeps_push_order() {
        let s = shape(2, 2);
        let mut corpus = TileCorpus::new(s);
        for v in [7u8, 3, 9] {
            corpus.push(&Tile::filled(s, v)).unwrap();
        }
        assert_eq!(corpus.len(), 3);
        let firsts: Vec<u8> = corpus.iter().map(|t| t[0]).collect();
        assert_eq!(firsts, vec![7, 3, 9]);
        assert_eq!(corpus.to_tile(2), Tile::filled(s, 9));
    }

    #[test]
    fn corpus_rejects_other_shape() {
        let mut corpus = TileCorpus::new(shape(2, 2));
        let err = corpus.push(&Tile::filled(shape(4, 1), 0)).unwrap_err();
        assert_eq!(
            err,
            TileError::ShapeMismatch {
                expected: (2, 2),
                found: (4, 1)
            }
        );
        assert!(corpus.is_empty());
    }

    #[test]
    fn select_copies_in_requested_order() {
        let s = shape(1, 1);
        let corpus = TileCorpus::from_tiles(s, (0..5).map(|v| Tile::filled(s, v))).unwrap();
        let sub = corpus.select([4, 0, 2]);
        let vals: Vec<u8> = sub.iter().map(|t| t[0]).collect();
        assert_eq!(vals, vec![4, 0, 2]);
    }

    #[test]
    fn palette_returns_indices_in_push_order() {
        let s = shape(2, 2);
        let mut palette = Palette::new(s);
        assert_eq!(palette.push(Tile::filled(s, 255)).unwrap(), 0);
        assert_eq!(palette.push(Tile::filled(s, 0)).unwrap(), 1);
        assert_eq!(palette.position(&Tile::filled(s, 0)), Some(1));
        assert!(palette.push(Tile::filled(shape(1, 1), 0)).is_err());
    }

    #[test]
    fn assignment_validity() {
        let a = Assignment::new(vec![0, 3]);
        assert!(a.is_valid_for(4));
        assert!(!a.is_valid_for(3));
        assert_eq!(a.len(), 2);
    }
}
