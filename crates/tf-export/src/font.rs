//! Format texte FONT.
//!
//! Palette :
//! ```text
//! FONT
//!
//! {nombre de swatches}
//!
//! 00111100        ← sizeY lignes de sizeX caractères, 1 si pixel > 128
//! ...
//!                 ← ligne vide après chaque swatch
//! ```
//! complétée de swatches entièrement à 0 jusqu'à la taille demandée.
//!
//! Index : `FONT\n\n{nX} {nY}\n\n` puis une ligne par frame, chaque index
//! suivi d'un espace.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use anyhow::{Context, Result};
use tf_core::{Assignment, Palette};

/// Seuil d'écriture : un pixel `> 128` s'écrit `1`.
const ON_THRESHOLD: u8 = 128;

/// Write `palette` in FONT format, padded with blank swatches up to `n`.
///
/// The header carries the real palette length, not `n`.
///
/// # Errors
/// Propagates I/O errors from `out`.
///
/// # Example
/// ```
/// use tf_core::{Palette, Tile, TileShape};
/// use tf_export::font::write_palette;
///
/// let shape = TileShape::new(2, 2).unwrap();
/// let palette = Palette::from_swatches(shape, vec![Tile::new(shape, vec![255, 0, 0, 255]).unwrap()]).unwrap();
/// let mut out = Vec::new();
/// write_palette(&mut out, &palette, 2).unwrap();
/// assert_eq!(String::from_utf8(out).unwrap(), "FONT\n\n1\n\n10\n01\n\n00\n00\n\n");
/// ```
pub fn write_palette<W: Write>(out: &mut W, palette: &Palette, n: usize) -> io::Result<()> {
    let shape = palette.shape();
    write!(out, "FONT\n\n{}\n\n", palette.len())?;

    let mut line = String::with_capacity(shape.width + 1);
    for swatch in palette.iter() {
        for row in swatch.rows() {
            line.clear();
            line.extend(row.iter().map(|&p| if p > ON_THRESHOLD { '1' } else { '0' }));
            line.push('\n');
            out.write_all(line.as_bytes())?;
        }
        out.write_all(b"\n")?;
    }

    let blank = format!("{}\n", "0".repeat(shape.width));
    for _ in palette.len()..n {
        for _ in 0..shape.height {
            out.write_all(blank.as_bytes())?;
        }
        out.write_all(b"\n")?;
    }
    Ok(())
}

/// Write per-frame swatch indices in FONT format.
///
/// `assignment` is cut into frames of `nx · ny` entries; a trailing partial
/// frame is written as is.
///
/// # Errors
/// Propagates I/O errors from `out`.
///
/// # Example
/// ```
/// use tf_core::Assignment;
/// use tf_export::font::write_indices;
///
/// let mut out = Vec::new();
/// write_indices(&mut out, &Assignment::new(vec![0, 1, 2, 2, 1, 0]), 3, 1).unwrap();
/// assert_eq!(String::from_utf8(out).unwrap(), "FONT\n\n3 1\n\n0 1 2 \n2 1 0 \n");
/// ```
pub fn write_indices<W: Write>(
    out: &mut W,
    assignment: &Assignment,
    nx: usize,
    ny: usize,
) -> io::Result<()> {
    write!(out, "FONT\n\n{nx} {ny}\n\n")?;
    for frame in assignment.frames((nx * ny).max(1)) {
        for idx in frame {
            write!(out, "{idx} ")?;
        }
        out.write_all(b"\n")?;
    }
    Ok(())
}

/// [`write_palette`] vers un fichier.
///
/// # Errors
/// Retourne une erreur si le fichier ne peut être créé ou écrit.
pub fn save_palette(path: &Path, palette: &Palette, n: usize) -> Result<()> {
    let file = File::create(path).with_context(|| format!("Création de {}", path.display()))?;
    let mut out = BufWriter::new(file);
    write_palette(&mut out, palette, n)
        .and_then(|()| out.flush())
        .with_context(|| format!("Écriture de {}", path.display()))?;
    log::info!("palette écrite : {}", path.display());
    Ok(())
}

/// [`write_indices`] vers un fichier.
///
/// # Errors
/// Retourne une erreur si le fichier ne peut être créé ou écrit.
pub fn save_indices(path: &Path, assignment: &Assignment, nx: usize, ny: usize) -> Result<()> {
    let file = File::create(path).with_context(|| format!("Création de {}", path.display()))?;
    let mut out = BufWriter::new(file);
    write_indices(&mut out, assignment, nx, ny)
        .and_then(|()| out.flush())
        .with_context(|| format!("Écriture de {}", path.display()))?;
    log::info!("index écrits : {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tf_core::{Tile, TileShape};

    #[test]
    fn palette_rows_follow_tile_rows() {
        let shape = TileShape::new(3, 2).unwrap();
        let swatch = Tile::new(shape, vec![255, 255, 0, 0, 0, 255]).unwrap();
        let palette = Palette::from_swatches(shape, vec![swatch]).unwrap();
        let mut out = Vec::new();
        write_palette(&mut out, &palette, 1).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "FONT\n\n1\n\n110\n001\n\n");
    }

    #[test]
    fn padding_keeps_real_length_in_header() {
        let shape = TileShape::new(2, 3).unwrap();
        let palette = Palette::from_swatches(shape, vec![Tile::filled(shape, 255)]).unwrap();
        let mut out = Vec::new();
        write_palette(&mut out, &palette, 3).unwrap();
        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[2], "1");
        // en-tête (4 lignes) + 3 swatches × (3 lignes + 1 vide)
        assert_eq!(lines.len(), 4 + 3 * 4);
        assert_eq!(&lines[4..7], &["11", "11", "11"]);
        assert_eq!(&lines[8..11], &["00", "00", "00"]);
    }

    #[test]
    fn oversized_palette_is_not_truncated() {
        let shape = TileShape::new(1, 1).unwrap();
        let palette =
            Palette::from_swatches(shape, vec![Tile::filled(shape, 0), Tile::filled(shape, 255)])
                .unwrap();
        let mut out = Vec::new();
        write_palette(&mut out, &palette, 1).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "FONT\n\n2\n\n0\n\n1\n\n");
    }

    #[test]
    fn index_file_has_one_line_per_frame() {
        let assignment = Assignment::new((0..12).collect());
        let mut out = Vec::new();
        write_indices(&mut out, &assignment, 2, 2).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.starts_with("FONT\n\n2 2\n\n"));
        let body: Vec<&str> = text.lines().skip(4).collect();
        assert_eq!(body, vec!["0 1 2 3 ", "4 5 6 7 ", "8 9 10 11 "]);
    }

    #[test]
    fn files_are_written() {
        let dir = tempfile::tempdir().unwrap();
        let shape = TileShape::new(2, 2).unwrap();
        let palette = Palette::from_swatches(shape, vec![Tile::filled(shape, 0)]).unwrap();
        let pal_path = dir.path().join("p_palette.txt");
        let idx_path = dir.path().join("p_closest_tile.txt");

        save_palette(&pal_path, &palette, 2).unwrap();
        save_indices(&idx_path, &Assignment::new(vec![0, 0]), 2, 1).unwrap();

        let pal = std::fs::read_to_string(&pal_path).unwrap();
        assert_eq!(pal, "FONT\n\n1\n\n00\n00\n\n00\n00\n\n");
        let idx = std::fs::read_to_string(&idx_path).unwrap();
        assert_eq!(idx, "FONT\n\n2 1\n\n0 0 \n");
    }

    #[test]
    fn unwritable_path_is_an_error() {
        let shape = TileShape::new(2, 2).unwrap();
        let palette = Palette::new(shape);
        assert!(save_palette(Path::new("/nonexistent/dir/p.txt"), &palette, 0).is_err());
    }
}
