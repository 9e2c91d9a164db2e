//! Diffusion d'erreur Stucki sur un buffer entier signé.

use tf_core::TileError;

/// Error diffusion kernel: `(dx, dy, weight)` entries over a shared divisor.
///
/// `dy` is always ≥ 0 and entries with `dy == 0` only point right, so every
/// target is a pixel not yet visited in row-major order.
#[derive(Debug, Clone, Copy)]
pub struct Kernel {
    /// (dx, dy, weight) entries.
    pub entries: &'static [(isize, usize, u8)],
    /// Each neighbour receives `error * weight / divisor`.
    pub divisor: u8,
}

/// Stucki kernel, 42ths.
///
/// ```text
///            X   7   5
///    2   4   8   4   2
///    1   2   4   2   1
/// ```
pub const STUCKI: Kernel = Kernel {
    entries: &[
        (1, 0, 7),
        (2, 0, 5),
        (-2, 1, 2),
        (-1, 1, 4),
        (0, 1, 8),
        (1, 1, 4),
        (2, 1, 2),
        (-2, 2, 1),
        (-1, 2, 2),
        (0, 2, 4),
        (1, 2, 2),
        (2, 2, 1),
    ],
    divisor: 42,
};

/// Binarise `buf` (`width × height`, row-major) en place par diffusion Stucki.
///
/// Le parcours couvre les lignes `0..height-2` et les colonnes
/// `0..width-2` : la bande des deux dernières lignes et colonnes n'est jamais
/// visitée, elle reçoit seulement de l'erreur. Pendant le parcours un pixel
/// `< 127` devient 0, sinon 255. Chaque voisin reçoit
/// `trunc(valeur + poids/42 · erreur)` ; les voisins à gauche de la colonne 0
/// sont ignorés. Un seuil final (`> 127` → 255, sinon 0) rend tout le buffer
/// binaire.
///
/// # Errors
/// Returns [`TileError::ShapeMismatch`] if `buf.len() != width * height`.
///
/// # Example
/// ```
/// use tf_dither::stucki::stucki_in_place;
/// let mut buf = vec![128; 16];
/// stucki_in_place(&mut buf, 4, 4).unwrap();
/// assert!(buf.iter().all(|&v| v == 0 || v == 255));
/// ```
pub fn stucki_in_place(buf: &mut [i32], width: usize, height: usize) -> Result<(), TileError> {
    diffuse_in_place(buf, width, height, &STUCKI)
}

/// Same as [`stucki_in_place`] with an arbitrary kernel.
///
/// # Errors
/// Returns [`TileError::ShapeMismatch`] if `buf.len() != width * height`.
pub fn diffuse_in_place(
    buf: &mut [i32],
    width: usize,
    height: usize,
    kernel: &Kernel,
) -> Result<(), TileError> {
    if buf.len() != width * height {
        return Err(TileError::ShapeMismatch {
            expected: (width, height),
            found: (buf.len(), 1),
        });
    }
    spread_errors(buf, width, height, kernel);
    for v in buf.iter_mut() {
        *v = if *v > 127 { 255 } else { 0 };
    }
    Ok(())
}

/// Passe de diffusion seule, sans le seuil final. `buf.len()` est déjà vérifié.
fn spread_errors(buf: &mut [i32], width: usize, height: usize, kernel: &Kernel) {
    let divisor = f64::from(kernel.divisor);
    for y in 0..height.saturating_sub(2) {
        for x in 0..width.saturating_sub(2) {
            let idx = y * width + x;
            let old = buf[idx];
            let new = if old < 127 { 0 } else { 255 };
            buf[idx] = new;
            let err = f64::from(old - new);
            if err == 0.0 {
                continue;
            }
            for &(dx, dy, weight) in kernel.entries {
                let Some(nx) = x.checked_add_signed(dx) else {
                    continue;
                };
                let target = (y + dy) * width + nx;
                let spread = f64::from(weight) / divisor * err;
                buf[target] = (f64::from(buf[target]) + spread).trunc() as i32;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn output_is_binary() {
        let mut buf: Vec<i32> = (0..64).map(|i| (i * 4) % 256).collect();
        stucki_in_place(&mut buf, 8, 8).unwrap();
        assert!(buf.iter().all(|&v| v == 0 || v == 255));
    }

    #[test]
    fn second_pass_is_identity() {
        let mut buf: Vec<i32> = (0..80).map(|i| (i * 37 + 11) % 256).collect();
        stucki_in_place(&mut buf, 10, 8).unwrap();
        let once = buf.clone();
        stucki_in_place(&mut buf, 10, 8).unwrap();
        assert_eq!(buf, once);
    }

    #[test]
    fn kernel_weights_sum_to_divisor() {
        let total: u32 = STUCKI.entries.iter().map(|&(_, _, w)| u32::from(w)).sum();
        assert_eq!(total, u32::from(STUCKI.divisor));
    }

    #[test]
    fn error_reaches_forward_neighbours() {
        // 5×3 buffer: only row 0, columns 0..3 are visited.
        let mut buf = vec![100, 100, 100, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0];
        // (0,0): 100 → 0, err 100; (1,0) → 116, (2,0) → 111
        // (1,0): 116 → 0, err 116; (2,0) → 130
        // (2,0): 130 → 255
        diffuse_in_place(&mut buf, 5, 3, &STUCKI).unwrap();
        assert_eq!(&buf[..3], &[0, 0, 255]);
    }

    #[test]
    fn two_rows_below_get_the_exact_weights() {
        // 5×5 : seul (2,2), dernier pixel visité, porte de l'erreur.
        let mut buf = vec![0; 25];
        buf[2 * 5 + 2] = 100;
        spread_errors(&mut buf, 5, 5, &STUCKI);
        // trunc(w/42 · 100) : 7→16, 5→11, 8→19, 4→9, 2→4, 1→2
        #[rustfmt::skip]
        let expected = vec![
            0, 0, 0,  0,  0,
            0, 0, 0,  0,  0,
            0, 0, 0, 16, 11,
            4, 9, 19, 9,  4,
            2, 4, 9,  4,  2,
        ];
        assert_eq!(buf, expected);
    }

    #[test]
    fn neighbours_left_of_column_zero_are_skipped() {
        // 3×5 : seule la colonne 0 est visitée, (0,2) en dernier.
        let mut buf = vec![0; 15];
        buf[2 * 3] = 100;
        spread_errors(&mut buf, 3, 5, &STUCKI);
        #[rustfmt::skip]
        let expected = vec![
            0,  0,  0,
            0,  0,  0,
            0, 16, 11,
            19, 9,  4,
            9,  4,  2,
        ];
        assert_eq!(buf, expected);
    }

    #[test]
    fn small_buffers_only_get_the_final_threshold() {
        let mut buf = vec![127, 128, 0, 255];
        stucki_in_place(&mut buf, 2, 2).unwrap();
        assert_eq!(buf, vec![0, 255, 0, 255]);
    }

    #[test]
    fn wrong_length_is_rejected() {
        let mut buf = vec![0; 10];
        assert_eq!(
            stucki_in_place(&mut buf, 4, 4),
            Err(TileError::ShapeMismatch {
                expected: (4, 4),
                found: (10, 1)
            })
        );
    }
}
