//! Flou gaussien séparable sur une tuile.
//!
//! Noyau tronqué à `⌊4σ + 0.5⌋` pixels de rayon, bords en réflexion
//! symétrique (`d c b a | a b c d | d c b a`).

use tf_core::TileError;

/// Sigma fixe utilisé avant toute comparaison de tuiles.
pub const BLUR_SIGMA: f32 = 2.0;

/// Noyau gaussien 1D normalisé.
///
/// # Example
/// ```
/// use tf_palette::blur::GaussianKernel;
/// let k = GaussianKernel::new(2.0);
/// assert_eq!(k.radius(), 8);
/// let flat = k.blur(&[100; 16], 4, 4).unwrap();
/// assert!(flat.iter().all(|&v| (v - 100.0).abs() < 1e-3));
/// ```
#[derive(Clone, Debug)]
pub struct GaussianKernel {
    radius: usize,
    weights: Vec<f32>,
}

impl GaussianKernel {
    /// Kernel for `sigma`; a non-positive sigma gives the identity.
    #[must_use]
    pub fn new(sigma: f32) -> Self {
        if sigma <= 0.0 {
            return Self {
                radius: 0,
                weights: vec![1.0],
            };
        }
        let radius = (4.0 * sigma + 0.5) as usize;
        let denom = 2.0 * sigma * sigma;
        let mut weights: Vec<f32> = (0..=2 * radius)
            .map(|i| {
                let x = i as f32 - radius as f32;
                (-(x * x) / denom).exp()
            })
            .collect();
        let total: f32 = weights.iter().sum();
        for w in &mut weights {
            *w /= total;
        }
        Self { radius, weights }
    }

    /// Kernel radius in pixels.
    #[must_use]
    pub fn radius(&self) -> usize {
        self.radius
    }

    /// Blur a `width × height` row-major tile.
    ///
    /// # Errors
    /// Returns [`TileError::ShapeMismatch`] if `pixels.len() != width * height`.
    pub fn blur(&self, pixels: &[u8], width: usize, height: usize) -> Result<Vec<f32>, TileError> {
        if pixels.len() != width * height {
            return Err(TileError::ShapeMismatch {
                expected: (width, height),
                found: (pixels.len(), 1),
            });
        }
        let src: Vec<f32> = pixels.iter().map(|&p| f32::from(p)).collect();
        let mut tmp = vec![0.0f32; src.len()];
        let mut out = vec![0.0f32; src.len()];
        let r = self.radius as isize;

        for y in 0..height {
            let row = &src[y * width..(y + 1) * width];
            for x in 0..width {
                let mut acc = 0.0f32;
                for (k, &w) in self.weights.iter().enumerate() {
                    acc += w * row[reflect(x as isize + k as isize - r, width)];
                }
                tmp[y * width + x] = acc;
            }
        }
        for x in 0..width {
            for y in 0..height {
                let mut acc = 0.0f32;
                for (k, &w) in self.weights.iter().enumerate() {
                    acc += w * tmp[reflect(y as isize + k as isize - r, height) * width + x];
                }
                out[y * width + x] = acc;
            }
        }
        Ok(out)
    }
}

/// Réflexion symétrique d'un index hors bornes, période `2·len`.
#[inline(always)]
fn reflect(i: isize, len: usize) -> usize {
    let period = 2 * len as isize;
    let m = i.rem_euclid(period);
    if m < len as isize {
        m as usize
    } else {
        (period - 1 - m) as usize
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn weights_are_normalized_and_symmetric() {
        let k = GaussianKernel::new(BLUR_SIGMA);
        let total: f32 = k.weights.iter().sum();
        assert!((total - 1.0).abs() < 1e-5);
        let n = k.weights.len();
        for i in 0..n / 2 {
            assert!((k.weights[i] - k.weights[n - 1 - i]).abs() < 1e-7);
        }
    }

    #[test]
    fn reflect_mirrors_edges() {
        assert_eq!(reflect(-1, 4), 0);
        assert_eq!(reflect(-2, 4), 1);
        assert_eq!(reflect(4, 4), 3);
        assert_eq!(reflect(5, 4), 2);
        assert_eq!(reflect(9, 4), 1);
        assert_eq!(reflect(-9, 4), 0);
    }

    #[test]
    fn blur_preserves_mass_on_a_step() {
        let mut pixels = vec![0u8; 64];
        for p in pixels.iter_mut().skip(32) {
            *p = 255;
        }
        let out = GaussianKernel::new(BLUR_SIGMA).blur(&pixels, 8, 8).unwrap();
        // le haut s'éclaircit, le bas s'assombrit, sans sortir de [0, 255]
        assert!(out[0] > 0.0);
        assert!(out[63] < 255.0);
        assert!(out.iter().all(|&v| (0.0..=255.0 + 1e-3).contains(&v)));
    }

    #[test]
    fn zero_sigma_is_identity() {
        let pixels: Vec<u8> = (0..12).collect();
        let out = GaussianKernel::new(0.0).blur(&pixels, 4, 3).unwrap();
        let back: Vec<u8> = out.iter().map(|&v| v as u8).collect();
        assert_eq!(back, pixels);
    }

    #[test]
    fn wrong_pixel_count_is_rejected() {
        let k = GaussianKernel::new(BLUR_SIGMA);
        assert_eq!(
            k.blur(&[0; 3], 2, 2),
            Err(TileError::ShapeMismatch {
                expected: (2, 2),
                found: (3, 1)
            })
        );
        assert!(k.blur(&[0; 5], 2, 2).is_err());
    }
}
