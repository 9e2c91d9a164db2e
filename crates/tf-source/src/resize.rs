use anyhow::{Context, Result};
use fast_image_resize::images::Image;
use fast_image_resize::{FilterType, PixelType, ResizeAlg, ResizeOptions, Resizer as FirResizer};
use tf_core::GrayFrame;

/// Resizer niveaux de gris réutilisable (`fast_image_resize`, 1 byte/pixel).
///
/// Filtre Catmull-Rom, l'équivalent bicubique du chemin ffmpeg.
///
/// # Example
/// ```
/// use tf_core::GrayFrame;
/// use tf_source::resize::GrayResizer;
/// let mut r = GrayResizer::new();
/// let mut dst = GrayFrame::new(20, 10);
/// r.resize_into(&GrayFrame::new(40, 40), &mut dst).unwrap();
/// ```
pub struct GrayResizer {
    inner: FirResizer,
    options: ResizeOptions,
    /// Copie de la source : l'API veut un buffer mutable.
    src_buf: Vec<u8>,
}

impl GrayResizer {
    /// Create a new resizer.
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: FirResizer::new(),
            options: ResizeOptions::new()
                .resize_alg(ResizeAlg::Convolution(FilterType::CatmullRom)),
            src_buf: Vec::new(),
        }
    }

    /// Resize `src` into `dst`; `dst` dimensions set the output size.
    ///
    /// # Errors
    /// Returns an error on zero or inconsistent dimensions.
    pub fn resize_into(&mut self, src: &GrayFrame, dst: &mut GrayFrame) -> Result<()> {
        if src.width == dst.width && src.height == dst.height {
            dst.data.copy_from_slice(&src.data);
            return Ok(());
        }

        self.src_buf.clear();
        self.src_buf.extend_from_slice(&src.data);

        let src_image =
            Image::from_slice_u8(src.width, src.height, &mut self.src_buf, PixelType::U8)
                .context("Dimensions source invalides")?;
        let mut dst_image =
            Image::from_slice_u8(dst.width, dst.height, &mut dst.data, PixelType::U8)
                .context("Dimensions destination invalides")?;

        self.inner
            .resize(&src_image, &mut dst_image, Some(&self.options))
            .context("Échec du redimensionnement")?;
        Ok(())
    }
}

impl Default for GrayResizer {
    fn default() -> Self {
        Self::new()
    }
}

/// One-shot resize.
///
/// # Errors
/// Returns an error if the resize operation fails.
///
/// # Example
/// ```
/// use tf_core::GrayFrame;
/// use tf_source::resize::resize_gray;
/// let dst = resize_gray(&GrayFrame::new(100, 100), 50, 25).unwrap();
/// assert_eq!((dst.width, dst.height), (50, 25));
/// ```
pub fn resize_gray(src: &GrayFrame, width: u32, height: u32) -> Result<GrayFrame> {
    let mut dst = GrayFrame::new(width, height);
    GrayResizer::new().resize_into(src, &mut dst)?;
    Ok(dst)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_size_is_a_copy() {
        let src = GrayFrame {
            data: (0..12).collect(),
            width: 4,
            height: 3,
        };
        let dst = resize_gray(&src, 4, 3).unwrap();
        assert_eq!(dst, src);
    }

    #[test]
    fn uniform_stays_uniform() {
        let src = GrayFrame {
            data: vec![77; 64 * 48],
            width: 64,
            height: 48,
        };
        let dst = resize_gray(&src, 24, 16).unwrap();
        assert_eq!(dst.data.len(), 24 * 16);
        assert!(dst.data.iter().all(|&p| p.abs_diff(77) <= 1));
    }

    #[test]
    fn resizer_is_reusable() {
        let mut r = GrayResizer::new();
        let src = GrayFrame {
            data: vec![200; 32 * 32],
            width: 32,
            height: 32,
        };
        for (w, h) in [(8, 8), (16, 4), (64, 64)] {
            let mut dst = GrayFrame::new(w, h);
            r.resize_into(&src, &mut dst).unwrap();
            assert!(dst.data.iter().all(|&p| p.abs_diff(200) <= 1));
        }
    }
}
