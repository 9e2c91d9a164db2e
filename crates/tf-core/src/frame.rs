/// Gain de contraste appliqué avant la découpe en tuiles.
pub const CONTRAST_GAIN: f32 = 1.1;

/// Frame en niveaux de gris, un byte par pixel, row-major.
///
/// # Example
/// ```
/// use tf_core::frame::GrayFrame;
/// let fb = GrayFrame::new(10, 10);
/// assert_eq!(fb.data.len(), 100);
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GrayFrame {
    /// Intensités, row-major, 1 byte par pixel.
    pub data: Vec<u8>,
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl GrayFrame {
    /// Crée une frame noire aux dimensions données.
    ///
    /// # Example
    /// ```
    /// use tf_core::frame::GrayFrame;
    /// let fb = GrayFrame::new(100, 50);
    /// assert_eq!(fb.width, 100);
    /// assert_eq!(fb.data.len(), 100 * 50);
    /// ```
    #[must_use]
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            data: vec![0u8; width as usize * height as usize],
            width,
            height,
        }
    }

    /// Convert packed RGBA to gray with BT.601 luma weights.
    ///
    /// # Example
    /// ```
    /// use tf_core::frame::GrayFrame;
    /// let fb = GrayFrame::from_rgba(1, 1, &[255, 255, 255, 255]);
    /// assert_eq!(fb.pixel(0, 0), 255);
    /// ```
    #[must_use]
    pub fn from_rgba(width: u32, height: u32, rgba: &[u8]) -> Self {
        let data = rgba
            .chunks_exact(4)
            .map(|p| {
                let y = u32::from(p[0]) * 299 + u32::from(p[1]) * 587 + u32::from(p[2]) * 114;
                ((y + 500) / 1000) as u8
            })
            .collect();
        Self {
            data,
            width,
            height,
        }
    }

    /// Pixel (x, y).
    #[inline(always)]
    #[must_use]
    pub fn pixel(&self, x: u32, y: u32) -> u8 {
        debug_assert!(x < self.width && y < self.height, "pixel out of bounds");
        self.data[y as usize * self.width as usize + x as usize]
    }

    /// Accentue le contraste autour du gris moyen : `(p - 128) · gain + 128`,
    /// écrêté sur [0, 255] puis tronqué.
    ///
    /// # Example
    /// ```
    /// use tf_core::frame::{CONTRAST_GAIN, GrayFrame};
    /// let mut fb = GrayFrame { data: vec![0, 100, 128, 200, 255], width: 5, height: 1 };
    /// fb.contrast_stretch(CONTRAST_GAIN);
    /// assert_eq!(fb.data, vec![0, 97, 128, 207, 255]);
    /// ```
    pub fn contrast_stretch(&mut self, gain: f32) {
        for p in &mut self.data {
            let v = (f32::from(*p) - 128.0) * gain + 128.0;
            *p = v.clamp(0.0, 255.0) as u8;
        }
    }
}
