use std::fmt;
use std::path::Path;
use std::str::FromStr;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::error::TileError;

/// Binarisation appliquée à la tuile moyenne d'un bin.
///
/// # Example
/// ```
/// use tf_core::config::DitherMode;
/// let mode: DitherMode = "error".parse().unwrap();
/// assert_eq!(mode, DitherMode::Error);
/// assert!("floyd".parse::<DitherMode>().is_err());
/// ```
#[derive(Clone, Copy, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum DitherMode {
    /// Seuillage contre une matrice de Bayer.
    #[default]
    Ordered,
    /// Diffusion d'erreur Stucki.
    Error,
    /// Seuil fixe à 127.
    None,
}

impl FromStr for DitherMode {
    type Err = TileError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ordered" => Ok(Self::Ordered),
            "error" => Ok(Self::Error),
            "none" => Ok(Self::None),
            other => Err(TileError::InvalidDitherMode(other.to_string())),
        }
    }
}

impl fmt::Display for DitherMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Ordered => "ordered",
            Self::Error => "error",
            Self::None => "none",
        })
    }
}

/// Paramètres d'un run complet (découpe, palette, sorties).
///
/// Le coeur (quantizer, assigner) ne lit jamais cette structure : il reçoit
/// des arguments explicites. Le défaut est l'affaire de l'appelant.
///
/// # Example
/// ```
/// use tf_core::config::RunConfig;
/// let config = RunConfig::default();
/// assert_eq!(config.n_palette, 3072);
/// assert_eq!(config.size_x * config.n_x, 720);
/// ```
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct RunConfig {
    /// Largeur d'une tuile en pixels.
    pub size_x: usize,
    /// Hauteur d'une tuile en pixels.
    pub size_y: usize,
    /// Tuiles par ligne de frame.
    pub n_x: usize,
    /// Tuiles par colonne de frame.
    pub n_y: usize,
    /// Nombre de swatches demandées.
    pub n_palette: usize,
    /// Mode de binarisation des swatches.
    pub dither: DitherMode,
    /// Côté de la matrice de Bayer (puissance de deux).
    pub matrix_size: usize,
    /// Accentuer le contraste de chaque frame avant découpe (gain 1.1).
    pub contrast_stretch: bool,
    /// Début de l'extrait, en secondes.
    pub start: f64,
    /// Durée de l'extrait en secondes. `None` = jusqu'à la fin.
    pub duration: Option<f64>,
    /// Encoder la vidéo tramée en plus des fichiers texte.
    pub video_output: bool,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            size_x: 8,
            size_y: 8,
            n_x: 90,
            n_y: 43,
            n_palette: 3072,
            dither: DitherMode::Ordered,
            matrix_size: 8,
            contrast_stretch: true,
            start: 0.0,
            duration: None,
            video_output: true,
        }
    }
}

impl RunConfig {
    /// Clamp numeric fields to usable ranges.
    /// Called after TOML deserialization; the dither matrix size is left
    /// alone so that a bad value is reported by the matrix builder.
    pub fn clamp_all(&mut self) {
        self.size_x = self.size_x.max(1);
        self.size_y = self.size_y.max(1);
        self.n_x = self.n_x.max(1);
        self.n_y = self.n_y.max(1);
        self.n_palette = self.n_palette.max(1);
        self.start = self.start.max(0.0);
        self.duration = self.duration.filter(|d| *d > 0.0);
    }

    /// Frame width fed to the tiler: `size_x × n_x`.
    #[must_use]
    pub fn frame_width(&self) -> u32 {
        (self.size_x * self.n_x) as u32
    }

    /// Frame height fed to the tiler: `size_y × n_y`.
    #[must_use]
    pub fn frame_height(&self) -> u32 {
        (self.size_y * self.n_y) as u32
    }

    /// Tiles cut from every frame.
    #[must_use]
    pub fn tiles_per_frame(&self) -> usize {
        self.n_x * self.n_y
    }
}

/// Structure TOML intermédiaire pour désérialisation avec valeurs optionnelles.
#[derive(Deserialize)]
struct ConfigFile {
    run: RunSection,
}

/// Run section of the TOML config, all fields optional for partial override.
#[derive(Deserialize)]
struct RunSection {
    size_x: Option<usize>,
    size_y: Option<usize>,
    n_x: Option<usize>,
    n_y: Option<usize>,
    n_palette: Option<usize>,
    dither: Option<DitherMode>,
    matrix_size: Option<usize>,
    contrast_stretch: Option<bool>,
    start: Option<f64>,
    duration: Option<f64>,
    video_output: Option<bool>,
}

/// Charge un fichier TOML et fusionne avec les valeurs par défaut.
///
/// # Errors
/// Returns an error if the file cannot be read or parsed.
///
/// # Example
/// ```no_run
/// use tf_core::config::load_config;
/// use std::path::Path;
/// let config = load_config(Path::new("tilefont.toml")).unwrap();
/// ```
pub fn load_config(path: &Path) -> Result<RunConfig> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Impossible de lire {}", path.display()))?;
    parse_config(&content).with_context(|| format!("Erreur de parsing TOML dans {}", path.display()))
}

/// Parse TOML text into a [`RunConfig`], merging over the defaults.
///
/// # Errors
/// Returns an error if the text is not valid TOML for the `[run]` section.
pub fn parse_config(content: &str) -> Result<RunConfig> {
    let file: ConfigFile = toml::from_str(content)?;
    let mut config = RunConfig::default();

    let r = file.run;
    if let Some(v) = r.size_x {
        config.size_x = v;
    }
    if let Some(v) = r.size_y {
        config.size_y = v;
    }
    if let Some(v) = r.n_x {
        config.n_x = v;
    }
    if let Some(v) = r.n_y {
        config.n_y = v;
    }
    if let Some(v) = r.n_palette {
        config.n_palette = v;
    }
    if let Some(v) = r.dither {
        config.dither = v;
    }
    if let Some(v) = r.matrix_size {
        config.matrix_size = v;
    }
    if let Some(v) = r.contrast_stretch {
        config.contrast_stretch = v;
    }
    if let Some(v) = r.start {
        config.start = v;
    }
    if r.duration.is_some() {
        config.duration = r.duration;
    }
    if let Some(v) = r.video_output {
        config.video_output = v;
    }

    config.clamp_all();
    log::debug!("config chargée : {config:?}");
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_section_keeps_defaults() {
        let config = parse_config("[run]\nn_palette = 256\ndither = \"error\"\n").unwrap();
        assert_eq!(config.n_palette, 256);
        assert_eq!(config.dither, DitherMode::Error);
        assert_eq!(config.size_x, 8);
        assert_eq!(config.n_y, 43);
    }

    #[test]
    fn unknown_dither_is_rejected() {
        assert!(parse_config("[run]\ndither = \"floyd\"\n").is_err());
    }

    #[test]
    fn clamp_fixes_degenerate_values() {
        let config = parse_config("[run]\nsize_x = 0\nduration = -3.0\n").unwrap();
        assert_eq!(config.size_x, 1);
        assert_eq!(config.duration, None);
    }

    #[test]
    fn load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("run.toml");
        std::fs::write(&path, "[run]\nsize_y = 16\nvideo_output = false\n").unwrap();
        let config = load_config(&path).unwrap();
        assert_eq!(config.size_y, 16);
        assert!(!config.video_output);
    }

    #[test]
    fn mode_display_round_trips_through_from_str() {
        for mode in [DitherMode::Ordered, DitherMode::Error, DitherMode::None] {
            assert_eq!(mode.to_string().parse::<DitherMode>().unwrap(), mode);
        }
        assert_eq!(
            "Ordered".parse::<DitherMode>(),
            Err(TileError::InvalidDitherMode("Ordered".into()))
        );
    }
}
