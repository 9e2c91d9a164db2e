use std::path::PathBuf;

use clap::Parser;
use tf_core::{DitherMode, RunConfig};
use tf_palette::QueueOrder;

/// tilefont : construit une police de tuiles binaires à partir d'une vidéo.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Source : vidéo (via ffmpeg) ou image fixe (PNG, JPEG, BMP, GIF).
    #[arg(long)]
    pub input: PathBuf,

    /// Dossier de sortie. Défaut : {nom}_{n_palette}_{size_y}.
    #[arg(long)]
    pub output: Option<PathBuf>,

    /// Fichier de configuration TOML (section [run]).
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Largeur d'une tuile en pixels.
    #[arg(long)]
    pub size_x: Option<usize>,

    /// Hauteur d'une tuile en pixels.
    #[arg(long)]
    pub size_y: Option<usize>,

    /// Tuiles par ligne.
    #[arg(long)]
    pub n_x: Option<usize>,

    /// Tuiles par colonne.
    #[arg(long)]
    pub n_y: Option<usize>,

    /// Nombre de swatches de la palette.
    #[arg(long)]
    pub n_palette: Option<usize>,

    /// Binarisation des swatches : ordered, error, none.
    #[arg(long)]
    pub dither: Option<DitherMode>,

    /// Côté de la matrice de Bayer (puissance de deux).
    #[arg(long)]
    pub matrix_size: Option<usize>,

    /// Début de l'extrait en secondes.
    #[arg(long)]
    pub start: Option<f64>,

    /// Durée de l'extrait en secondes (≤ 0 = jusqu'à la fin).
    #[arg(long, allow_negative_numbers = true)]
    pub duration: Option<f64>,

    /// Ne pas encoder la vidéo tramée.
    #[arg(long, default_value_t = false)]
    pub no_video_output: bool,

    /// Ne pas accentuer le contraste des frames.
    #[arg(long, default_value_t = false)]
    pub no_contrast: bool,

    /// Réaffecter chaque tuile à la swatch la plus proche après quantification.
    #[arg(long, default_value_t = false)]
    pub reassign: bool,

    /// Construire la palette sur une frame sur K seulement.
    #[arg(long, default_value_t = 1, value_parser = clap::value_parser!(u64).range(1..))]
    pub sample_stride: u64,

    /// Palette aléatoire de référence, tirée avec cette graine.
    #[arg(long)]
    pub random_palette: Option<u64>,

    /// Traiter les bins en profondeur d'abord (n'affecte que l'ordre de la palette).
    #[arg(long, default_value_t = false)]
    pub lifo: bool,

    /// Niveau de log : error, warn, info, debug, trace.
    #[arg(long, default_value = "warn")]
    pub log_level: String,
}

impl Cli {
    /// Apply command-line overrides on top of `config`.
    pub fn apply(&self, config: &mut RunConfig) {
        if let Some(v) = self.size_x {
            config.size_x = v;
        }
        if let Some(v) = self.size_y {
            config.size_y = v;
        }
        if let Some(v) = self.n_x {
            config.n_x = v;
        }
        if let Some(v) = self.n_y {
            config.n_y = v;
        }
        if let Some(v) = self.n_palette {
            config.n_palette = v;
        }
        if let Some(v) = self.dither {
            config.dither = v;
        }
        if let Some(v) = self.matrix_size {
            config.matrix_size = v;
        }
        if let Some(v) = self.start {
            config.start = v;
        }
        if self.duration.is_some() {
            config.duration = self.duration;
        }
        if self.no_video_output {
            config.video_output = false;
        }
        if self.no_contrast {
            config.contrast_stretch = false;
        }
        config.clamp_all();
    }

    /// Work queue order requested on the command line.
    #[must_use]
    pub fn queue_order(&self) -> QueueOrder {
        if self.lifo {
            QueueOrder::Lifo
        } else {
            QueueOrder::Fifo
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_override_config() {
        let cli = Cli::parse_from([
            "tilefont",
            "--input",
            "clip.mp4",
            "--n-palette",
            "256",
            "--dither",
            "error",
            "--duration",
            "-1",
            "--no-video-output",
        ]);
        let mut config = RunConfig {
            duration: Some(4.0),
            ..RunConfig::default()
        };
        cli.apply(&mut config);
        assert_eq!(config.n_palette, 256);
        assert_eq!(config.dither, DitherMode::Error);
        assert_eq!(config.duration, None);
        assert!(!config.video_output);
        assert_eq!(config.size_x, 8);
    }

    #[test]
    fn bad_dither_mode_is_refused() {
        let res = Cli::try_parse_from(["tilefont", "--input", "a.mp4", "--dither", "floyd"]);
        assert!(res.is_err());
    }

    #[test]
    fn sample_stride_must_be_positive() {
        assert!(Cli::try_parse_from(["tilefont", "--input", "a", "--sample-stride", "0"]).is_err());
        let cli = Cli::parse_from(["tilefont", "--input", "a", "--lifo"]);
        assert_eq!(cli.sample_stride, 1);
        assert_eq!(cli.queue_order(), QueueOrder::Lifo);
    }
}
