use anyhow::{Context, Result};
use std::io::Write;
use std::path::Path;
use std::process::{Child, Command, Stdio};

use tf_core::GrayFrame;

/// Encode des frames gray 8 bits en MP4 H.264 via ffmpeg.
pub struct GrayMuxer {
    ffmpeg_child: Child,
    width: u32,
    height: u32,
    frames: usize,
}

impl GrayMuxer {
    /// Crée un muxer vidéo `width × height` à `fps` images par seconde.
    /// libx264, sortie yuv420p lisible partout.
    ///
    /// # Errors
    /// Retourne une erreur si une dimension est nulle ou impaire (yuv420p),
    /// ou si ffmpeg n'est pas installé ou impossible à démarrer.
    pub fn new(output_path: &Path, width: u32, height: u32, fps: f64) -> Result<Self> {
        if width == 0 || height == 0 || width % 2 != 0 || height % 2 != 0 {
            anyhow::bail!(
                "dimensions {width}x{height} refusées : yuv420p exige une largeur et une hauteur paires non nulles"
            );
        }
        let path_str = output_path.to_str().context("Chemin invalide")?;

        let child = Command::new("ffmpeg")
            .args([
                "-y",
                "-f",
                "rawvideo",
                "-vcodec",
                "rawvideo",
                "-s",
                &format!("{width}x{height}"),
                "-pix_fmt",
                "gray",
                "-r",
                &format!("{:.3}", fps.max(1.0)),
                "-i",
                "-",
                "-c:v",
                "libx264",
                "-pix_fmt",
                "yuv420p",
                "-hide_banner",
                "-loglevel",
                "error",
                path_str,
            ])
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .spawn()
            .context("Échec de l'initialisation de l'encodeur vidéo ffmpeg (est-il dans PATH ?)")?;

        log::debug!("encodeur ffmpeg lancé : {width}x{height} @ {fps:.3}fps");
        Ok(Self {
            ffmpeg_child: child,
            width,
            height,
            frames: 0,
        })
    }

    /// Ajoute une frame au flux.
    ///
    /// # Errors
    /// Retourne une erreur si la frame n'a pas la taille du flux ou si
    /// l'écriture dans le pipe échoue.
    pub fn write_frame(&mut self, frame: &GrayFrame) -> Result<()> {
        if frame.width != self.width || frame.height != self.height {
            anyhow::bail!(
                "frame {}x{} pour un flux {}x{}",
                frame.width,
                frame.height,
                self.width,
                self.height
            );
        }
        let stdin = self
            .ffmpeg_child
            .stdin
            .as_mut()
            .context("stdin ffmpeg déjà fermé")?;
        stdin
            .write_all(&frame.data)
            .context("Écriture dans le pipe ffmpeg")?;
        self.frames += 1;
        Ok(())
    }

    /// Frames written so far.
    #[must_use]
    pub fn frames(&self) -> usize {
        self.frames
    }

    /// Ferme le flux et finalise l'exportation.
    ///
    /// # Errors
    /// Retourne une erreur si ffmpeg signale une erreur de terminaison.
    pub fn finish(mut self) -> Result<()> {
        drop(self.ffmpeg_child.stdin.take());

        let output = self.ffmpeg_child.wait_with_output()?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            anyhow::bail!("Erreur de l'encodeur ffmpeg : {stderr}");
        }
        log::info!("{} frames encodées", self.frames);
        Ok(())
    }
}
