// Décodage vidéo par sous-processus ffmpeg (std::process::Command).
// Prérequis : `ffmpeg` et `ffprobe` accessibles dans PATH.
//
// Architecture :
//   - `probe_video`         : interroge ffprobe pour width/height/fps/durée
//   - `spawn_gray_pipe`     : lance ffmpeg → frames gray 8 bits sur stdout
//   - `spawn_decoder_thread`: thread dédié, lit les frames et les pousse dans un canal borné
//   - `decode_frames`       : côté consommateur, frames livrées dans l'ordre

use anyhow::{Context, Result, anyhow};
use flume::Sender;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::{Child, Command, Stdio};
use std::thread;

use tf_core::GrayFrame;

/// Capacité du canal décodeur → consommateur.
const FRAME_QUEUE: usize = 8;

/// Métadonnées extraites via ffprobe.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct VideoInfo {
    pub width: u32,
    pub height: u32,
    /// Images par seconde (ex: 23.976, 24.0, 30.0).
    pub fps: f64,
    /// Durée du conteneur en secondes, si connue.
    pub duration: Option<f64>,
}

/// Extrait à décoder : début et durée optionnelle, en secondes.
///
/// # Example
/// ```
/// use tf_source::video::Clip;
/// let clip = Clip::new(5.0, Some(2.0));
/// assert_eq!(clip.args(), vec!["-ss", "5.000", "-t", "2.000"]);
/// assert!(Clip::default().args().is_empty());
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Clip {
    pub start: f64,
    pub duration: Option<f64>,
}

impl Clip {
    /// Clip starting at `start`; a non-positive duration means "to the end".
    #[must_use]
    pub fn new(start: f64, duration: Option<f64>) -> Self {
        Self {
            start: start.max(0.0),
            duration: duration.filter(|d| *d > 0.0),
        }
    }

    /// Input-side ffmpeg arguments (`-ss`, `-t`).
    #[must_use]
    pub fn args(&self) -> Vec<String> {
        let mut args = Vec::new();
        if self.start > 0.0 {
            args.push("-ss".to_string());
            args.push(format!("{:.3}", self.start));
        }
        if let Some(d) = self.duration {
            args.push("-t".to_string());
            args.push(format!("{d:.3}"));
        }
        args
    }
}

/// Interroge `ffprobe` pour obtenir les métadonnées du flux vidéo principal.
///
/// # Errors
/// Retourne une erreur si `ffprobe` est introuvable ou si le fichier
/// ne contient aucun flux vidéo décodable.
///
/// # Example
/// ```no_run
/// use std::path::Path;
/// use tf_source::video::probe_video;
/// let info = probe_video(Path::new("video.mkv")).unwrap();
/// ```
pub fn probe_video(path: &Path) -> Result<VideoInfo> {
    let path_str = path.to_str().context("Chemin vidéo invalide (non-UTF8)")?;

    let output = Command::new("ffprobe")
        .args([
            "-v",
            "quiet",
            "-select_streams",
            "v:0",
            "-show_entries",
            "stream=width,height,r_frame_rate:format=duration",
            "-of",
            "default=noprint_wrappers=1",
            "-i",
            path_str,
        ])
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .output()
        .context(
            "Impossible de lancer ffprobe. Vérifiez que ffprobe est installé et dans le PATH.",
        )?;

    let text = String::from_utf8_lossy(&output.stdout);
    let info = parse_probe(&text)
        .ok_or_else(|| anyhow!("ffprobe n'a trouvé aucun flux vidéo dans {}", path.display()))?;

    log::info!(
        "probe_video: {}x{} @ {:.3}fps, {} ({})",
        info.width,
        info.height,
        info.fps,
        info.duration
            .map_or_else(|| "durée inconnue".to_string(), |d| format!("{d:.1}s")),
        path.display()
    );
    Ok(info)
}

/// Parse la sortie `key=value` de ffprobe. `None` sans dimensions valides.
fn parse_probe(text: &str) -> Option<VideoInfo> {
    let mut width = 0u32;
    let mut height = 0u32;
    let mut fps = 30.0f64;
    let mut duration = None;

    for line in text.lines() {
        if let Some(val) = line.strip_prefix("width=") {
            width = val.trim().parse().unwrap_or(0);
        } else if let Some(val) = line.strip_prefix("height=") {
            height = val.trim().parse().unwrap_or(0);
        } else if let Some(val) = line.strip_prefix("r_frame_rate=") {
            // "24/1", "30000/1001"
            let mut parts = val.trim().splitn(2, '/');
            let num: f64 = parts.next().and_then(|s| s.parse().ok()).unwrap_or(30.0);
            let den: f64 = parts.next().and_then(|s| s.parse().ok()).unwrap_or(1.0);
            if den > 0.0 && num > 0.0 {
                fps = num / den;
            }
        } else if let Some(val) = line.strip_prefix("duration=") {
            duration = val.trim().parse::<f64>().ok().filter(|d| *d > 0.0);
        }
    }

    (width > 0 && height > 0).then_some(VideoInfo {
        width,
        height,
        fps,
        duration,
    })
}

/// Lance un processus `ffmpeg` qui écrit des frames gray 8 bits sur stdout.
///
/// Chaque frame = `w × h` bytes row-major, mise à l'échelle bicubique.
/// `-ss` avant `-i` = seek rapide.
///
/// # Errors
/// Retourne une erreur si le chemin n'est pas UTF-8 ou si ffmpeg ne démarre pas.
pub fn spawn_gray_pipe(path: &Path, w: u32, h: u32, clip: Clip) -> Result<Child> {
    let path_str = path.to_str().context("Chemin vidéo invalide (non-UTF8)")?;
    let scale_filter = format!("scale={w}:{h}:flags=bicubic");

    let child = Command::new("ffmpeg")
        .args(clip.args())
        .args([
            "-i",
            path_str,
            "-vf",
            &scale_filter,
            "-pix_fmt",
            "gray",
            "-f",
            "rawvideo",
            "-an",
            "-hide_banner",
            "-loglevel",
            "error",
            "pipe:1",
        ])
        .stdout(Stdio::piped())
        .stdin(Stdio::null())
        .stderr(Stdio::null())
        .spawn()
        .context("Impossible de lancer ffmpeg. Vérifiez qu'il est installé et dans le PATH.")?;
    log::debug!("ffmpeg spawné: {w}x{h} gray depuis {:.1}s", clip.start);
    Ok(child)
}

/// Lit exactement `buf.len()` bytes depuis `reader`.
///
/// # Errors
/// Retourne `Ok(true)` si lu avec succès, `Ok(false)` sur EOF avant complétion,
/// `Err` sur erreur I/O fatale.
pub fn read_exact_or_eof<R: Read>(reader: &mut R, buf: &mut [u8]) -> Result<bool> {
    let mut total = 0usize;
    while total < buf.len() {
        match reader.read(&mut buf[total..]) {
            Ok(0) => return Ok(false),
            Ok(n) => total += n,
            Err(e) if e.kind() == std::io::ErrorKind::Interrupted => {}
            Err(e) => return Err(e.into()),
        }
    }
    Ok(true)
}

/// Spawne le thread de décodage.
///
/// Le thread lit les frames depuis stdout de ffmpeg et les envoie via
/// `frame_tx`. Il s'arrête sur EOF ou quand le receveur est abandonné, et
/// renvoie le nombre de frames envoyées.
///
/// # Errors
/// Retourne une erreur si ffmpeg ou le thread ne démarrent pas.
pub fn spawn_decoder_thread(
    path: PathBuf,
    w: u32,
    h: u32,
    clip: Clip,
    frame_tx: Sender<GrayFrame>,
) -> Result<thread::JoinHandle<Result<usize>>> {
    let child = spawn_gray_pipe(&path, w, h, clip)?;
    thread::Builder::new()
        .name("tf-decode".to_string())
        .spawn(move || decode_loop(child, w, h, &frame_tx))
        .context("Impossible de spawner le thread de décodage")
}

fn decode_loop(mut child: Child, w: u32, h: u32, frame_tx: &Sender<GrayFrame>) -> Result<usize> {
    let frame_bytes = w as usize * h as usize;
    let Some(mut stdout) = child.stdout.take() else {
        let _ = child.kill();
        return Err(anyhow!("stdout ffmpeg indisponible"));
    };

    let mut sent = 0usize;
    loop {
        let mut frame = GrayFrame::new(w, h);
        match read_exact_or_eof(&mut stdout, &mut frame.data[..frame_bytes]) {
            Ok(true) => {
                if frame_tx.send(frame).is_err() {
                    log::debug!("Thread décodage: receveur fermé après {sent} frames");
                    break;
                }
                sent += 1;
            }
            Ok(false) => {
                log::info!("Thread décodage: EOF après {sent} frames");
                break;
            }
            Err(e) => {
                let _ = child.kill();
                let _ = child.wait();
                return Err(e.context("Lecture du pipe ffmpeg"));
            }
        }
    }

    let _ = child.kill();
    let _ = child.wait();
    Ok(sent)
}

/// Décode `path` à `w × h` et passe chaque frame, dans l'ordre, à `on_frame`.
///
/// Une erreur de `on_frame` arrête le décodage. Retourne les métadonnées du
/// flux et le nombre de frames traitées.
///
/// # Errors
/// Propage les erreurs de ffprobe, ffmpeg, du thread ou de `on_frame`.
///
/// # Example
/// ```no_run
/// use std::path::Path;
/// use tf_source::video::{Clip, decode_frames};
/// let (info, n) = decode_frames(Path::new("video.mp4"), 720, 344, Clip::default(), |_f| Ok(())).unwrap();
/// ```
pub fn decode_frames<F>(
    path: &Path,
    w: u32,
    h: u32,
    clip: Clip,
    mut on_frame: F,
) -> Result<(VideoInfo, usize)>
where
    F: FnMut(GrayFrame) -> Result<()>,
{
    let info = probe_video(path)?;
    let (tx, rx) = flume::bounded(FRAME_QUEUE);
    let handle = spawn_decoder_thread(path.to_path_buf(), w, h, clip, tx)?;

    let mut consumed = 0usize;
    let mut failure = None;
    for frame in rx.iter() {
        if let Err(e) = on_frame(frame) {
            failure = Some(e);
            break;
        }
        consumed += 1;
    }
    drop(rx);

    let decoded = handle
        .join()
        .map_err(|_| anyhow!("Le thread de décodage a paniqué"))?;
    if let Some(e) = failure {
        return Err(e);
    }
    decoded?;
    Ok((info, consumed))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn probe_output_is_parsed() {
        let text = "width=1280\nheight=720\nr_frame_rate=30000/1001\nduration=12.512000\n";
        let info = parse_probe(text).unwrap();
        assert_eq!((info.width, info.height), (1280, 720));
        assert!((info.fps - 29.97).abs() < 0.01);
        assert_eq!(info.duration, Some(12.512));
    }

    #[test]
    fn probe_without_stream_is_none() {
        assert_eq!(parse_probe(""), None);
        assert_eq!(parse_probe("width=0\nheight=720\n"), None);
    }

    #[test]
    fn unknown_duration_and_bad_rate_fall_back() {
        let info = parse_probe("width=8\nheight=8\nr_frame_rate=0/0\nduration=N/A\n").unwrap();
        assert_eq!(info.fps, 30.0);
        assert_eq!(info.duration, None);
    }

    #[test]
    fn read_exact_or_eof_reports_short_reads() {
        let mut buf = [0u8; 4];
        let mut full = Cursor::new(vec![1, 2, 3, 4, 5]);
        assert!(read_exact_or_eof(&mut full, &mut buf).unwrap());
        assert_eq!(buf, [1, 2, 3, 4]);
        assert!(!read_exact_or_eof(&mut full, &mut buf).unwrap());
    }

    #[test]
    fn clip_ignores_non_positive_duration() {
        assert_eq!(Clip::new(0.0, Some(-1.0)), Clip::default());
        assert_eq!(Clip::new(-3.0, None).start, 0.0);
        assert_eq!(Clip::new(2.5, None).args(), vec!["-ss", "2.500"]);
    }
}
