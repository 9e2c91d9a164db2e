use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tf_core::{
    Assignment, CONTRAST_GAIN, GrayFrame, LogProgress, Palette, RunConfig, TileCorpus, TileShape,
};
use tf_export::{GrayMuxer, frame_from_tiles, save_indices, save_palette};
use tf_palette::{NearestAssigner, QueueOrder, Quantizer, random_palette};
use tf_source::image::load_gray_resized;
use tf_source::tiles_from_frame;
use tf_source::video::{Clip, decode_frames};

/// Cadence d'une image fixe encodée en vidéo.
const STILL_FPS: f64 = 24.0;

const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "bmp", "gif"];

/// Options du run qui ne font pas partie de [`RunConfig`].
#[derive(Clone, Debug)]
pub struct RunOptions {
    pub input: PathBuf,
    pub output: Option<PathBuf>,
    pub reassign: bool,
    pub sample_stride: usize,
    pub random_seed: Option<u64>,
    pub order: QueueOrder,
}

/// Chemins des fichiers produits.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OutputPaths {
    pub folder: PathBuf,
    pub palette: PathBuf,
    pub indices: PathBuf,
    pub video: PathBuf,
}

impl OutputPaths {
    /// `{name}_{n}_{size_y}` prefix inside `output`, or inside a folder of
    /// that name when no output folder is given.
    #[must_use]
    pub fn new(input: &Path, output: Option<&Path>, n_palette: usize, size_y: usize) -> Self {
        let name = input
            .file_stem()
            .map_or_else(|| "tilefont".to_string(), |s| s.to_string_lossy().into_owned());
        let prefix = format!("{name}_{n_palette}_{size_y}");
        let folder = output.map_or_else(|| PathBuf::from(&prefix), Path::to_path_buf);
        Self {
            palette: folder.join(format!("{prefix}_palette.txt")),
            indices: folder.join(format!("{prefix}_closest_tile.txt")),
            video: folder.join(format!("{prefix}_dithered.mp4")),
            folder,
        }
    }
}

/// Tuiles de toutes les frames, dans l'ordre, plus la cadence source.
pub struct LoadedFrames {
    pub corpus: TileCorpus,
    pub frames: usize,
    pub fps: f64,
}

/// True when `path` looks like a still image rather than a video.
#[must_use]
pub fn is_still_image(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| IMAGE_EXTENSIONS.contains(&e.to_ascii_lowercase().as_str()))
}

/// Load every frame of `input` at the tiler resolution and slice it.
///
/// # Errors
/// Returns an error if decoding fails or the tile shape is invalid.
pub fn load_frames(input: &Path, config: &RunConfig) -> Result<LoadedFrames> {
    let shape = TileShape::new(config.size_x, config.size_y)?;
    let (w, h) = (config.frame_width(), config.frame_height());
    let mut corpus = TileCorpus::new(shape);
    let mut push_frame = |mut frame: GrayFrame| -> Result<()> {
        if config.contrast_stretch {
            frame.contrast_stretch(CONTRAST_GAIN);
        }
        tiles_from_frame(&frame, config.n_x, config.n_y, &mut corpus)?;
        Ok(())
    };

    let (frames, fps) = if is_still_image(input) {
        push_frame(load_gray_resized(input, w, h)?)?;
        (1, STILL_FPS)
    } else {
        let clip = Clip::new(config.start, config.duration);
        let (info, frames) = decode_frames(input, w, h, clip, push_frame)?;
        (frames, info.fps)
    };

    if frames == 0 {
        anyhow::bail!("Aucune frame décodée depuis {}", input.display());
    }
    log::info!(
        "{frames} frames chargées, {} tuiles {}x{}",
        corpus.len(),
        shape.width,
        shape.height
    );
    Ok(LoadedFrames { corpus, frames, fps })
}

/// Tile indices belonging to every `stride`-th frame.
#[must_use]
pub fn sampled_tiles(frames: usize, tiles_per_frame: usize, stride: usize) -> Vec<usize> {
    (0..frames)
        .step_by(stride.max(1))
        .flat_map(|f| f * tiles_per_frame..(f + 1) * tiles_per_frame)
        .collect()
}

/// Build the palette and the assignment of every tile.
///
/// The quantizer's own assignment is kept when it saw the whole corpus and
/// no reassignment was asked for. Otherwise tiles go to their nearest swatch.
///
/// # Errors
/// Propagates quantizer and assignment errors.
pub fn build_palette(
    loaded: &LoadedFrames,
    config: &RunConfig,
    opts: &RunOptions,
) -> Result<(Palette, Assignment)> {
    let corpus = &loaded.corpus;
    let mut progress = LogProgress::default();

    let (palette, own) = if let Some(seed) = opts.random_seed {
        log::info!("palette aléatoire de {} swatches", config.n_palette);
        let shape = corpus.shape();
        (random_palette(config.n_palette, shape, seed)?, None)
    } else {
        let quantizer = Quantizer::new(config.dither)
            .matrix_size(config.matrix_size)
            .order(opts.order);
        if opts.sample_stride > 1 {
            let sample = corpus.select(sampled_tiles(
                loaded.frames,
                config.tiles_per_frame(),
                opts.sample_stride,
            ));
            log::info!(
                "palette construite sur {} tuiles (une frame sur {})",
                sample.len(),
                opts.sample_stride
            );
            let (palette, _) = quantizer.run(&sample, config.n_palette, &mut progress)?;
            (palette, None)
        } else {
            let (palette, assignment) = quantizer.run(corpus, config.n_palette, &mut progress)?;
            (palette, Some(assignment))
        }
    };

    if progress.dropped_budget() > 0 {
        log::warn!(
            "{} swatches perdues sur des bins vides ({} / {})",
            progress.dropped_budget(),
            palette.len(),
            config.n_palette
        );
    }

    let assignment = match own {
        Some(a) if !opts.reassign => a,
        _ => NearestAssigner::new(&palette)?.assign_observed(corpus, &mut progress)?,
    };
    Ok((palette, assignment))
}

/// Encode the reconstructed frames.
///
/// # Errors
/// Returns an error if ffmpeg fails or a frame cannot be rebuilt.
pub fn write_video(
    path: &Path,
    palette: &Palette,
    assignment: &Assignment,
    config: &RunConfig,
    fps: f64,
) -> Result<()> {
    let mut muxer = GrayMuxer::new(path, config.frame_width(), config.frame_height(), fps)?;
    for indices in assignment.frames(config.tiles_per_frame()) {
        let frame = frame_from_tiles(palette, indices, config.n_x, config.n_y)?;
        muxer.write_frame(&frame)?;
    }
    muxer.finish()
}

/// Full run: load, build the palette, assign, write outputs.
///
/// # Errors
/// Any stage failure aborts the run.
pub fn run(config: &RunConfig, opts: &RunOptions) -> Result<OutputPaths> {
    let paths = OutputPaths::new(
        &opts.input,
        opts.output.as_deref(),
        config.n_palette,
        config.size_y,
    );
    std::fs::create_dir_all(&paths.folder)
        .with_context(|| format!("Création du dossier {}", paths.folder.display()))?;

    let loaded = load_frames(&opts.input, config)?;
    let (palette, assignment) = build_palette(&loaded, config, opts)?;
    log::info!("palette de {} swatches", palette.len());

    save_palette(&paths.palette, &palette, config.n_palette)?;
    save_indices(&paths.indices, &assignment, config.n_x, config.n_y)?;

    if config.video_output {
        write_video(&paths.video, &palette, &assignment, config, loaded.fps)?;
        log::info!("vidéo écrite : {}", paths.video.display());
    } else {
        log::info!("sortie vidéo désactivée");
    }
    Ok(paths)
}
