use anyhow::Result;
use clap::Parser;
use tf_core::RunConfig;

pub mod cli;
pub mod pipeline;

fn main() -> Result<()> {
    // 1. Parser CLI
    let cli = cli::Cli::parse();

    // 2. Initialiser le logging
    env_logger::Builder::new()
        .filter_level(cli.log_level.parse().unwrap_or(log::LevelFilter::Warn))
        .init();

    // 3. Charger la config puis appliquer les overrides CLI
    let mut config = resolve_config(&cli)?;
    cli.apply(&mut config);
    log::debug!("config effective : {config:?}");

    // 4. Lancer le pipeline
    let opts = pipeline::RunOptions {
        input: cli.input.clone(),
        output: cli.output.clone(),
        reassign: cli.reassign,
        sample_stride: usize::try_from(cli.sample_stride).unwrap_or(usize::MAX),
        random_seed: cli.random_palette,
        order: cli.queue_order(),
    };
    let paths = pipeline::run(&config, &opts)?;
    log::info!("sorties écrites dans {}", paths.folder.display());
    Ok(())
}

/// `--config` when given, defaults otherwise.
fn resolve_config(cli: &cli::Cli) -> Result<RunConfig> {
    match cli.config {
        Some(ref path) => tf_core::config::load_config(path),
        None => Ok(RunConfig::default()),
    }
}
