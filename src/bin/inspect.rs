#![recursion_limit = "256"]

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use burn::backend::Wgpu;
use clap::Parser;
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::{debug, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use boardnet::config::AppConfig;
use boardnet::data::SliceSampler;

type InferBackend = Wgpu<f32, i32>;

/// Inspect the epoch sampler and the policy-value network for a configuration.
#[derive(Parser)]
#[command(name = "inspect", about = "Inspect sampler batches and network output")]
struct Cli {
    /// Path to TOML configuration file
    #[arg(long, default_value = "config.toml")]
    config: PathBuf,

    /// Number of examples in the (hypothetical) training dataset
    #[arg(long, default_value_t = 10_000)]
    dataset_len: usize,

    /// Number of epochs to draw from the sampler
    #[arg(long, default_value_t = 2)]
    epochs: usize,

    /// Board height; height * width must equal network.policy_size
    #[arg(long, default_value_t = 6)]
    height: usize,

    /// Board width
    #[arg(long, default_value_t = 7)]
    width: usize,

    /// Override the sampler seed
    #[arg(long)]
    seed: Option<u64>,

    /// Print the default configuration as TOML and exit
    #[arg(long)]
    print_default_config: bool,
}

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    if cli.print_default_config {
        print!("{}", AppConfig::default_toml());
        return Ok(());
    }

    let mut config = AppConfig::load_or_default(&cli.config)
        .with_context(|| format!("loading config from {}", cli.config.display()))?;
    if cli.seed.is_some() {
        config.sampler.seed = cli.seed;
    }
    if cli.height * cli.width != config.network.policy_size {
        bail!(
            "board {}x{} does not match network.policy_size {}",
            cli.height,
            cli.width,
            config.network.policy_size
        );
    }

    inspect_sampler(&config, cli.dataset_len, cli.epochs)?;
    inspect_network(&config, cli.height, cli.width)
}

fn inspect_sampler(config: &AppConfig, dataset_len: usize, epochs: usize) -> Result<()> {
    let sampler = SliceSampler::from_config(dataset_len, &config.sampler)
        .context("building slice sampler")?;
    info!(
        dataset_len,
        num_samples = sampler.num_samples(),
        num_slices = sampler.num_slices(),
        slices_per_batch = sampler.slices_per_batch(),
        num_batches = sampler.len(),
        "sampler ready"
    );

    let mut rng = match config.sampler.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    };

    for epoch in 0..epochs {
        let mut drawn = 0;
        let mut first_slices = Vec::new();
        for (i, batch) in sampler.epoch(&mut rng).enumerate() {
            if i == 0 {
                first_slices = batch
                    .chunks(sampler.slice_size())
                    .map(|slice| slice[0] / sampler.slice_size())
                    .collect();
            }
            drawn += batch.len();
        }
        debug!(epoch, ?first_slices, "first batch slices");
        info!(epoch, drawn, "epoch complete");
    }
    Ok(())
}

fn inspect_network(config: &AppConfig, height: usize, width: usize) -> Result<()> {
    let device = Default::default();
    let network = config.network.model_config().init::<InferBackend>(&device);

    let board = vec![vec![0.0f32; width]; height];
    let prediction = network
        .predict(&board)
        .context("running prediction on empty board")?;
    info!(value = prediction.value, "empty-board prediction");

    println!(
        "{}",
        serde_json::to_string_pretty(&prediction).context("serializing prediction")?
    );
    Ok(())
}
