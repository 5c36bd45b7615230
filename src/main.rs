use std::{env, fs, io, num::NonZeroUsize};

use log::info;
use rand::{Rng, SeedableRng, rngs::StdRng};
use serde::Deserialize;

use autoencoder::{Autoencoder, Dataset, TrainingOptions};

/// A demo run: topology, synthetic dataset shape and training options.
#[derive(Debug, Deserialize)]
struct RunConfig {
    layers: usize,
    input_dim: usize,
    latent_dim: usize,
    /// Number of synthetic rows to train on.
    #[serde(default = "default_rows")]
    rows: usize,
    #[serde(default)]
    options: TrainingOptions,
    /// Where to store the trained archive.
    archive: Option<String>,
}

fn default_rows() -> usize {
    64
}

fn main() -> io::Result<()> {
    env_logger::init();

    let Some(path) = env::args().nth(1) else {
        return Err(io::Error::other("usage: autoencoder <run-config.json>"));
    };
    let config: RunConfig = serde_json::from_str(&fs::read_to_string(&path)?)?;
    info!("loaded run config from {path}: {config:?}");

    let mut model = Autoencoder::new(config.layers, config.input_dim, config.latent_dim)?;
    info!(
        "built {}-layer autoencoder, {} -> {} ({} params)",
        model.layer_count(),
        model.input_dim(),
        model.latent_dim(),
        model.num_params(),
    );

    let data = synthetic_rows(&config)?;
    let loss = model.train(&data, &config.options)?;
    info!("training finished: loss={loss}");

    let sample = data.row(0);
    let latent = model.encode(sample)?;
    let restored = model.decode(&latent)?;
    info!("row 0 latent={latent:?}");
    info!("row 0 reconstruction={restored:?}");

    if let Some(archive) = &config.archive {
        model.save(archive)?;
        let reloaded = Autoencoder::load(archive)?;
        info!("model written to {archive} ({} params)", reloaded.num_params());
    }

    Ok(())
}

/// Rows drawn around a handful of random prototypes, so the dataset has
/// fewer directions of variation than the input width.
fn synthetic_rows(config: &RunConfig) -> io::Result<Dataset> {
    let dim = NonZeroUsize::new(config.input_dim)
        .ok_or_else(|| io::Error::other("input_dim must be at least one"))?;

    let mut rng = match config.options.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    };

    let prototypes: Vec<Vec<f32>> = (0..4)
        .map(|_| {
            (0..config.input_dim)
                .map(|_| rng.random_range(0.0..1.0))
                .collect()
        })
        .collect();

    let mut flat = Vec::with_capacity(config.rows * config.input_dim);
    for i in 0..config.rows {
        let proto = &prototypes[i % prototypes.len()];
        for &v in proto {
            flat.push((v + rng.random_range(-0.05..0.05)).clamp(0.0, 1.0));
        }
    }

    Ok(Dataset::from_flat(dim, flat)?)
}
