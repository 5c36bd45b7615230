mod codec;
mod dataset;
mod error;
mod layers;
mod model;
mod optimization;
mod topology;
mod training;

pub use codec::{read_model, write_model};
pub use dataset::Dataset;
pub use error::{AeError, Result};
pub use layers::DenseLayer;
pub use model::Autoencoder;
pub use optimization::{Adam, Optimizer};
pub use topology::Topology;
pub use training::TrainingOptions;
