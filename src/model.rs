use std::path::Path;

use ndarray::ArrayView1;

use crate::{
    codec,
    dataset::Dataset,
    error::{AeError, Result},
    layers::DenseLayer,
    topology::Topology,
    training::{self, TrainingOptions},
};

/// A symmetric dense autoencoder.
///
/// All parameters live in one flat buffer owned by the model. Each layer
/// addresses its own region of that buffer through a span, so the encoder,
/// the decoder and the composed reconstruction pipeline share storage.
/// Training updates the buffer in place and is immediately visible to
/// [`encode`](Self::encode) and [`decode`](Self::decode).
#[derive(Debug, Clone)]
pub struct Autoencoder {
    topology: Topology,
    encoder: Vec<DenseLayer>,
    decoder: Vec<DenseLayer>,
    params: Vec<f32>,
}

impl Autoencoder {
    /// Builds an untrained autoencoder with all parameters at zero.
    ///
    /// # Errors
    ///
    /// Returns [`AeError::InvalidTopology`] when the widths cannot form a
    /// narrowing stack, see [`Topology::new`].
    pub fn new(layers: usize, input_dim: usize, latent_dim: usize) -> Result<Self> {
        let topology = Topology::new(layers, input_dim, latent_dim)?;
        Ok(Self::from_topology(topology))
    }

    pub(crate) fn from_topology(topology: Topology) -> Self {
        let mut offset = 0;
        let encoder = build_stack(topology.encoder_dims(), &mut offset);
        let decoder = build_stack(topology.decoder_dims(), &mut offset);

        Self {
            topology,
            encoder,
            decoder,
            params: vec![0.0; offset],
        }
    }

    pub fn layer_count(&self) -> usize {
        self.topology.layers()
    }

    pub fn input_dim(&self) -> usize {
        self.topology.input_dim()
    }

    pub fn latent_dim(&self) -> usize {
        self.topology.latent_dim()
    }

    pub fn topology(&self) -> Topology {
        self.topology
    }

    /// Total number of parameters across both stacks.
    pub fn num_params(&self) -> usize {
        self.params.len()
    }

    /// The encoder stack, input side first.
    pub fn encoder(&self) -> &[DenseLayer] {
        &self.encoder
    }

    /// The decoder stack, latent side first.
    pub fn decoder(&self) -> &[DenseLayer] {
        &self.decoder
    }

    /// Maps one input sample to its latent representation.
    ///
    /// # Errors
    ///
    /// Returns [`AeError::DimensionMismatch`] when `input` is not exactly
    /// the input width.
    pub fn encode(&self, input: &[f32]) -> Result<Vec<f32>> {
        check_width("encode input", input.len(), self.input_dim())?;
        Ok(self.run_stack(&self.encoder, input))
    }

    /// Maps one latent vector back to input space.
    ///
    /// # Errors
    ///
    /// Returns [`AeError::DimensionMismatch`] when `latent` is not exactly
    /// the latent width.
    pub fn decode(&self, latent: &[f32]) -> Result<Vec<f32>> {
        check_width("decode input", latent.len(), self.latent_dim())?;
        Ok(self.run_stack(&self.decoder, latent))
    }

    /// Runs `decode(encode(input))`, the function training optimizes.
    pub fn reconstruct(&self, input: &[f32]) -> Result<Vec<f32>> {
        check_width("reconstruct input", input.len(), self.input_dim())?;
        let latent = self.run_stack(&self.encoder, input);
        Ok(self.run_stack(&self.decoder, &latent))
    }

    /// Fits the model to `data` by minimizing reconstruction error, and
    /// returns the lowest loss seen or the last evaluated loss depending on
    /// `keep_lowest_loss`.
    ///
    /// Parameters are re-randomized first, so repeated calls are independent
    /// runs rather than a continuation.
    pub fn train(&mut self, data: &Dataset, options: &TrainingOptions) -> Result<f32> {
        training::run(self, data, options)
    }

    /// Writes the model to a file in the versioned archive format.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        codec::save_file(self, path)
    }

    /// Reads a model back from a file written by [`save`](Self::save).
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        codec::load_file(path)
    }

    fn run_stack(&self, stack: &[DenseLayer], input: &[f32]) -> Vec<f32> {
        let mut a = ArrayView1::from(input).to_owned();
        for layer in stack {
            a = layer.forward(self.layer_params(layer), a.view());
        }
        a.to_vec()
    }

    /// Number of layers in the composed pipeline.
    pub(crate) fn depth(&self) -> usize {
        self.encoder.len() + self.decoder.len()
    }

    /// Layer `idx` of the composed pipeline, encoder side first.
    pub(crate) fn layer(&self, idx: usize) -> &DenseLayer {
        if idx < self.encoder.len() {
            &self.encoder[idx]
        } else {
            &self.decoder[idx - self.encoder.len()]
        }
    }

    /// Encoder layers followed by decoder layers, in buffer order.
    pub(crate) fn pipeline(&self) -> impl Iterator<Item = &DenseLayer> {
        self.encoder.iter().chain(self.decoder.iter())
    }

    pub(crate) fn params(&self) -> &[f32] {
        &self.params
    }

    pub(crate) fn params_mut(&mut self) -> &mut [f32] {
        &mut self.params
    }

    pub(crate) fn layer_params(&self, layer: &DenseLayer) -> &[f32] {
        &self.params[layer.span()]
    }
}

fn build_stack(dims: Vec<(usize, usize)>, offset: &mut usize) -> Vec<DenseLayer> {
    dims.into_iter()
        .map(|dim| {
            let layer = DenseLayer::new(dim, *offset);
            *offset += layer.size();
            layer
        })
        .collect()
}

fn check_width(what: &'static str, got: usize, expected: usize) -> Result<()> {
    if got != expected {
        return Err(AeError::DimensionMismatch {
            what,
            got,
            expected,
        });
    }
    Ok(())
}
