use crate::error::{AeError, Result};

/// Validated architecture of a symmetric autoencoder.
///
/// The encoder narrows the input width down to the latent width over
/// `layers` dense layers, and the decoder climbs from the latent width back
/// up to the input width with the same step. The last layer of each stack is
/// pinned to its exact target so truncation in the step never leaks into the
/// latent or output width.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Topology {
    layers: usize,
    input_dim: usize,
    latent_dim: usize,
}

impl Topology {
    /// Checks that the combination can form a narrowing stack.
    ///
    /// # Errors
    ///
    /// Returns [`AeError::InvalidTopology`] when any count is zero, when the
    /// latent width does not strictly shrink the input, when there are more
    /// layers than the width gap can interpolate, or when the total
    /// parameter count does not fit in `usize`.
    pub fn new(layers: usize, input_dim: usize, latent_dim: usize) -> Result<Self> {
        let fail = |reason| AeError::InvalidTopology {
            layers,
            input_dim,
            latent_dim,
            reason,
        };

        if layers == 0 {
            return Err(fail("layer count must be at least one"));
        }
        if latent_dim == 0 {
            return Err(fail("latent width must be at least one"));
        }
        if latent_dim >= input_dim {
            return Err(fail("latent width must be smaller than the input width"));
        }
        if layers > input_dim - latent_dim {
            return Err(fail("more layers than the width gap can interpolate"));
        }

        let topology = Self {
            layers,
            input_dim,
            latent_dim,
        };
        if topology.checked_num_params().is_none() {
            return Err(fail("parameter count overflows usize"));
        }
        Ok(topology)
    }

    pub fn layers(&self) -> usize {
        self.layers
    }

    pub fn input_dim(&self) -> usize {
        self.input_dim
    }

    pub fn latent_dim(&self) -> usize {
        self.latent_dim
    }

    /// Width removed per encoder layer, truncated toward zero.
    fn step(&self) -> usize {
        (self.input_dim - self.latent_dim) / self.layers
    }

    /// `(in, out)` widths of the encoder stack, input first.
    pub fn encoder_dims(&self) -> Vec<(usize, usize)> {
        let step = self.step();
        let width = |i: usize| self.input_dim - i * step;

        let mut dims = Vec::with_capacity(self.layers);
        for i in 1..self.layers {
            dims.push((width(i - 1), width(i)));
        }
        // Pin the last layer to the exact latent width.
        dims.push((width(self.layers - 1), self.latent_dim));
        dims
    }

    /// `(in, out)` widths of the decoder stack, latent first.
    ///
    /// Widths climb from the latent width by the same step the encoder
    /// descends with; only the last layer jumps to the exact input width.
    pub fn decoder_dims(&self) -> Vec<(usize, usize)> {
        let step = self.step();
        let width = |i: usize| self.latent_dim + i * step;

        let mut dims = Vec::with_capacity(self.layers);
        for i in 1..self.layers {
            dims.push((width(i - 1), width(i)));
        }
        // Pin the last layer to the exact input width.
        dims.push((width(self.layers - 1), self.input_dim));
        dims
    }

    /// Total number of parameters in the flat buffer, weights plus biases
    /// for both stacks.
    pub fn num_params(&self) -> usize {
        self.encoder_dims()
            .into_iter()
            .chain(self.decoder_dims())
            .map(|(input, output)| (input + 1) * output)
            .sum()
    }

    /// `num_params` with overflow reported as `None` instead of wrapping.
    /// Archive headers can name widths whose parameter count exceeds
    /// `usize`, and those must fail validation rather than arithmetic.
    fn checked_num_params(&self) -> Option<usize> {
        let step = self.step();
        let down = |i: usize| self.input_dim - i * step;
        let up = |i: usize| self.latent_dim + i * step;

        let mut total = 0usize;
        for i in 1..=self.layers {
            let (enc_out, dec_out) = if i == self.layers {
                (self.latent_dim, self.input_dim)
            } else {
                (down(i), up(i))
            };
            let enc = down(i - 1).checked_add(1)?.checked_mul(enc_out)?;
            let dec = up(i - 1).checked_add(1)?.checked_mul(dec_out)?;
            total = total.checked_add(enc)?.checked_add(dec)?;
        }
        Some(total)
    }
}
