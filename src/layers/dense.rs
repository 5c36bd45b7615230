use std::ops::Range;

use ndarray::{Array1, ArrayView1, ArrayView2};

/// A fully connected layer with a rectifier activation.
///
/// The layer owns no parameters. It records its widths and the span of the
/// model's flat parameter buffer that belongs to it, and reads weights and
/// biases through views on demand. Weights are stored row-major as an
/// `(in, out)` matrix followed by `out` biases.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DenseLayer {
    dim: (usize, usize),
    span: Range<usize>,
}

impl DenseLayer {
    pub(crate) fn new(dim: (usize, usize), offset: usize) -> Self {
        let size = (dim.0 + 1) * dim.1;
        Self {
            dim,
            span: offset..offset + size,
        }
    }

    /// Width of the vectors this layer consumes.
    pub fn in_dim(&self) -> usize {
        self.dim.0
    }

    /// Width of the vectors this layer produces.
    pub fn out_dim(&self) -> usize {
        self.dim.1
    }

    /// The amount of parameters this layer has, weights plus biases.
    pub fn size(&self) -> usize {
        (self.dim.0 + 1) * self.dim.1
    }

    /// This layer's region of the model's flat parameter buffer.
    pub(crate) fn span(&self) -> Range<usize> {
        self.span.clone()
    }

    /// Applies the layer to one sample: `relu(x * W + b)`.
    pub(crate) fn forward(&self, params: &[f32], x: ArrayView1<f32>) -> Array1<f32> {
        debug_assert_eq!(params.len(), self.size());
        debug_assert_eq!(x.len(), self.dim.0);

        let (w, b) = self.view_params(params);
        let mut z = x.dot(&w);
        z += &b;
        z.mapv_inplace(|v| v.max(0.0));
        z
    }

    /// Accumulates this layer's gradient for one sample and returns the
    /// delta to propagate to the layer below.
    ///
    /// `x` and `a` are the activations recorded on the forward pass, `delta`
    /// is the loss gradient with respect to `a`. `grad` is this layer's
    /// gradient slice and is added to, so a full pass over the dataset sums
    /// per-sample contributions.
    pub(crate) fn backward(
        &self,
        params: &[f32],
        grad: &mut [f32],
        x: ArrayView1<f32>,
        a: ArrayView1<f32>,
        mut delta: Array1<f32>,
    ) -> Array1<f32> {
        debug_assert_eq!(grad.len(), self.size());
        debug_assert_eq!(delta.len(), self.dim.1);

        // The rectifier passes gradient only where the unit fired.
        delta.zip_mut_with(&a, |d, &a| {
            if a <= 0.0 {
                *d = 0.0;
            }
        });

        let w_size = self.size() - self.dim.1;
        let (dw_raw, db_raw) = grad.split_at_mut(w_size);
        for (i, &xi) in x.iter().enumerate() {
            let row = &mut dw_raw[i * self.dim.1..(i + 1) * self.dim.1];
            for (dw, &d) in row.iter_mut().zip(delta.iter()) {
                *dw += xi * d;
            }
        }
        for (db, &d) in db_raw.iter_mut().zip(delta.iter()) {
            *db += d;
        }

        let (w, _) = self.view_params(params);
        w.dot(&delta)
    }

    /// Gives a view of the raw parameter slice as the weights and biases of
    /// this layer.
    fn view_params<'a>(&self, params: &'a [f32]) -> (ArrayView2<'a, f32>, ArrayView1<'a, f32>) {
        let w_size = self.size() - self.dim.1;
        let weights = ArrayView2::from_shape(self.dim, &params[..w_size]).unwrap();
        let biases = ArrayView1::from_shape(self.dim.1, &params[w_size..]).unwrap();
        (weights, biases)
    }
}
