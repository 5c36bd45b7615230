mod dense;

pub use dense::DenseLayer;
