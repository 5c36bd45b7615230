use std::{error::Error, fmt, io};

/// The crate's result type.
pub type Result<T> = std::result::Result<T, AeError>;

/// Failures produced while building, training or persisting an autoencoder.
#[derive(Debug)]
pub enum AeError {
    /// The requested layer count and dimensions cannot form a telescoping
    /// stack that narrows from the input width down to the latent width.
    InvalidTopology {
        layers: usize,
        input_dim: usize,
        latent_dim: usize,
        reason: &'static str,
    },

    /// A vector or dataset width does not match the width a layer stack
    /// expects at that point.
    DimensionMismatch {
        /// Human-readable context for the mismatch (e.g. "encode input").
        what: &'static str,
        /// Observed value.
        got: usize,
        /// Expected value.
        expected: usize,
    },

    /// Training options describe a run that cannot make progress, such as
    /// zero epochs or an empty dataset.
    InvalidOptions(&'static str),

    /// The loss stopped being a finite number during optimization.
    Diverged { step: usize, loss: f32 },

    /// An archive could not be read from or written to its backing store.
    Io(io::Error),

    /// Archive bytes violate the format or describe an impossible model.
    CorruptArchive { reason: String },
}

impl fmt::Display for AeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AeError::InvalidTopology {
                layers,
                input_dim,
                latent_dim,
                reason,
            } => write!(
                f,
                "invalid topology ({layers} layers, {input_dim} -> {latent_dim}): {reason}"
            ),
            AeError::DimensionMismatch { what, got, expected } => {
                write!(f, "dimension mismatch for {what}: got {got}, expected {expected}")
            }
            AeError::InvalidOptions(msg) => write!(f, "invalid training options: {msg}"),
            AeError::Diverged { step, loss } => {
                write!(f, "training diverged at step {step}: loss {loss}")
            }
            AeError::Io(e) => write!(f, "io error: {e}"),
            AeError::CorruptArchive { reason } => write!(f, "corrupt archive: {reason}"),
        }
    }
}

impl Error for AeError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            AeError::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for AeError {
    fn from(value: io::Error) -> Self {
        Self::Io(value)
    }
}

/// Boundary conversion for binaries / I/O APIs.
impl From<AeError> for io::Error {
    fn from(value: AeError) -> Self {
        match value {
            AeError::Io(e) => e,
            other => io::Error::new(io::ErrorKind::InvalidData, other),
        }
    }
}
