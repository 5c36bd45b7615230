use std::num::NonZeroUsize;

use crate::error::{AeError, Result};

/// An in-memory training set of fixed-width rows.
///
/// Rows are stored contiguously in row-major order so the trainer can walk
/// them without indirection. Width checks happen at construction, not per
/// access.
#[derive(Debug, Clone)]
pub struct Dataset {
    dim: usize,
    data: Vec<f32>,
}

impl Dataset {
    /// Builds a dataset from individual rows. The first row fixes the width.
    ///
    /// # Errors
    ///
    /// Returns [`AeError::DimensionMismatch`] when any later row differs in
    /// width from the first.
    pub fn from_rows<R: AsRef<[f32]>>(rows: &[R]) -> Result<Self> {
        let dim = rows.first().map_or(0, |row| row.as_ref().len());

        let mut data = Vec::with_capacity(rows.len() * dim);
        for row in rows {
            let row = row.as_ref();
            if row.len() != dim {
                return Err(AeError::DimensionMismatch {
                    what: "dataset row",
                    got: row.len(),
                    expected: dim,
                });
            }
            data.extend_from_slice(row);
        }

        Ok(Self { dim, data })
    }

    /// Builds a dataset from one flat row-major buffer.
    ///
    /// # Errors
    ///
    /// Returns [`AeError::DimensionMismatch`] when the buffer length is not
    /// a multiple of `dim`.
    pub fn from_flat(dim: NonZeroUsize, data: Vec<f32>) -> Result<Self> {
        let dim = dim.get();
        if data.len() % dim != 0 {
            return Err(AeError::DimensionMismatch {
                what: "flat dataset length",
                got: data.len(),
                expected: (data.len() / dim + 1) * dim,
            });
        }
        Ok(Self { dim, data })
    }

    /// Width of every row.
    #[inline]
    pub fn dim(&self) -> usize {
        self.dim
    }

    /// Number of rows.
    #[inline]
    pub fn len(&self) -> usize {
        if self.dim == 0 { 0 } else { self.data.len() / self.dim }
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Returns the row at `idx` (panics if out of bounds).
    #[inline]
    pub fn row(&self, idx: usize) -> &[f32] {
        &self.data[idx * self.dim..(idx + 1) * self.dim]
    }

    /// Iterates over rows in insertion order.
    pub fn rows(&self) -> impl Iterator<Item = &[f32]> {
        self.data.chunks_exact(self.dim.max(1))
    }
}
