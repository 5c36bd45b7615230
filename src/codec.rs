//! Versioned sequential archive for trained models.
//!
//! Layout: a four-byte magic, a format version word, the three topology
//! words (layer count, input width, latent width), then the parameter
//! blocks of the encoder followed by the decoder, each layer's weights
//! before its biases. Words are big-endian `u32`, parameters raw `f32`
//! bit patterns.

use std::{
    fs::File,
    io::{self, BufReader, BufWriter, Read, Write},
    path::Path,
};

use crate::{
    error::{AeError, Result},
    model::Autoencoder,
    topology::Topology,
};

type Word = u32;
const WORD_SIZE: usize = size_of::<Word>();

const MAGIC: [u8; 4] = *b"aenc";
const VERSION: Word = 1;

/// Writes `model` into `sink` in archive format.
pub fn write_model<W: Write>(model: &Autoencoder, sink: &mut W) -> Result<()> {
    sink.write_all(&MAGIC)?;
    sink.write_all(&VERSION.to_be_bytes())?;

    let topology = model.topology();
    let header = [topology.layers(), topology.input_dim(), topology.latent_dim()];
    for word in header {
        sink.write_all(&(word as Word).to_be_bytes())?;
    }

    for layer in model.pipeline() {
        sink.write_all(bytemuck::cast_slice(model.layer_params(layer)))?;
    }
    Ok(())
}

/// Reads a model back from `source`.
///
/// # Errors
///
/// Returns [`AeError::CorruptArchive`] when the bytes do not follow the
/// format, describe an impossible topology, end early, continue past the
/// last parameter block or contain non-finite parameters. Underlying
/// transport failures surface as [`AeError::Io`].
pub fn read_model<R: Read>(source: &mut R) -> Result<Autoencoder> {
    let mut magic = [0u8; MAGIC.len()];
    fill(source, &mut magic)?;
    if magic != MAGIC {
        return Err(corrupt("not an autoencoder archive"));
    }

    let version = read_word(source)?;
    if version != VERSION {
        return Err(corrupt(format!("unsupported archive version {version}")));
    }

    let layers = read_word(source)? as usize;
    let input_dim = read_word(source)? as usize;
    let latent_dim = read_word(source)? as usize;
    let topology =
        Topology::new(layers, input_dim, latent_dim).map_err(|e| corrupt(e.to_string()))?;

    let mut model = Autoencoder::from_topology(topology);
    let spans: Vec<_> = model.pipeline().map(|layer| layer.span()).collect();
    let params = model.params_mut();
    for span in spans {
        fill(source, bytemuck::cast_slice_mut(&mut params[span]))?;
    }

    let mut trailing = [0u8; 1];
    if source.read(&mut trailing)? != 0 {
        return Err(corrupt("trailing bytes after the parameter blocks"));
    }
    if model.params().iter().any(|w| !w.is_finite()) {
        return Err(corrupt("non-finite parameter"));
    }

    Ok(model)
}

pub(crate) fn save_file(model: &Autoencoder, path: impl AsRef<Path>) -> Result<()> {
    let mut sink = BufWriter::new(File::create(path)?);
    write_model(model, &mut sink)?;
    sink.flush()?;
    Ok(())
}

pub(crate) fn load_file(path: impl AsRef<Path>) -> Result<Autoencoder> {
    let mut source = BufReader::new(File::open(path)?);
    read_model(&mut source)
}

/// `read_exact` with short reads reported as corruption, not I/O failure.
fn fill<R: Read>(source: &mut R, buf: &mut [u8]) -> Result<()> {
    source.read_exact(buf).map_err(|e| match e.kind() {
        io::ErrorKind::UnexpectedEof => corrupt("unexpected end of archive"),
        _ => AeError::Io(e),
    })
}

fn read_word<R: Read>(source: &mut R) -> Result<Word> {
    let mut buf = [0u8; WORD_SIZE];
    fill(source, &mut buf)?;
    Ok(Word::from_be_bytes(buf))
}

fn corrupt(reason: impl Into<String>) -> AeError {
    AeError::CorruptArchive {
        reason: reason.into(),
    }
}
