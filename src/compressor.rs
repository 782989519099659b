pub use anyhow::Result;
use thiserror::Error;

/// Represents an error emitted while building, applying, or parsing a Huffman code.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CodingError {
    /// A tree was requested for an empty frequency list.
    #[error("invalid input: {0}")]
    InvalidInput(&'static str),

    /// A symbol was requested from a tree that has no leaf for it.
    ///
    /// This should (practically) never happen, the symbol set always comes from the same frequency list.
    #[error("symbol 0x{0:02x} has no leaf in the huffman tree")]
    SymbolNotFound(u8),

    /// A symbol of the input has no entry in the code table used for encoding.
    #[error("symbol 0x{0:02x} is not present in the code table")]
    SymbolNotInTable(u8),

    /// The bit stream does not resolve to a sequence of codes under the given table.
    ///
    /// The argument describes where decoding stopped.
    #[error("undecodable bit sequence: {0}")]
    UndecodableSequence(String),

    /// A textual code table or frequency report could not be parsed.
    #[error("malformed table at line {line}: {reason}")]
    MalformedTable { line: usize, reason: String },

    /// An encoded payload or container was too short or otherwise inconsistent.
    #[error("malformed payload: {0}")]
    MalformedPayload(String),
}

/// Represents shared behavior for all compressors.
///
/// Provides a method [`compress_bytes`](Compressor::compress_bytes) to compress data and
/// [`decompress_bytes`](Compressor::decompress_bytes) to decompress data.
///
/// # Note
///
/// No guarantees are made about the length of the resulting [`Vec<u8>`] from
/// [`compress_bytes`](Compressor::compress_bytes). It can be shorter, equal in length, or longer.
/// The only guarantee is that [`decompress_bytes`](Compressor::decompress_bytes) will be able to
/// reconstruct the original data.
pub trait Compressor {
    /// Compresses a given byte slice and returns the encoded data.
    fn compress_bytes(&mut self, data: &[u8]) -> Result<Vec<u8>>;

    /// Decompresses a given byte slice and returns the decoded data.
    ///
    /// # Errors
    ///
    /// Returns an error if the input data was malformed, or if the embedded table does not describe it.
    fn decompress_bytes(&mut self, data: &[u8]) -> Result<Vec<u8>>;

    /// Returns the name of the compressor algorithm.
    fn compressor_name(&self) -> String {
        core::any::type_name::<Self>().to_string()
    }

    /// Performs a round-trip test on the compressor.
    ///
    /// Use for sanity checking the compressor and decompressor.
    fn test_roundtrip<'orig>(&mut self, data: &'orig [u8]) -> Result<RoundTripTestResult<'orig>> {
        let compressed = self.compress_bytes(data)?;
        let decompressed = self.decompress_bytes(&compressed)?;
        let equal = data == decompressed.as_slice();

        Ok(RoundTripTestResult {
            equal,
            original: data,
            compressed,
            decompressed,
        })
    }
}

/// Represents the result of a round-trip test.
///
/// Use accessor methods to retrieve the [`result`][RoundTripTestResult::is_successful],
/// the [`original data`][RoundTripTestResult::get_original],
/// the [`compressed data`][RoundTripTestResult::get_compressed],
/// and the [`decompressed data`][RoundTripTestResult::get_decompressed].
#[derive(Clone, Debug, Hash)]
pub struct RoundTripTestResult<'orig> {
    pub(crate) equal: bool,
    pub(crate) original: &'orig [u8],
    pub(crate) compressed: Vec<u8>,
    pub(crate) decompressed: Vec<u8>,
}

impl<'orig> RoundTripTestResult<'orig> {
    /// Whether the original and decompressed data were equal.
    pub const fn is_successful(&self) -> bool {
        self.equal
    }

    pub const fn get_original(&self) -> &'orig [u8] {
        self.original
    }

    pub fn get_compressed(&self) -> &[u8] {
        self.compressed.as_slice()
    }

    pub fn get_decompressed(&self) -> &[u8] {
        self.decompressed.as_slice()
    }

    /// Compressed size divided by original size, `0.0` for empty originals.
    pub fn ratio(&self) -> f64 {
        if self.original.is_empty() {
            return 0.0;
        }
        self.compressed.len() as f64 / self.original.len() as f64
    }
}
