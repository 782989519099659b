use core::fmt::{self, Display};

use crate::{
    algorithms::{
        bitpack::{self, EncodedPayload},
        code_table::CodeTable,
        frequency::{FrequencyEntry, count_frequencies},
        sidefile,
        tree::HuffmanTree,
    },
    compressor::{CodingError, Compressor, Result},
};

if_tracing! {
    use tracing::{Level, info, span};
}

/// Everything one encoding pass produces.
#[derive(Clone, Debug)]
pub struct Encoded {
    pub frequencies: Vec<FrequencyEntry>,
    /// `None` for empty input.
    pub tree: Option<HuffmanTree>,
    pub table: CodeTable,
    pub payload: EncodedPayload,
}

/// Counts, builds the tree, derives the table and packs `data` with it.
pub fn encode(data: &[u8]) -> Result<Encoded, CodingError> {
    if_tracing! {
        let session = span!(Level::INFO, "huffman_encode", input_len = data.len());
        let _enter = session.enter();
    }

    let frequencies = count_frequencies(data);
    let (tree, table) = if frequencies.is_empty() {
        (None, CodeTable::default())
    } else {
        let tree = HuffmanTree::build(&frequencies)?;
        if_tracing! {
            info!(leaves = tree.leaf_count(), internal = tree.internal_count(), depth = tree.depth(), "huffman tree built");
        }
        let table = CodeTable::derive(&tree, frequencies.iter().map(|e| e.symbol))?;
        (Some(tree), table)
    };
    let payload = bitpack::pack(data, &table)?;

    if_tracing! {
        info!(distinct = frequencies.len(), bit_count = payload.bit_count, "encode finished");
    }

    Ok(Encoded {
        frequencies,
        tree,
        table,
        payload,
    })
}

pub fn decode(payload: &EncodedPayload, table: &CodeTable) -> Result<Vec<u8>, CodingError> {
    if_tracing! {
        let session = span!(Level::INFO, "huffman_decode", bit_count = payload.bit_count);
        let _enter = session.enter();
    }
    bitpack::unpack(payload, table)
}

/// Huffman coding into a single self-contained buffer.
///
/// Layout: the length of the textual code table as a little-endian `u32`, the table itself,
/// then the packed payload with its bit count trailer.
#[derive(Clone, Copy, Debug, Default)]
pub struct HuffmanCoding;

impl HuffmanCoding {
    pub fn huffman_encode(&self, data: &[u8]) -> Result<Vec<u8>, CodingError> {
        let encoded = encode(data)?;
        let table = sidefile::render_code_table(&encoded.table);
        let table_len = u32::try_from(table.len())
            .map_err(|_| CodingError::MalformedPayload(format!("code table of {} bytes is too large", table.len())))?;

        let payload = encoded.payload.to_bytes();
        let mut out = Vec::with_capacity(size_of::<u32>() + table.len() + payload.len());
        out.extend_from_slice(&table_len.to_le_bytes());
        out.extend_from_slice(&table);
        out.extend_from_slice(&payload);
        Ok(out)
    }

    pub fn huffman_decode(&self, data: &[u8]) -> Result<Vec<u8>, CodingError> {
        let (len, rest) = data
            .split_first_chunk::<4>()
            .ok_or_else(|| CodingError::MalformedPayload("missing code table length".to_string()))?;
        let table_len = u32::from_le_bytes(*len) as usize;
        let (table, payload) = rest.split_at_checked(table_len).ok_or_else(|| {
            CodingError::MalformedPayload(format!(
                "code table claims {} bytes but only {} remain",
                table_len,
                rest.len()
            ))
        })?;

        let table = sidefile::parse_code_table(table)?;
        let payload = EncodedPayload::from_bytes(payload)?;
        decode(&payload, &table)
    }
}

impl Compressor for HuffmanCoding {
    fn compress_bytes(&mut self, data: &[u8]) -> Result<Vec<u8>> {
        Ok(self.huffman_encode(data)?)
    }

    fn decompress_bytes(&mut self, data: &[u8]) -> Result<Vec<u8>> {
        Ok(self.huffman_decode(data)?)
    }

    fn compressor_name(&self) -> String {
        self.to_string()
    }
}

impl Display for HuffmanCoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Huffman Coding")
    }
}
