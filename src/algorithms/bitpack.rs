use crate::{algorithms::code_table::CodeTable, compressor::CodingError};

if_tracing! {
    use tracing::{debug, info, warn};
}

/// Size of the bit count trailer that follows the packed bytes.
pub const TRAILER_LEN: usize = size_of::<u64>();

/// Packed code bits plus the number of bits that carry data.
///
/// The last byte may be partially filled, its unused low bits are zero and never decoded.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct EncodedPayload {
    pub bytes: Vec<u8>,
    pub bit_count: u64,
}

impl EncodedPayload {
    /// The packed bytes followed by the bit count as a little-endian `u64`.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.bytes.len() + TRAILER_LEN);
        out.extend_from_slice(&self.bytes);
        out.extend_from_slice(&self.bit_count.to_le_bytes());
        out
    }

    /// Splits the bit count trailer off `data`.
    pub fn from_bytes(data: &[u8]) -> Result<Self, CodingError> {
        let split = data.len().checked_sub(TRAILER_LEN).ok_or_else(|| {
            CodingError::MalformedPayload(format!(
                "payload is {} bytes, shorter than its {} byte bit count trailer",
                data.len(),
                TRAILER_LEN
            ))
        })?;
        let (bytes, trailer) = data.split_at(split);
        let mut count = [0u8; TRAILER_LEN];
        count.copy_from_slice(trailer);

        Ok(Self {
            bytes: bytes.to_vec(),
            bit_count: u64::from_le_bytes(count),
        })
    }

    /// Number of bits physically present in `bytes`.
    pub fn capacity_bits(&self) -> u64 {
        self.bytes.len() as u64 * 8
    }
}

/// MSB-first bit sink.
#[derive(Default, Debug)]
struct BitWriter {
    bytes: Vec<u8>,
    bit_count: u64,
}

impl BitWriter {
    fn with_capacity(bytes: usize) -> Self {
        Self {
            bytes: Vec::with_capacity(bytes),
            bit_count: 0,
        }
    }

    fn push_bit(&mut self, bit: bool) {
        let bit_offset = (self.bit_count % 8) as u32;
        if bit_offset == 0 {
            self.bytes.push(0);
        }
        if bit {
            if let Some(last) = self.bytes.last_mut() {
                *last |= 0x80 >> bit_offset;
            }
        }
        self.bit_count += 1;
    }

    fn finish(self) -> EncodedPayload {
        EncodedPayload {
            bytes: self.bytes,
            bit_count: self.bit_count,
        }
    }
}

/// Yields the first `bit_count` bits of a byte slice, MSB first.
fn bits_of(bytes: &[u8], bit_count: u64) -> impl Iterator<Item = bool> + '_ {
    (0..bit_count).map(move |i| {
        let byte = bytes[(i / 8) as usize];
        (byte >> (7 - (i % 8))) & 1 == 1
    })
}

/// Replaces every symbol of `data` with its code from `table`.
///
/// If `table` is a single symbol with an empty code, no bits are written and the
/// payload's `bit_count` holds the number of symbols instead.
///
/// # Errors
///
/// Returns [`CodingError::SymbolNotInTable`] if a symbol of `data` has no code.
pub fn pack(data: &[u8], table: &CodeTable) -> Result<EncodedPayload, CodingError> {
    if_tracing! {
        debug!(target = "bitpack", input_len = data.len(), table_len = table.len(), "pack start");
    }

    if let Some(symbol) = table.degenerate_symbol() {
        if let Some(&stray) = data.iter().find(|&&b| b != symbol) {
            return Err(CodingError::SymbolNotInTable(stray));
        }
        if_tracing! {
            info!(target = "bitpack", symbol = symbol, repeats = data.len(), "pack complete: single symbol run");
        }
        return Ok(EncodedPayload {
            bytes: Vec::new(),
            bit_count: data.len() as u64,
        });
    }

    let codes = table.lookup_array();
    let mut writer = BitWriter::with_capacity(data.len() / 2);
    for &symbol in data {
        let code = codes[symbol as usize].ok_or_else(|| {
            if_tracing! {
                warn!(target = "bitpack", symbol = symbol, "symbol missing from code table");
            }
            CodingError::SymbolNotInTable(symbol)
        })?;
        for &bit in code.bits() {
            writer.push_bit(bit);
        }
    }

    let payload = writer.finish();
    if_tracing! {
        info!(target = "bitpack", input_len = data.len(), bit_count = payload.bit_count, output_len = payload.bytes.len(), "pack complete");
    }
    Ok(payload)
}

/// A single-symbol table packs no bits, `bit_count` is the run length.
fn unpack_run(payload: &EncodedPayload, symbol: u8) -> Result<Vec<u8>, CodingError> {
    if !payload.bytes.is_empty() {
        return Err(CodingError::UndecodableSequence(format!(
            "{} packed bytes follow a single symbol run",
            payload.bytes.len()
        )));
    }

    let too_long = || CodingError::UndecodableSequence(format!("run of {} symbols does not fit in memory", payload.bit_count));
    let repeats = usize::try_from(payload.bit_count).map_err(|_| too_long())?;
    let mut out = Vec::new();
    out.try_reserve_exact(repeats).map_err(|_| {
        if_tracing! {
            warn!(target = "bitpack", repeats = repeats, "single symbol run too large to allocate");
        }
        too_long()
    })?;
    out.resize(repeats, symbol);

    if_tracing! {
        info!(target = "bitpack", symbol = symbol, output_len = out.len(), "unpack complete: single symbol run");
    }
    Ok(out)
}

/// Decodes `payload` by accumulating bits until they spell out a code of `table`.
///
/// # Errors
///
/// Returns [`CodingError::UndecodableSequence`] if the bits do not resolve into whole codes,
/// or if the payload claims more bits than it holds.
pub fn unpack(payload: &EncodedPayload, table: &CodeTable) -> Result<Vec<u8>, CodingError> {
    if_tracing! {
        debug!(target = "bitpack", bit_count = payload.bit_count, table_len = table.len(), "unpack start");
    }

    if let Some(symbol) = table.degenerate_symbol() {
        return unpack_run(payload, symbol);
    }

    if payload.bit_count > payload.capacity_bits() {
        return Err(CodingError::UndecodableSequence(format!(
            "bit count {} exceeds the {} bits present",
            payload.bit_count,
            payload.capacity_bits()
        )));
    }

    let lookup = table.reverse_map();
    let longest = table.longest_code();
    let mut out = Vec::new();
    let mut candidate: Vec<bool> = Vec::with_capacity(longest);

    for (index, bit) in bits_of(&payload.bytes, payload.bit_count).enumerate() {
        candidate.push(bit);
        if let Some(&symbol) = lookup.get(candidate.as_slice()) {
            out.push(symbol);
            candidate.clear();
        } else if candidate.len() >= longest {
            if_tracing! {
                warn!(target = "bitpack", bit_index = index, "no code matches the accumulated bits");
            }
            return Err(CodingError::UndecodableSequence(format!(
                "bits ending at index {} match no code of the table",
                index
            )));
        }
    }

    if !candidate.is_empty() {
        if_tracing! {
            warn!(target = "bitpack", leftover = candidate.len(), "stream ended inside a code");
        }
        return Err(CodingError::UndecodableSequence(format!(
            "stream ended with {} unmatched bits",
            candidate.len()
        )));
    }

    if_tracing! {
        info!(target = "bitpack", bit_count = payload.bit_count, output_len = out.len(), "unpack complete");
    }
    Ok(out)
}
