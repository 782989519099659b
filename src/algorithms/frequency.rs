if_tracing! {
    use tracing::debug;
}

/// A distinct symbol of the input and how many times it occurs.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct FrequencyEntry {
    pub symbol: u8,
    pub count: u64,
}

impl FrequencyEntry {
    pub const fn new(symbol: u8, count: u64) -> Self {
        Self { symbol, count }
    }
}

/// Counts every distinct byte of `data`.
///
/// The result holds one entry per distinct symbol, sorted ascending by count.
/// Symbols with equal counts keep the order in which they were first seen.
pub fn count_frequencies(data: &[u8]) -> Vec<FrequencyEntry> {
    if_tracing! {
        debug!(target = "frequency", input_len = data.len(), "frequency count start");
    }

    // maps byte value to its index in `entries`
    let mut slot: [Option<usize>; 256] = [None; 256];
    let mut entries: Vec<FrequencyEntry> = Vec::new();

    for &byte in data {
        match slot[byte as usize] {
            Some(index) => entries[index].count += 1,
            None => {
                slot[byte as usize] = Some(entries.len());
                entries.push(FrequencyEntry::new(byte, 1));
            }
        }
    }

    // stable, so first-seen order survives among equal counts
    entries.sort_by_key(|entry| entry.count);

    if_tracing! {
        debug!(target = "frequency", distinct = entries.len(), "frequency count complete");
    }

    entries
}
