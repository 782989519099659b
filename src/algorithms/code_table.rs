use core::{fmt, str::FromStr};
use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::{
    algorithms::{
        frequency::FrequencyEntry,
        tree::{HuffmanNode, HuffmanTree},
    },
    compressor::CodingError,
};

if_tracing! {
    use tracing::{debug, error};
}

/// The root-to-leaf path of one symbol. `false` is a step to the left child, `true` to the right.
#[derive(Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Code {
    bits: Vec<bool>,
}

impl Code {
    pub const fn new() -> Self {
        Self { bits: Vec::new() }
    }

    pub fn from_bits(bits: Vec<bool>) -> Self {
        Self { bits }
    }

    pub fn bits(&self) -> &[bool] {
        &self.bits
    }

    pub fn len(&self) -> usize {
        self.bits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bits.is_empty()
    }

    pub fn push(&mut self, bit: bool) {
        self.bits.push(bit);
    }

    pub fn is_prefix_of(&self, other: &Code) -> bool {
        other.bits.starts_with(&self.bits)
    }
}

impl fmt::Display for Code {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for &bit in &self.bits {
            f.write_str(if bit { "1" } else { "0" })?;
        }
        Ok(())
    }
}

impl fmt::Debug for Code {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Code({})", self)
    }
}

impl FromStr for Code {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.chars()
            .map(|c| match c {
                '0' => Ok(false),
                '1' => Ok(true),
                other => Err(format!("unexpected character {:?} in code", other)),
            })
            .collect::<Result<Vec<bool>, _>>()
            .map(Code::from_bits)
    }
}

impl TryFrom<String> for Code {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Code> for String {
    fn from(code: Code) -> Self {
        code.to_string()
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodeEntry {
    pub symbol: u8,
    pub code: Code,
}

/// An ordered list of `(symbol, code)` pairs, one per distinct symbol.
///
/// The order carries no meaning for decoding, only the symbol to code correspondence does.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodeTable {
    entries: Vec<CodeEntry>,
}

fn collect_leaf_codes(node: &HuffmanNode, path: &mut Code, out: &mut [Option<Code>; 256]) {
    match node {
        HuffmanNode::Leaf { symbol, .. } => out[*symbol as usize] = Some(path.clone()),
        HuffmanNode::Internal { left, right, .. } => {
            path.push(false);
            collect_leaf_codes(left, path, out);
            path.bits.pop();

            path.push(true);
            collect_leaf_codes(right, path, out);
            path.bits.pop();
        }
    }
}

impl CodeTable {
    pub fn from_entries(entries: Vec<CodeEntry>) -> Self {
        Self { entries }
    }

    /// Derives the code of every symbol in `symbols` from one depth-first walk of `tree`.
    ///
    /// The table lists the symbols in the order they are given.
    ///
    /// # Errors
    ///
    /// Returns [`CodingError::SymbolNotFound`] if a symbol has no leaf in `tree`.
    pub fn derive(tree: &HuffmanTree, symbols: impl IntoIterator<Item = u8>) -> Result<Self, CodingError> {
        let mut leaf_codes: [Option<Code>; 256] = [const { None }; 256];
        collect_leaf_codes(tree.root(), &mut Code::new(), &mut leaf_codes);

        let entries = symbols
            .into_iter()
            .map(|symbol| match leaf_codes[symbol as usize].take() {
                Some(code) => Ok(CodeEntry { symbol, code }),
                None => {
                    if_tracing! {
                        error!(target = "code_table", symbol = symbol, "symbol has no leaf in the tree");
                    }
                    Err(CodingError::SymbolNotFound(symbol))
                }
            })
            .collect::<Result<Vec<_>, _>>()?;

        if_tracing! {
            debug!(target = "code_table", entries = entries.len(), "code table derived");
        }

        let table = Self { entries };
        debug_assert!(table.is_prefix_free(), "tree paths must form a prefix-free code");
        Ok(table)
    }

    /// Builds the tree for an ascending frequency list and derives the table in the list's order.
    ///
    /// An empty list yields an empty table.
    pub fn from_frequencies(entries: &[FrequencyEntry]) -> Result<Self, CodingError> {
        if entries.is_empty() {
            return Ok(Self::default());
        }
        let tree = HuffmanTree::build(entries)?;
        Self::derive(&tree, entries.iter().map(|e| e.symbol))
    }

    pub fn entries(&self) -> &[CodeEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn lookup(&self, symbol: u8) -> Option<&Code> {
        self.entries.iter().find(|e| e.symbol == symbol).map(|e| &e.code)
    }

    /// A dense per-byte view of the table, for encoding long inputs.
    pub fn lookup_array(&self) -> [Option<&Code>; 256] {
        let mut out = [None; 256];
        for entry in &self.entries {
            out[entry.symbol as usize] = Some(&entry.code);
        }
        out
    }

    /// Maps each code back to its symbol.
    pub fn reverse_map(&self) -> HashMap<&[bool], u8> {
        self.entries.iter().map(|e| (e.code.bits(), e.symbol)).collect()
    }

    pub fn longest_code(&self) -> usize {
        self.entries.iter().map(|e| e.code.len()).max().unwrap_or(0)
    }

    /// Whether no code is a prefix of another one.
    pub fn is_prefix_free(&self) -> bool {
        self.entries.iter().enumerate().all(|(i, a)| {
            self.entries
                .iter()
                .enumerate()
                .all(|(j, b)| i == j || !a.code.is_prefix_of(&b.code))
        })
    }

    /// The single symbol of a table whose only code is empty, if that is what this table is.
    pub fn degenerate_symbol(&self) -> Option<u8> {
        match self.entries.as_slice() {
            [only] if only.code.is_empty() => Some(only.symbol),
            _ => None,
        }
    }

    /// Removes the entry for `symbol`, returning its code.
    #[cfg(test)]
    pub fn remove(&mut self, symbol: u8) -> Option<Code> {
        let index = self.entries.iter().position(|e| e.symbol == symbol)?;
        Some(self.entries.remove(index).code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algorithms::frequency::count_frequencies;

    fn table_for(data: &[u8]) -> CodeTable {
        CodeTable::from_frequencies(&count_frequencies(data)).unwrap()
    }

    fn code_of(table: &CodeTable, symbol: u8) -> String {
        table.lookup(symbol).unwrap().to_string()
    }

    #[test]
    fn abracadabra_codes() {
        let table = table_for(b"abracadabra");
        assert_eq!(code_of(&table, b'a'), "0");
        assert_eq!(code_of(&table, b'c'), "100");
        assert_eq!(code_of(&table, b'd'), "101");
        assert_eq!(code_of(&table, b'b'), "110");
        assert_eq!(code_of(&table, b'r'), "111");

        let len = |s: u8| table.lookup(s).unwrap().len();
        assert!(len(b'a') <= len(b'b'));
        assert!(len(b'a') <= len(b'r'));
        assert!(len(b'b') <= len(b'c'));
        assert!(len(b'r') <= len(b'd'));
        assert!(table.is_prefix_free());
    }

    #[test]
    fn table_follows_frequency_list_order() {
        let table = table_for(b"abracadabra");
        let symbols: Vec<u8> = table.entries().iter().map(|e| e.symbol).collect();
        assert_eq!(symbols, b"cdbra".to_vec());
    }

    #[test]
    fn tie_break_three_symbols() {
        let freqs = [FrequencyEntry::new(b'A', 1), FrequencyEntry::new(b'B', 1), FrequencyEntry::new(b'C', 2)];
        let table = CodeTable::from_frequencies(&freqs).unwrap();
        assert_eq!(table.lookup(b'A').unwrap().len(), 2);
        assert_eq!(table.lookup(b'B').unwrap().len(), 2);
        assert_eq!(table.lookup(b'C').unwrap().len(), 1);
        assert_eq!(code_of(&table, b'C'), "0");
        assert_eq!(code_of(&table, b'A'), "10");
        assert_eq!(code_of(&table, b'B'), "11");
    }

    #[test]
    fn tie_break_four_symbols() {
        let freqs: Vec<FrequencyEntry> = b"ABCD".iter().map(|&s| FrequencyEntry::new(s, 1)).collect();
        let table = CodeTable::from_frequencies(&freqs).unwrap();
        assert!(table.entries().iter().all(|e| e.code.len() == 2));
        assert_eq!(code_of(&table, b'A'), "00");
        assert_eq!(code_of(&table, b'B'), "01");
        assert_eq!(code_of(&table, b'C'), "10");
        assert_eq!(code_of(&table, b'D'), "11");
    }

    #[test]
    fn same_count_multiset_gives_same_lengths() {
        // the same counts assigned to different symbols in a different first-seen order
        let first = table_for(b"aabcc c");
        let second = table_for(b"x yyzzz");
        let mut a: Vec<usize> = first.entries().iter().map(|e| e.code.len()).collect();
        let mut b: Vec<usize> = second.entries().iter().map(|e| e.code.len()).collect();
        a.sort();
        b.sort();
        assert_eq!(a, b);
    }

    #[test]
    fn single_symbol_gets_the_empty_code() {
        let table = table_for(b"zzzzzz");
        assert_eq!(table.len(), 1);
        assert!(table.lookup(b'z').unwrap().is_empty());
        assert_eq!(table.degenerate_symbol(), Some(b'z'));
    }

    #[test]
    fn empty_input_gives_an_empty_table() {
        let table = table_for(b"");
        assert!(table.is_empty());
        assert_eq!(table.degenerate_symbol(), None);
        assert_eq!(table.longest_code(), 0);
    }

    #[test]
    fn all_byte_values_are_prefix_free() {
        let data: Vec<u8> = (0..=255u8).flat_map(|b| core::iter::repeat_n(b, b as usize % 7 + 1)).collect();
        let table = table_for(&data);
        assert_eq!(table.len(), 256);
        assert!(table.is_prefix_free());
        assert_eq!(table.reverse_map().len(), 256);
    }

    #[test]
    fn missing_leaf_is_reported() {
        let tree = HuffmanTree::build(&count_frequencies(b"ab")).unwrap();
        assert_eq!(CodeTable::derive(&tree, [b'a', b'q']), Err(CodingError::SymbolNotFound(b'q')));
    }

    #[test]
    fn code_parses_and_renders() {
        let code: Code = "0110".parse().unwrap();
        assert_eq!(code.bits(), &[false, true, true, false]);
        assert_eq!(code.to_string(), "0110");
        assert!("01x".parse::<Code>().is_err());
        assert!("".parse::<Code>().unwrap().is_empty());
    }

    #[test]
    fn json_shape() {
        let table = table_for(b"aab");
        let json = serde_json::to_string(&table).unwrap();
        assert_eq!(json, r#"{"entries":[{"symbol":98,"code":"0"},{"symbol":97,"code":"1"}]}"#);
        let back: CodeTable = serde_json::from_str(&json).unwrap();
        assert_eq!(back, table);
    }
}
