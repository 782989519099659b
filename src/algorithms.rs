//! The huffman coding stages, leaves first: counting, tree construction, code derivation,
//! bit packing, and the side-file formats that carry tables and payloads between runs.

pub mod bitpack;
pub mod code_table;
pub mod frequency;
pub mod huffman;
pub mod sidefile;
pub mod tree;
