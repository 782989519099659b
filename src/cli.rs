//! cli component of huffpack.
//!
//! `$exename` stands for the executable name. `<description>` denotes a required argument, while
//! `[description]` denotes an optional argument.
//!
//! # Encoding
//!
//! > `$exename enc <input> <output> [--table <path>] [--frequencies <path>] [--table-format text|json] [--verbose]`
//!
//! the input is read whole, its byte frequencies are counted, and a huffman tree is built from them.
//! three files are written:
//!     1. `<output>`, the packed code bits followed by an 8 byte little-endian bit count
//!     2. the code table, `<output>.table` unless `--table` is given
//!     3. the frequency report, `<output>.freq` unless `--frequencies` is given
//!
//! the code table is a readable `<symbol> <code>` list by default, or json with `--table-format json`.
//! `--verbose` also prints the tree shape and the count and code of every symbol.
//!
//! # Decoding
//!
//! > `$exename dec <input> <output> [--table <path>] [--frequencies <path>] [--table-format text|json]`
//!
//! the decoder needs the code table the payload was encoded with, read from `<input>.table` unless
//! `--table` is given. the frequency report can stand in for the table with `--frequencies`, since
//! the same report always rebuilds the same tree.
//!
//! # Testing
//!
//! > `$exename test <input> [--dump-dir <dir>]`
//!
//! compresses the file into a single self-contained buffer, immediately decompresses it and compares
//! the result with the original. if a discrepancy is found, the expected and actual data are written
//! to the dump directory.
use std::{
    ffi::OsString,
    fs, io,
    path::{Path, PathBuf},
};

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use thiserror::Error;

use crate::{algorithms::sidefile::TableFormat, compressor::CodingError};

pub mod decode;
pub mod encode;

/// Error types for CLI operations
#[derive(Debug, Error)]
pub enum CliError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Coding(#[from] CodingError),

    #[error("roundtrip mismatch for {}", .0.display())]
    RoundTripMismatch(PathBuf),
}

/// CLI arguments for the huffpack application
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// Supported commands for huffpack
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Encode (compress) a file
    #[command(alias = "enc")]
    Encode(EncodeArgs),

    /// Decode (decompress) a file
    #[command(alias = "dec")]
    Decode(DecodeArgs),

    /// Test compression/decompression roundtrip
    Test(TestArgs),
}

/// Arguments specific to the encode command
#[derive(Args, Debug)]
pub struct EncodeArgs {
    /// Path to the input file
    pub input: PathBuf,

    /// Path for the encoded payload
    pub output: PathBuf,

    /// Where to write the code table (defaults to `<output>.table`)
    #[arg(long)]
    pub table: Option<PathBuf>,

    /// Where to write the frequency report (defaults to `<output>.freq`)
    #[arg(long)]
    pub frequencies: Option<PathBuf>,

    /// Format of the code table file
    #[arg(long, value_enum, default_value_t = TableFormat::Text)]
    pub table_format: TableFormat,

    /// Print the tree shape and every symbol's count and code
    #[arg(short, long)]
    pub verbose: bool,
}

impl EncodeArgs {
    pub fn table_path(&self) -> PathBuf {
        self.table.clone().unwrap_or_else(|| with_suffix(&self.output, ".table"))
    }

    pub fn frequencies_path(&self) -> PathBuf {
        self.frequencies.clone().unwrap_or_else(|| with_suffix(&self.output, ".freq"))
    }
}

/// Arguments specific to the decode command
#[derive(Args, Debug)]
pub struct DecodeArgs {
    /// Path to the encoded payload
    pub input: PathBuf,

    /// Path for the decoded output
    pub output: PathBuf,

    /// Code table to decode with (defaults to `<input>.table`)
    #[arg(long)]
    pub table: Option<PathBuf>,

    /// Rebuild the code table from a frequency report instead of reading one
    #[arg(long, conflicts_with = "table")]
    pub frequencies: Option<PathBuf>,

    /// Format of the code table file
    #[arg(long, value_enum, default_value_t = TableFormat::Text)]
    pub table_format: TableFormat,
}

/// Where the decoder gets its code table from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TableSource {
    Table(PathBuf, TableFormat),
    FrequencyReport(PathBuf),
}

impl DecodeArgs {
    pub fn table_source(&self) -> TableSource {
        match (&self.table, &self.frequencies) {
            (_, Some(report)) => TableSource::FrequencyReport(report.clone()),
            (Some(table), None) => TableSource::Table(table.clone(), self.table_format),
            (None, None) => TableSource::Table(with_suffix(&self.input, ".table"), self.table_format),
        }
    }
}

/// Arguments specific to the test command
#[derive(Args, Debug)]
pub struct TestArgs {
    /// Path to the original file
    pub input: PathBuf,

    /// Directory for `.expected.bin` and `.got.bin` dumps on mismatch (defaults to the current directory)
    #[arg(long)]
    pub dump_dir: Option<PathBuf>,
}

/// Appends `suffix` to the full file name, `out.bin` becomes `out.bin.table`.
fn with_suffix(path: &Path, suffix: &str) -> PathBuf {
    let mut name: OsString = path.as_os_str().to_owned();
    name.push(suffix);
    PathBuf::from(name)
}

pub(crate) fn read_file(path: &Path) -> anyhow::Result<Vec<u8>> {
    fs::read(path)
        .map_err(CliError::from)
        .with_context(|| format!("failed to read {}", path.display()))
}

pub(crate) fn write_file(path: &Path, data: &[u8]) -> anyhow::Result<()> {
    fs::write(path, data)
        .map_err(CliError::from)
        .with_context(|| format!("failed to write {}", path.display()))
}
