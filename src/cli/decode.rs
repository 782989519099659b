use anyhow::{Context, Result};
use voxell_timer::time_fn;

use crate::{
    algorithms::{bitpack::EncodedPayload, code_table::CodeTable, huffman, sidefile},
    cli::{CliError, DecodeArgs, TableSource, read_file, write_file},
};

fn load_table(source: &TableSource) -> Result<CodeTable> {
    match source {
        TableSource::Table(path, format) => {
            let data = read_file(path)?;
            sidefile::parse_table(&data, *format)
                .map_err(CliError::from)
                .with_context(|| format!("invalid code table {}", path.display()))
        }
        TableSource::FrequencyReport(path) => {
            let data = read_file(path)?;
            let mut entries = sidefile::parse_frequency_report(&data)
                .map_err(CliError::from)
                .with_context(|| format!("invalid frequency report {}", path.display()))?;
            entries.sort_by_key(|entry| entry.count);
            Ok(CodeTable::from_frequencies(&entries).map_err(CliError::from)?)
        }
    }
}

pub fn decode(args: DecodeArgs) -> Result<()> {
    let source = args.table_source();
    let table = load_table(&source)?;
    let payload = EncodedPayload::from_bytes(&read_file(&args.input)?)
        .map_err(CliError::from)
        .with_context(|| format!("invalid payload {}", args.input.display()))?;

    let (decoded, elapsed) = time_fn(|| huffman::decode(&payload, &table));
    let decoded = decoded
        .map_err(CliError::from)
        .with_context(|| format!("failed to decode {}", args.input.display()))?;

    write_file(&args.output, &decoded)?;

    if_tracing! {{
        tracing::info!(
            event = "decode_complete",
            input = %args.input.display(),
            output = %args.output.display(),
            table = ?source,
            elapsed_ms = ?elapsed,
            decompressed_len = decoded.len(),
            "decode finished"
        );
    }};
    if_not_tracing! {{
        eprintln!("decoded {} bits into {} bytes in {:.0?}", payload.bit_count, decoded.len(), elapsed);
    }};
    Ok(())
}
