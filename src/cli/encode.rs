use anyhow::{Context, Result};
use voxell_timer::time_fn;

use crate::{
    algorithms::{huffman, sidefile},
    cli::{CliError, EncodeArgs, read_file, write_file},
};

pub fn encode(args: EncodeArgs) -> Result<()> {
    let input_data = read_file(&args.input)?;

    let (encoded, elapsed) = time_fn(|| huffman::encode(&input_data));
    let encoded = encoded
        .map_err(CliError::from)
        .with_context(|| format!("failed to encode {}", args.input.display()))?;

    let table_path = args.table_path();
    let frequencies_path = args.frequencies_path();
    let table = sidefile::render_table(&encoded.table, args.table_format).map_err(CliError::from)?;

    write_file(&args.output, &encoded.payload.to_bytes())?;
    write_file(&table_path, &table)?;
    write_file(&frequencies_path, &sidefile::render_frequency_report(&encoded.frequencies))?;

    if args.verbose {
        eprint!("{}", verbose_report(&encoded));
    }

    if_tracing! {{
        tracing::info!(
            event = "encode_complete",
            input = %args.input.display(),
            output = %args.output.display(),
            table = %table_path.display(),
            frequencies = %frequencies_path.display(),
            elapsed_ms = ?elapsed,
            bit_count = encoded.payload.bit_count,
            compressed_len = encoded.payload.bytes.len(),
            "encode finished"
        );
    }};
    if_not_tracing! {{
        eprintln!(
            "encoded {} bytes into {} bits ({} distinct symbols) in {:.0?}",
            input_data.len(),
            encoded.payload.bit_count,
            encoded.table.len(),
            elapsed
        );
    }};
    Ok(())
}

/// Tree shape followed by one `<symbol> <count> <code>` row per symbol, rarest first.
fn verbose_report(encoded: &huffman::Encoded) -> String {
    let mut report = String::new();
    match &encoded.tree {
        Some(tree) => report.push_str(&format!(
            "tree: weight {}, {} leaves, {} internal nodes, depth {}\n",
            tree.weight(),
            tree.leaf_count(),
            tree.internal_count(),
            tree.depth()
        )),
        None => report.push_str("tree: empty input\n"),
    }

    for entry in &encoded.frequencies {
        let code = encoded
            .table
            .lookup(entry.symbol)
            .map(ToString::to_string)
            .unwrap_or_default();
        report.push_str(&format!("  0x{:02x} {:>10} {}\n", entry.symbol, entry.count, code));
    }
    report
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verbose_report_lists_tree_shape_and_codes() {
        let encoded = huffman::encode(b"aab").unwrap();
        assert_eq!(
            verbose_report(&encoded),
            "tree: weight 3, 2 leaves, 1 internal nodes, depth 1\n  0x62          1 0\n  0x61          2 1\n"
        );
    }

    #[test]
    fn verbose_report_for_empty_input() {
        let encoded = huffman::encode(b"").unwrap();
        assert_eq!(verbose_report(&encoded), "tree: empty input\n");
    }
}
