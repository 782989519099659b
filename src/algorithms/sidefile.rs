//! Textual side files written next to an encoded payload.
//!
//! Both the frequency report and the code table hold one entry per line, the raw symbol byte,
//! a space, then the count or the code. Line-feed is the only symbol that is escaped, it is
//! written as the two characters `\n`. The files are bytes, not UTF-8, so any other symbol
//! (including a carriage return or a backslash) is written as-is.

use core::str;

use clap::ValueEnum;

use crate::{
    algorithms::{
        code_table::{Code, CodeEntry, CodeTable},
        frequency::FrequencyEntry,
    },
    compressor::CodingError,
};

const LINE_FEED_TOKEN: &[u8] = b"\\n";

/// On-disk representation of a code table.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum TableFormat {
    /// One `<symbol> <code>` pair per line.
    #[default]
    Text,
    /// `{"entries":[{"symbol":97,"code":"0"}]}`
    Json,
}

fn push_symbol(out: &mut Vec<u8>, symbol: u8) {
    if symbol == b'\n' {
        out.extend_from_slice(LINE_FEED_TOKEN);
    } else {
        out.push(symbol);
    }
}

/// Splits a line into its symbol and the text after the separating space.
fn split_symbol(line: &[u8], line_no: usize) -> Result<(u8, &str), CodingError> {
    let malformed = |reason: &str| CodingError::MalformedTable {
        line: line_no,
        reason: reason.to_string(),
    };

    let (symbol, rest) = match line {
        [b'\\', b'n', b' ', rest @ ..] => (b'\n', rest),
        [symbol, b' ', rest @ ..] => (*symbol, rest),
        [] => return Err(malformed("empty line")),
        _ => return Err(malformed("expected a symbol followed by a space")),
    };

    let rest = str::from_utf8(rest).map_err(|_| malformed("value is not valid utf-8"))?;
    Ok((symbol, rest))
}

/// Lines of a side file with their 1-based line numbers. An empty file has no lines.
fn lines(data: &[u8]) -> impl Iterator<Item = (usize, &[u8])> {
    let data = data.strip_suffix(b"\n").unwrap_or(data);
    let empty = data.is_empty();
    data.split(|&b| b == b'\n')
        .enumerate()
        .filter(move |_| !empty)
        .map(|(i, line)| (i + 1, line))
}

pub fn render_frequency_report(entries: &[FrequencyEntry]) -> Vec<u8> {
    let mut out = Vec::new();
    for entry in entries {
        push_symbol(&mut out, entry.symbol);
        out.push(b' ');
        out.extend_from_slice(entry.count.to_string().as_bytes());
        out.push(b'\n');
    }
    out
}

pub fn parse_frequency_report(data: &[u8]) -> Result<Vec<FrequencyEntry>, CodingError> {
    lines(data)
        .map(|(line_no, line)| {
            let (symbol, count) = split_symbol(line, line_no)?;
            let count = count.parse::<u64>().map_err(|e| CodingError::MalformedTable {
                line: line_no,
                reason: format!("invalid count {:?}: {}", count, e),
            })?;
            Ok(FrequencyEntry::new(symbol, count))
        })
        .collect()
}

pub fn render_code_table(table: &CodeTable) -> Vec<u8> {
    let mut out = Vec::new();
    for entry in table.entries() {
        push_symbol(&mut out, entry.symbol);
        out.push(b' ');
        out.extend_from_slice(entry.code.to_string().as_bytes());
        out.push(b'\n');
    }
    out
}

/// Parses a textual code table.
///
/// Duplicate symbols are rejected, the codes themselves are taken as they are.
pub fn parse_code_table(data: &[u8]) -> Result<CodeTable, CodingError> {
    let mut seen = [false; 256];
    let entries = lines(data)
        .map(|(line_no, line)| {
            let (symbol, code) = split_symbol(line, line_no)?;
            if seen[symbol as usize] {
                return Err(CodingError::MalformedTable {
                    line: line_no,
                    reason: format!("symbol 0x{:02x} listed twice", symbol),
                });
            }
            seen[symbol as usize] = true;
            let code = code
                .parse::<Code>()
                .map_err(|reason| CodingError::MalformedTable { line: line_no, reason })?;
            Ok(CodeEntry { symbol, code })
        })
        .collect::<Result<Vec<_>, _>>()?;
    Ok(CodeTable::from_entries(entries))
}

pub fn render_table(table: &CodeTable, format: TableFormat) -> Result<Vec<u8>, serde_json::Error> {
    match format {
        TableFormat::Text => Ok(render_code_table(table)),
        TableFormat::Json => serde_json::to_vec_pretty(table),
    }
}

/// Parses a JSON code table. A repeated symbol is reported at its 1-based position in `entries`.
fn parse_json_table(data: &[u8]) -> Result<CodeTable, CodingError> {
    let table: CodeTable = serde_json::from_slice(data).map_err(|e| CodingError::MalformedTable {
        line: e.line(),
        reason: e.to_string(),
    })?;

    let mut seen = [false; 256];
    for (index, entry) in table.entries().iter().enumerate() {
        if seen[entry.symbol as usize] {
            return Err(CodingError::MalformedTable {
                line: index + 1,
                reason: format!("symbol 0x{:02x} listed twice", entry.symbol),
            });
        }
        seen[entry.symbol as usize] = true;
    }
    Ok(table)
}

pub fn parse_table(data: &[u8], format: TableFormat) -> Result<CodeTable, CodingError> {
    match format {
        TableFormat::Text => parse_code_table(data),
        TableFormat::Json => parse_json_table(data),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algorithms::frequency::count_frequencies;

    #[test]
    fn frequency_report_escapes_line_feed() {
        let entries = count_frequencies(b"a\nb\n\n");
        let report = render_frequency_report(&entries);
        assert_eq!(report, b"a 1\nb 1\n\\n 3\n".to_vec());
        assert_eq!(parse_frequency_report(&report).unwrap(), entries);
    }

    #[test]
    fn code_table_text_roundtrip_with_awkward_symbols() {
        let data = b"\\\\\n\r \r\n\x00\xff\xff n";
        let table = CodeTable::from_frequencies(&count_frequencies(data)).unwrap();
        let text = render_code_table(&table);
        assert_eq!(parse_code_table(&text).unwrap(), table);
    }

    #[test]
    fn backslash_symbol_is_not_a_line_feed() {
        let table = parse_code_table(b"\\ 0\n\\n 1\n").unwrap();
        assert_eq!(table.lookup(b'\\').map(ToString::to_string), Some("0".to_string()));
        assert_eq!(table.lookup(b'\n').map(ToString::to_string), Some("1".to_string()));
    }

    #[test]
    fn single_symbol_table_has_an_empty_code_column() {
        let table = CodeTable::from_frequencies(&count_frequencies(b"qqq")).unwrap();
        let text = render_code_table(&table);
        assert_eq!(text, b"q \n".to_vec());
        assert_eq!(parse_code_table(&text).unwrap().degenerate_symbol(), Some(b'q'));
    }

    #[test]
    fn empty_files_parse_to_nothing() {
        assert!(parse_code_table(b"").unwrap().is_empty());
        assert!(parse_frequency_report(b"").unwrap().is_empty());
    }

    #[test]
    fn malformed_lines_report_their_position() {
        assert_eq!(
            parse_code_table(b"a 0\nb 12\n"),
            Err(CodingError::MalformedTable {
                line: 2,
                reason: "unexpected character '2' in code".to_string(),
            })
        );
        assert!(matches!(parse_code_table(b"a 0\nab1\n"), Err(CodingError::MalformedTable { line: 2, .. })));
        assert!(matches!(parse_code_table(b"a 0\na 1\n"), Err(CodingError::MalformedTable { line: 2, .. })));
        assert!(matches!(parse_frequency_report(b"a x\n"), Err(CodingError::MalformedTable { line: 1, .. })));
    }

    #[test]
    fn json_table_roundtrip() {
        let table = CodeTable::from_frequencies(&count_frequencies(b"hello\nworld")).unwrap();
        let json = render_table(&table, TableFormat::Json).unwrap();
        assert_eq!(parse_table(&json, TableFormat::Json).unwrap(), table);
        assert!(matches!(parse_table(b"{", TableFormat::Json), Err(CodingError::MalformedTable { .. })));
    }

    #[test]
    fn json_table_rejects_repeated_symbols() {
        let json = br#"{"entries":[{"symbol":97,"code":"0"},{"symbol":98,"code":"10"},{"symbol":97,"code":"11"}]}"#;
        assert_eq!(
            parse_table(json, TableFormat::Json),
            Err(CodingError::MalformedTable {
                line: 3,
                reason: "symbol 0x61 listed twice".to_string(),
            })
        );
    }
}
