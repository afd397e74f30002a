//! Minimal CSV handling for the provider export.
//!
//! The reader is deliberately loose: a `"` only toggles quoting and is
//! dropped, so doubled quotes inside a quoted field are not unescaped.
//! Unbalanced quotes never error, they just flip the state for the rest of
//! the line.

/// Column order of the provider export.
pub const HEADER: [&str; 10] = [
    "Model name",
    "Model URL",
    "OpenRouter model ID",
    "Provider",
    "Context length",
    "Price/input token",
    "Price/output token",
    "Latency",
    "Throughput",
    "Creation date",
];

/// Split one line (without its newline) into trimmed fields.
pub fn parse_row(line: &str) -> Vec<String> {
    let mut fields = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;

    for c in line.chars() {
        match c {
            '"' => in_quotes = !in_quotes,
            ',' if !in_quotes => {
                fields.push(current.trim().to_string());
                current.clear();
            }
            _ => current.push(c),
        }
    }

    fields.push(current.trim().to_string());
    fields
}

/// Data lines of a CSV document: header dropped, blank lines skipped.
pub fn data_lines(text: &str) -> impl Iterator<Item = &str> {
    text.split('\n').skip(1).filter(|l| !l.trim().is_empty())
}

/// Render fields as one CSV record (no line terminator).
///
/// Quotes only the fields that need it and doubles embedded quotes.
pub fn write_row<S: AsRef<str>>(fields: &[S]) -> String {
    fields
        .iter()
        .map(|f| {
            let f = f.as_ref();
            if f.contains([',', '"', '\r', '\n']) {
                format!("\"{}\"", f.replace('"', "\"\""))
            } else {
                f.to_string()
            }
        })
        .collect::<Vec<_>>()
        .join(",")
}
