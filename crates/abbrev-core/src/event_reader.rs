//! Line parsing for JSONL execution event feeds.

use abbrev_proto::ExecutionEvent;

/// Information about a malformed JSONL line.
#[derive(Debug, Clone)]
pub struct MalformedLine {
    /// Line number in the feed (1-indexed).
    pub line_number: u64,
    /// The raw content that failed to parse (truncated if very long).
    pub content: String,
    /// The parse error message.
    pub error: String,
}

impl MalformedLine {
    /// Maximum content length before truncation.
    const MAX_CONTENT_LEN: usize = 100;

    /// Creates a new MalformedLine, truncating content if needed.
    pub fn new(line_number: u64, content: &str, error: String) -> Self {
        let content = match content.char_indices().nth(Self::MAX_CONTENT_LEN) {
            Some((idx, _)) => format!("{}...", &content[..idx]),
            None => content.to_string(),
        };
        Self {
            line_number,
            content,
            error,
        }
    }
}

/// Parses one feed line.
///
/// Blank lines yield `Ok(None)`.
pub fn parse_line(line_number: u64, line: &str) -> Result<Option<ExecutionEvent>, MalformedLine> {
    if line.trim().is_empty() {
        return Ok(None);
    }
    ExecutionEvent::from_json_line(line)
        .map(Some)
        .map_err(|e| MalformedLine::new(line_number, line, e.to_string()))
}

/// Parses one raw feed line, including its line terminator if present.
///
/// Bytes that are not valid UTF-8 make the line malformed; the reported
/// content replaces the offending bytes.
pub fn parse_raw_line(
    line_number: u64,
    raw: &[u8],
) -> Result<Option<ExecutionEvent>, MalformedLine> {
    let raw = raw.strip_suffix(b"\n").unwrap_or(raw);
    let raw = raw.strip_suffix(b"\r").unwrap_or(raw);

    match std::str::from_utf8(raw) {
        Ok(line) => parse_line(line_number, line),
        Err(e) => Err(MalformedLine::new(
            line_number,
            &String::from_utf8_lossy(raw),
            e.to_string(),
        )),
    }
}
