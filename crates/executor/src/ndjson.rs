//! Newline-delimited JSON buffering for the local runtime's streaming
//! responses.
//!
//! The runtime streams one JSON object per line. Chunks arrive at arbitrary
//! boundaries, so we buffer incoming text and drain complete lines; any
//! trailing partial line stays in the buffer for the next chunk.

/// Extract complete lines from the buffer, in place. Blank lines are
/// skipped; the trailing partial line (no `\n` yet) is left behind.
pub(crate) fn drain_lines(buffer: &mut String) -> Vec<String> {
    let mut lines = Vec::new();

    while let Some(pos) = buffer.find('\n') {
        let line: String = buffer.drain(..pos).collect();
        buffer.drain(..1); // remove the newline
        let line = line.trim();
        if !line.is_empty() {
            lines.push(line.to_string());
        }
    }

    lines
}
