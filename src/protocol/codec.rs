//! Protocol codec
//!
//! Bidirectional, lossless conversion between transport bytes and raw
//! command strings, and between raw command strings and typed [`Command`]
//! values. Pure functions, no I/O state.
//!
//! ## Layers
//!
//! ```text
//! ┌──────────────────────────────────────────────┐
//! │ Wire frame: base64(raw command string) "\n"  │   read_frame / write_frame
//! ├──────────────────────────────────────────────┤
//! │ Raw command string: store:<k>:<v> | get:<k>  │   encode/decode_transport
//! │                     | done                   │
//! ├──────────────────────────────────────────────┤
//! │ Command { key, value } (unescaped bytes)     │   parse_command / encode_command
//! └──────────────────────────────────────────────┘
//! ```
//!
//! ## Field boundary detection
//!
//! Within a raw command string every unescaped `:` is a field delimiter
//! and every `\:` is a literal colon belonging to the payload. The scan
//! for the boundary is a two-state machine (`Normal` / `AfterEscape`)
//! rather than a regex, so the byte after an escape character is always
//! consumed as payload, including a second escape character: in `\\:` the
//! trailing `:` is a real delimiter. Only single-level escaping exists;
//! `\` itself is never escaped.

use std::io::{BufRead, Write};

use base64::prelude::BASE64_STANDARD;
use base64::Engine as _;

use crate::error::{CubbyError, Result};
use super::Command;

/// Reserved character separating protocol fields
pub const DELIMITER: u8 = b':';

/// Character marking a literal delimiter inside payload data
pub const ESCAPE: u8 = b'\\';

const STORE_PREFIX: &[u8] = b"store:";
const GET_PREFIX: &[u8] = b"get:";
const DONE_COMMAND: &[u8] = b"done";

// =============================================================================
// Transport Encoding
// =============================================================================

/// Apply the binary-to-text transport encoding to an entire line
///
/// Total function, no failure case.
pub fn encode_transport(raw: &[u8]) -> Vec<u8> {
    BASE64_STANDARD.encode(raw).into_bytes()
}

/// Reverse the transport encoding
///
/// Fails with `MalformedTransport` if the input is not valid encoded data.
pub fn decode_transport(encoded: &[u8]) -> Result<Vec<u8>> {
    BASE64_STANDARD
        .decode(encoded)
        .map_err(|e| CubbyError::MalformedTransport(e.to_string()))
}

// =============================================================================
// Escaping
// =============================================================================

/// Replace every literal delimiter byte with its two-byte escape sequence
///
/// Total and injective. The escape character itself is passed through
/// unchanged (single-level escaping).
pub fn escape(raw: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(raw.len());
    for &byte in raw {
        if byte == DELIMITER {
            out.push(ESCAPE);
        }
        out.push(byte);
    }
    out
}

/// Reverse [`escape`]: collapse every `\:` pair back to a literal `:`
///
/// Exact left inverse of `escape` for all inputs: a `\` not followed by
/// the delimiter is payload and passes through verbatim.
pub fn unescape(escaped: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(escaped.len());
    let mut i = 0;
    while i < escaped.len() {
        if escaped[i] == ESCAPE && escaped.get(i + 1) == Some(&DELIMITER) {
            out.push(DELIMITER);
            i += 2;
        } else {
            out.push(escaped[i]);
            i += 1;
        }
    }
    out
}

/// Scanner state for field boundary detection
enum ScanState {
    Normal,
    AfterEscape,
}

/// Find the first unescaped delimiter in an escaped field
///
/// A delimiter counts as escaped only when the scanner is in the
/// `AfterEscape` state, so `\\:` yields a boundary at the `:` (the second
/// `\` was consumed as the escaped byte).
fn find_unescaped_delimiter(field: &[u8]) -> Option<usize> {
    let mut state = ScanState::Normal;
    for (index, &byte) in field.iter().enumerate() {
        match state {
            ScanState::Normal => {
                if byte == DELIMITER {
                    return Some(index);
                }
                if byte == ESCAPE {
                    state = ScanState::AfterEscape;
                }
            }
            ScanState::AfterEscape => state = ScanState::Normal,
        }
    }
    None
}

// =============================================================================
// Command Parsing / Assembly
// =============================================================================

/// Parse a raw command string into a typed command
///
/// Classifies by prefix (`store:`, `get:`, `done`) and extracts fields.
/// Keys and values are unescaped symmetrically: a key stored with an
/// escaped delimiter is looked up under its literal form.
///
/// Every byte sequence gets a deterministic answer; anything that matches
/// no command shape is rejected with `UnknownCommand`, including a
/// `store:` payload with no unescaped key/value delimiter.
pub fn parse_command(raw: &[u8]) -> Result<Command> {
    if let Some(rest) = raw.strip_prefix(STORE_PREFIX) {
        let boundary = find_unescaped_delimiter(rest).ok_or_else(|| {
            CubbyError::UnknownCommand("store: missing key/value delimiter".to_string())
        })?;

        let key = unescape(&rest[..boundary]);
        let value = unescape(&rest[boundary + 1..]);
        Ok(Command::Store { key, value })
    } else if let Some(rest) = raw.strip_prefix(GET_PREFIX) {
        Ok(Command::Get { key: unescape(rest) })
    } else if raw == DONE_COMMAND {
        Ok(Command::Shutdown)
    } else {
        Err(CubbyError::UnknownCommand(preview(raw)))
    }
}

/// Assemble the raw command string for a command
///
/// Inverse of [`parse_command`]: keys and values are escaped before the
/// fields are joined with the delimiter.
pub fn encode_command(command: &Command) -> Vec<u8> {
    match command {
        Command::Store { key, value } => {
            let mut raw = Vec::with_capacity(STORE_PREFIX.len() + key.len() + value.len() + 1);
            raw.extend_from_slice(STORE_PREFIX);
            raw.extend_from_slice(&escape(key));
            raw.push(DELIMITER);
            raw.extend_from_slice(&escape(value));
            raw
        }
        Command::Get { key } => {
            let mut raw = Vec::with_capacity(GET_PREFIX.len() + key.len());
            raw.extend_from_slice(GET_PREFIX);
            raw.extend_from_slice(&escape(key));
            raw
        }
        Command::Shutdown => DONE_COMMAND.to_vec(),
    }
}

/// Lossy, bounded rendering of an unrecognized command for error messages
fn preview(raw: &[u8]) -> String {
    const MAX_PREVIEW: usize = 32;
    let shown = &raw[..raw.len().min(MAX_PREVIEW)];
    let mut text = String::from_utf8_lossy(shown).into_owned();
    if raw.len() > MAX_PREVIEW {
        text.push_str("...");
    }
    text
}

// =============================================================================
// Frame Encoding/Decoding
// =============================================================================

/// Encode a command as a transport frame (base64 line body, no terminator)
pub fn encode_frame(command: &Command) -> Vec<u8> {
    encode_transport(&encode_command(command))
}

/// Decode a transport frame into a typed command
pub fn decode_frame(frame: &[u8]) -> Result<Command> {
    let raw = decode_transport(frame)?;
    parse_command(&raw)
}

// =============================================================================
// Stream-based I/O helpers
// =============================================================================

/// Read one newline-terminated frame from a stream
///
/// Returns `Ok(None)` on clean EOF before any bytes arrive. The returned
/// frame is the line body with the terminator (and any `\r`) stripped,
/// still transport-encoded.
pub fn read_frame<R: BufRead>(reader: &mut R) -> Result<Option<Vec<u8>>> {
    let mut line = Vec::new();
    let bytes_read = reader.read_until(b'\n', &mut line)?;
    if bytes_read == 0 {
        return Ok(None);
    }

    while matches!(line.last(), Some(b'\n') | Some(b'\r')) {
        line.pop();
    }
    Ok(Some(line))
}

/// Write one newline-terminated frame to a stream
pub fn write_frame<W: Write>(writer: &mut W, frame: &[u8]) -> Result<()> {
    writer.write_all(frame)?;
    writer.write_all(b"\n")?;
    writer.flush()?;
    Ok(())
}

// =============================================================================
// Scanner unit tests (the scan itself is private)
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scan_plain_delimiter() {
        assert_eq!(find_unescaped_delimiter(b"abc:def"), Some(3));
    }

    #[test]
    fn test_scan_skips_escaped_delimiter() {
        assert_eq!(find_unescaped_delimiter(br"ab\:cd:ef"), Some(6));
    }

    #[test]
    fn test_scan_no_delimiter() {
        assert_eq!(find_unescaped_delimiter(br"ab\:cd"), None);
        assert_eq!(find_unescaped_delimiter(b""), None);
    }

    #[test]
    fn test_scan_escaped_escape_then_delimiter() {
        // The second backslash is consumed as the escaped byte, so the
        // colon after it is a real boundary.
        assert_eq!(find_unescaped_delimiter(br"a\\:b"), Some(3));
    }

    #[test]
    fn test_scan_trailing_escape() {
        assert_eq!(find_unescaped_delimiter(br"ab\"), None);
    }
}
