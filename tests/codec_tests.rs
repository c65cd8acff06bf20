//! Codec Tests
//!
//! Conformance tests for escaping, transport encoding, and command
//! parsing.

use std::io::Cursor;

use cubbykv::protocol::{
    decode_frame, decode_transport, encode_command, encode_frame, encode_transport, escape,
    parse_command, read_frame, unescape, write_frame, Command, Response,
};
use cubbykv::CubbyError;

// =============================================================================
// Escaping Tests
// =============================================================================

#[test]
fn test_escape_delimiter() {
    assert_eq!(escape(b"a:b"), br"a\:b".to_vec());
    assert_eq!(escape(b"::"), br"\:\:".to_vec());
}

#[test]
fn test_escape_leaves_escape_char_alone() {
    // Single-level escaping: the backslash itself is never escaped
    assert_eq!(escape(br"a\b"), br"a\b".to_vec());
}

#[test]
fn test_unescape_passes_unpaired_escapes_through() {
    assert_eq!(unescape(br"a\b"), br"a\b".to_vec());
    assert_eq!(unescape(br"trailing\"), br"trailing\".to_vec());
}

#[test]
fn test_escape_round_trip() {
    let cases: &[&[u8]] = &[
        b"",
        b"plain",
        b"a:b",
        b":leading",
        b"trailing:",
        b"::double::",
        br"back\slash",
        br"\:",
        br"\\:",
        b"line\nbreak",
        b"mix:of\\every:thing\n",
    ];

    for &case in cases {
        assert_eq!(
            unescape(&escape(case)),
            case.to_vec(),
            "round trip failed for {:?}",
            String::from_utf8_lossy(case)
        );
    }
}

// =============================================================================
// Transport Encoding Tests
// =============================================================================

#[test]
fn test_transport_round_trip() {
    let all_bytes: Vec<u8> = (0..=255).collect();
    let cases: Vec<Vec<u8>> = vec![
        Vec::new(),
        b"hello".to_vec(),
        b"with\nnewline".to_vec(),
        all_bytes,
    ];

    for case in cases {
        let encoded = encode_transport(&case);
        assert_eq!(decode_transport(&encoded).unwrap(), case);
    }
}

#[test]
fn test_transport_output_is_line_safe() {
    // The whole point of the transport encoding: the frame never
    // contains a newline, whatever the payload holds.
    let frame = encode_frame(&Command::Store {
        key: b"multi\nline".to_vec(),
        value: b"pay\nload".to_vec(),
    });
    assert!(!frame.contains(&b'\n'));
}

#[test]
fn test_decode_transport_rejects_invalid_input() {
    let result = decode_transport(b"!!! not base64 !!!");
    assert!(matches!(result, Err(CubbyError::MalformedTransport(_))));
}

// =============================================================================
// Command Parsing Tests
// =============================================================================

#[test]
fn test_parse_store() {
    let cmd = parse_command(b"store:mykey:myvalue").unwrap();
    assert_eq!(
        cmd,
        Command::Store {
            key: b"mykey".to_vec(),
            value: b"myvalue".to_vec(),
        }
    );
}

#[test]
fn test_parse_get() {
    let cmd = parse_command(b"get:mykey").unwrap();
    assert_eq!(cmd, Command::Get { key: b"mykey".to_vec() });
}

#[test]
fn test_parse_done() {
    assert_eq!(parse_command(b"done").unwrap(), Command::Shutdown);
}

#[test]
fn test_field_boundary_with_escaped_delimiters() {
    // Key and value both contain the delimiter; the first unescaped
    // colon after the prefix is the one and only boundary.
    let raw = encode_command(&Command::Store {
        key: b"abc:def".to_vec(),
        value: b"qrs:tuv".to_vec(),
    });
    assert_eq!(raw, br"store:abc\:def:qrs\:tuv".to_vec());

    match parse_command(&raw).unwrap() {
        Command::Store { key, value } => {
            assert_eq!(key, b"abc:def");
            assert_eq!(value, b"qrs:tuv");
        }
        other => panic!("Expected store command, got {:?}", other),
    }
}

#[test]
fn test_store_value_keeps_extra_delimiters() {
    // Everything after the boundary belongs to the value
    match parse_command(b"store:k:a:b:c").unwrap() {
        Command::Store { key, value } => {
            assert_eq!(key, b"k");
            assert_eq!(value, b"a:b:c");
        }
        other => panic!("Expected store command, got {:?}", other),
    }
}

#[test]
fn test_store_key_unescaped_symmetrically() {
    // The key is unescaped exactly like the value, so an escaped
    // delimiter in the key comes back literal.
    match parse_command(br"store:a\:b:v").unwrap() {
        Command::Store { key, value } => {
            assert_eq!(key, b"a:b");
            assert_eq!(value, b"v");
        }
        other => panic!("Expected store command, got {:?}", other),
    }
}

#[test]
fn test_get_key_is_unescaped() {
    match parse_command(br"get:a\:b").unwrap() {
        Command::Get { key } => assert_eq!(key, b"a:b"),
        other => panic!("Expected get command, got {:?}", other),
    }
}

#[test]
fn test_store_escaped_escape_before_delimiter() {
    // In `\\:` the second backslash is consumed as the escaped byte, so
    // the colon is a real boundary and both backslashes stay in the key.
    match parse_command(br"store:a\\:b").unwrap() {
        Command::Store { key, value } => {
            assert_eq!(key, br"a\\".to_vec());
            assert_eq!(value, b"b");
        }
        other => panic!("Expected store command, got {:?}", other),
    }
}

#[test]
fn test_store_empty_key_and_value() {
    match parse_command(b"store::").unwrap() {
        Command::Store { key, value } => {
            assert!(key.is_empty());
            assert!(value.is_empty());
        }
        other => panic!("Expected store command, got {:?}", other),
    }
}

#[test]
fn test_store_without_delimiter_is_rejected() {
    // No unescaped boundary between key and value: deterministic reject
    let result = parse_command(br"store:only\:one\:field");
    assert!(matches!(result, Err(CubbyError::UnknownCommand(_))));
}

#[test]
fn test_unknown_commands_are_rejected() {
    for raw in [
        &b""[..],
        b"delete:key",
        b"DONE",
        b"donex",
        b"done ",
        b"stor:key:value",
        b"store",
        b"get",
    ] {
        let result = parse_command(raw);
        assert!(
            matches!(result, Err(CubbyError::UnknownCommand(_))),
            "expected reject for {:?}",
            String::from_utf8_lossy(raw)
        );
    }
}

// =============================================================================
// Frame Tests
// =============================================================================

#[test]
fn test_frame_round_trip() {
    let commands = vec![
        Command::Store {
            key: b"abc:def".to_vec(),
            value: b"qrs:tuv".to_vec(),
        },
        Command::Get { key: b"abc:def".to_vec() },
        Command::Shutdown,
    ];

    for cmd in commands {
        let frame = encode_frame(&cmd);
        assert_eq!(decode_frame(&frame).unwrap(), cmd);
    }
}

#[test]
fn test_decode_frame_rejects_bad_transport() {
    let result = decode_frame(b"%%%");
    assert!(matches!(result, Err(CubbyError::MalformedTransport(_))));
}

// =============================================================================
// Stream I/O Tests
// =============================================================================

#[test]
fn test_stream_write_read_frame() {
    let mut buffer = Vec::new();
    write_frame(&mut buffer, b"aGVsbG8=").unwrap();
    assert_eq!(buffer, b"aGVsbG8=\n");

    let mut cursor = Cursor::new(buffer);
    let frame = read_frame(&mut cursor).unwrap();
    assert_eq!(frame, Some(b"aGVsbG8=".to_vec()));

    // Next read hits EOF
    assert_eq!(read_frame(&mut cursor).unwrap(), None);
}

#[test]
fn test_read_frame_strips_crlf() {
    let mut cursor = Cursor::new(b"ZnJhbWU=\r\n".to_vec());
    let frame = read_frame(&mut cursor).unwrap();
    assert_eq!(frame, Some(b"ZnJhbWU=".to_vec()));
}

#[test]
fn test_read_frame_empty_stream() {
    let mut cursor = Cursor::new(Vec::new());
    assert_eq!(read_frame(&mut cursor).unwrap(), None);
}

// =============================================================================
// Response Tests
// =============================================================================

#[test]
fn test_response_renders_value() {
    let response = Response::found(b"value".to_vec());
    assert_eq!(response.render(), b"value");

    let frame = response.to_frame();
    assert_eq!(Response::payload_from_frame(&frame).unwrap(), b"value");
}

#[test]
fn test_absent_response_renders_empty() {
    let response = Response::absent();
    assert_eq!(response.render(), b"");

    // An absent key encodes as an empty frame, not an error
    let frame = response.to_frame();
    assert!(frame.is_empty());
    assert_eq!(Response::payload_from_frame(&frame).unwrap(), b"");
}
