//! Protocol Module
//!
//! Defines the wire protocol for client-server communication.
//!
//! ## Protocol Format (line-based text)
//!
//! Each request is a single newline-terminated line. The line body is the
//! base64 encoding of a raw command string:
//!
//! ```text
//! ┌────────────────────────────────┬──────────────────────────────┐
//! │ Raw command string             │ Meaning                      │
//! ├────────────────────────────────┼──────────────────────────────┤
//! │ store:<esc-key>:<esc-value>    │ persist value under key      │
//! │ get:<esc-key>                  │ fetch value for key          │
//! │ done                           │ stop accepting connections   │
//! └────────────────────────────────┴──────────────────────────────┘
//! ```
//!
//! ### Escaping
//! `:` is the field delimiter. A literal `:` inside a key or value is
//! written as `\:` in the raw command string. The escape character `\` is
//! never escaped itself, so a key whose last byte is `\` cannot be
//! followed by the delimiter unambiguously. Known protocol limitation.
//!
//! ### Responses
//! Only `get` produces a reply: one newline-terminated line carrying the
//! base64-encoded value, or an empty line if the key is absent. A missing
//! key is not an error at the protocol level.

mod command;
mod response;
mod codec;

pub use command::Command;
pub use response::Response;
pub use codec::{
    DELIMITER, ESCAPE,
    encode_transport, decode_transport,
    escape, unescape,
    encode_command, parse_command,
    encode_frame, decode_frame,
    read_frame, write_frame,
};
