//! Response definitions
//!
//! Represents the reply to a `get` request.

use crate::error::Result;
use super::codec::{decode_transport, encode_transport};

/// The result of a lookup, as sent back to the client
///
/// An absent key renders as an empty payload; it is not an error at the
/// protocol level, so a stored empty value and a missing key are
/// indistinguishable on the wire.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    /// The stored value, if the key was present
    pub value: Option<Vec<u8>>,
}

impl Response {
    /// Create a response for a key that was found
    pub fn found(value: Vec<u8>) -> Self {
        Self { value: Some(value) }
    }

    /// Create a response for a key that was never stored
    pub fn absent() -> Self {
        Self { value: None }
    }

    /// Render the response payload: the value, or empty if absent
    pub fn render(&self) -> &[u8] {
        self.value.as_deref().unwrap_or(&[])
    }

    /// Encode the rendered payload as a transport frame
    pub fn to_frame(&self) -> Vec<u8> {
        encode_transport(self.render())
    }

    /// Decode a reply frame back into the raw payload (client side)
    pub fn payload_from_frame(frame: &[u8]) -> Result<Vec<u8>> {
        decode_transport(frame)
    }
}
