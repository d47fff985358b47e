//! One request/response exchange, minus the socket.
//!
//! raw bytes → framing → header decode → dispatch → cipher-encoded reply.
//! Framing and header failures short-circuit into a plaintext rejection:
//! without a valid header there is no key both sides can trust.

use rand::Rng;

use asp_core::cipher::{self, Key};
use asp_core::wire::{latin1_encode, Packet, WireError};
use asp_core::Method;

use crate::dispatch::MethodDispatcher;

/// Outcome of a single exchange.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    /// Framing or header validation failed. Sent in plaintext.
    Rejected(WireError),
    /// A method ran. `text` is plaintext and gets encoded with `key`.
    Answered {
        key: Key,
        method: Method,
        text: String,
    },
}

impl Reply {
    /// Bytes to write back to the client.
    pub fn to_wire(&self) -> Vec<u8> {
        match self {
            Reply::Rejected(err) => latin1_encode(&err.to_string()),
            Reply::Answered { key, text, .. } => encode_response(text, *key),
        }
    }

    pub fn is_rejected(&self) -> bool {
        matches!(self, Reply::Rejected(_))
    }
}

/// Cipher-encode a plaintext reply with the request's key.
pub fn encode_response(text: &str, key: Key) -> Vec<u8> {
    latin1_encode(&cipher::encode(text, key))
}

/// Run one packet through the full pipeline.
pub fn exchange<R: Rng>(packet: &[u8], dispatcher: &MethodDispatcher, rng: &mut R) -> Reply {
    let packet = match Packet::parse(packet) {
        Ok(p) => p,
        Err(e) => return Reply::Rejected(e),
    };

    let header = match packet.header().unpack().validate_and_decrypt() {
        Ok(h) => h,
        Err(e) => return Reply::Rejected(e),
    };

    let body = packet.body_text();
    let text = dispatcher.dispatch(&header, &body, rng);
    Reply::Answered {
        key: header.key,
        method: header.method,
        text,
    }
}
