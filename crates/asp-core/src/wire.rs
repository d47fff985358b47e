//! ASP wire format — framing and the fixed 12-byte request header.
//!
//! A packet is a 12-byte header followed by 0–20 bytes of Latin-1 body.
//! The header is `#[repr(C, packed)]` with zerocopy derives, so parsing is a
//! plain byte copy. Every reserved byte is ignored on read and zeroed on write.
//!
//! Header layout:
//!
//! ```text
//!  0        1..4       4     5..9          9..12
//! +--------+----------+-----+-------------+----------+
//! | ver|rs | reserved | key | method (4B) | reserved |
//! +--------+----------+-----+-------------+----------+
//! ```
//!
//! `ver` is the upper nibble of byte 0. The method is ciphertext on the wire,
//! rotated by `key`.

use std::fmt;

use static_assertions::assert_eq_size;
use zerocopy::{AsBytes, FromBytes, FromZeroes};

use crate::cipher::{self, Key};
use crate::method::{Method, METHOD_LEN};

// ── Constants ─────────────────────────────────────────────────────────────────

/// Fixed header size in bytes.
pub const HEADER_LEN: usize = 12;

/// Maximum body size in bytes.
pub const MAX_BODY_LEN: usize = 20;

/// Smallest legal packet: a bare header.
pub const MIN_PACKET_LEN: usize = HEADER_LEN;

/// Largest legal packet.
pub const MAX_PACKET_LEN: usize = HEADER_LEN + MAX_BODY_LEN;

// ── Header ────────────────────────────────────────────────────────────────────

/// The raw 12-byte request header.
///
/// No field is validated here. Use [`AspHeader::unpack`] followed by
/// [`UnpackedHeader::validate_and_decrypt`] to obtain a [`DecodedHeader`].
#[derive(Debug, Clone, AsBytes, FromBytes, FromZeroes)]
#[repr(C, packed)]
pub struct AspHeader {
    /// Upper nibble: protocol version. Lower nibble: reserved.
    pub version_byte: u8,
    pub reserved0: [u8; 3],
    /// Cipher key. Only 1..=25 is valid.
    pub key: u8,
    /// Method code, rotated by `key`.
    pub method: [u8; METHOD_LEN],
    pub reserved1: [u8; 3],
}

// Compile-time size guard. If this fails, the wire format has silently changed.
assert_eq_size!(AspHeader, [u8; HEADER_LEN]);

impl AspHeader {
    /// Build a header with all reserved bits zeroed.
    /// Only the low nibble of `version` fits on the wire.
    pub fn new(version: u8, key: u8, method: [u8; METHOD_LEN]) -> Self {
        Self {
            version_byte: (version & 0x0F) << 4,
            reserved0: [0; 3],
            key,
            method,
            reserved1: [0; 3],
        }
    }

    pub fn version(&self) -> u8 {
        self.version_byte >> 4
    }

    /// Structural unpack. Never fails, validates nothing.
    pub fn unpack(&self) -> UnpackedHeader {
        UnpackedHeader {
            version: self.version(),
            key: self.key,
            method_ciphertext: latin1_decode(&self.method),
        }
    }
}

/// Header fields as read off the wire, method still ciphered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnpackedHeader {
    pub version: u8,
    pub key: u8,
    pub method_ciphertext: String,
}

impl UnpackedHeader {
    /// Validate version, then key, then the decrypted method.
    /// The first failing check wins.
    pub fn validate_and_decrypt(&self) -> Result<DecodedHeader, WireError> {
        let version = ProtocolVersion::try_from(self.version)?;
        let key = Key::new(self.key).ok_or(WireError::InvalidKey(self.key))?;
        let plaintext = cipher::decode(&self.method_ciphertext, key);
        let method = Method::from_code(&plaintext).ok_or(WireError::UnsupportedMethod(plaintext))?;
        Ok(DecodedHeader {
            version,
            key,
            method,
        })
    }
}

/// A fully validated header with the method in plaintext.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecodedHeader {
    pub version: ProtocolVersion,
    pub key: Key,
    pub method: Method,
}

// ── Protocol version ──────────────────────────────────────────────────────────

/// Protocol versions this server speaks. ASP1 is not supported.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ProtocolVersion {
    V2 = 2,
    V3 = 3,
}

impl ProtocolVersion {
    pub const SUPPORTED: [ProtocolVersion; 2] = [ProtocolVersion::V2, ProtocolVersion::V3];
}

impl TryFrom<u8> for ProtocolVersion {
    type Error = WireError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            2 => Ok(ProtocolVersion::V2),
            3 => Ok(ProtocolVersion::V3),
            other => Err(WireError::UnsupportedVersion(other)),
        }
    }
}

impl From<ProtocolVersion> for u8 {
    fn from(v: ProtocolVersion) -> u8 {
        v as u8
    }
}

impl fmt::Display for ProtocolVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", *self as u8)
    }
}

// ── Framing ───────────────────────────────────────────────────────────────────

/// One received packet, split into header and body.
#[derive(Debug, Clone)]
pub struct Packet<'a> {
    header: AspHeader,
    body: &'a [u8],
}

impl<'a> Packet<'a> {
    /// Check the length bounds and split at [`HEADER_LEN`].
    /// Length is the only thing checked; body content is never inspected.
    pub fn parse(bytes: &'a [u8]) -> Result<Self, WireError> {
        if !(MIN_PACKET_LEN..=MAX_PACKET_LEN).contains(&bytes.len()) {
            return Err(WireError::InvalidPacketSize(bytes.len()));
        }
        let (head, body) = bytes.split_at(HEADER_LEN);
        let header =
            AspHeader::read_from(head).ok_or(WireError::InvalidPacketSize(bytes.len()))?;
        Ok(Self { header, body })
    }

    pub fn header(&self) -> &AspHeader {
        &self.header
    }

    pub fn body(&self) -> &'a [u8] {
        self.body
    }

    /// Body decoded as Latin-1 with surrounding whitespace trimmed.
    pub fn body_text(&self) -> String {
        latin1_decode(self.body).trim().to_string()
    }
}

/// Assemble a request packet. The method is ciphered with `key`.
///
/// `version` is written as given so callers can probe unsupported versions.
pub fn encode_request(
    version: u8,
    key: Key,
    method: Method,
    body: &str,
) -> Result<Vec<u8>, WireError> {
    let ciphered = cipher::encode(method.code(), key);
    let mut method_bytes = [0u8; METHOD_LEN];
    method_bytes.copy_from_slice(&latin1_encode(&ciphered));

    let header = AspHeader::new(version, key.get(), method_bytes);
    let body = latin1_encode(body);

    let len = HEADER_LEN + body.len();
    if len > MAX_PACKET_LEN {
        return Err(WireError::InvalidPacketSize(len));
    }

    let mut packet = Vec::with_capacity(len);
    packet.extend_from_slice(header.as_bytes());
    packet.extend_from_slice(&body);
    Ok(packet)
}

// ── Latin-1 ───────────────────────────────────────────────────────────────────

/// Every byte maps to the code point of the same value.
pub fn latin1_decode(bytes: &[u8]) -> String {
    bytes.iter().map(|&b| b as char).collect()
}

/// Characters above U+00FF have no Latin-1 form and become `?`.
pub fn latin1_encode(text: &str) -> Vec<u8> {
    text.chars().map(|c| u8::try_from(c).unwrap_or(b'?')).collect()
}

// ── Errors ────────────────────────────────────────────────────────────────────

/// Framing and header failures. The display form is the exact reply text,
/// sent to the client unencrypted.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum WireError {
    #[error("ASPERR: Invalid packet size.")]
    InvalidPacketSize(usize),

    #[error("ASPERR: Unsupported version '{0}'.")]
    UnsupportedVersion(u8),

    #[error("ASPERR: Invalid key '{0}'.")]
    InvalidKey(u8),

    #[error("ASPERR: Unsupported method '{0}'")]
    UnsupportedMethod(String),
}

// ── Tests ─────────────────────────────────────────────────────────────────────
