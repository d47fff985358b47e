//! asp-core — shared types, wire format, and the rotating cipher.
//! All other ASP crates depend on this one.

pub mod cipher;
pub mod config;
pub mod method;
pub mod wire;

pub use cipher::Key;
pub use method::Method;
pub use wire::{DecodedHeader, ProtocolVersion, WireError};
