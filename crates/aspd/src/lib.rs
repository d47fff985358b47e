//! aspd — the ASP TCP listener.
//!
//! The binary in `main.rs` loads config and the catalog, then hands both to
//! [`listener::AspListener`]. The listener is exposed as a library so the
//! integration tests can run it in-process.

pub mod listener;

pub use listener::{handle_connection, AspListener};
