//! asp-services — the request engine behind the ASP listener.
//!
//! The catalog holds the animal/sound data, the dispatcher runs methods
//! against it, and `exchange` ties framing, header decoding, dispatch and
//! response encoding into one packet-in, bytes-out step.

pub mod catalog;
pub mod dispatch;
pub mod exchange;

pub use catalog::{Catalog, CatalogError};
pub use dispatch::{DispatchError, MethodDispatcher};
pub use exchange::{exchange, Reply};
