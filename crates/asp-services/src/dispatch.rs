//! Method dispatch — turns a decoded header and body into a plaintext reply.

use std::sync::Arc;

use rand::Rng;

use asp_core::wire::{DecodedHeader, ProtocolVersion};
use asp_core::Method;

use crate::catalog::Catalog;

/// ATOS with this body on ASP3 may answer with [`GLITCH_MESSAGE`].
pub const GLITCH_ANIMAL: &str = "Frog";
pub const GLITCH_VERSION: ProtocolVersion = ProtocolVersion::V3;
/// Chance of the glitch once the trigger matches. Intentional, keep as is.
pub const GLITCH_PROBABILITY: f64 = 0.2;
pub const GLITCH_MESSAGE: &str =
    "GlItCh iN ThE ASP mATRiX: RkxBR3t5b3VfbWFzdGVyM2RfcHJvdG9jb2w1fQo=";

/// Failures inside a method. Unlike header errors these are ordinary
/// replies and still go out cipher-encoded.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DispatchError {
    #[error("ASPERR: Invalid body.")]
    EmptyBody,

    #[error("ASPERR: Animal not found.")]
    AnimalNotFound,
}

/// Executes validated requests against the shared catalog.
#[derive(Debug, Clone)]
pub struct MethodDispatcher {
    catalog: Arc<Catalog>,
}

impl MethodDispatcher {
    pub fn new(catalog: Arc<Catalog>) -> Self {
        Self { catalog }
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Produce the plaintext reply. Method failures become their
    /// `ASPERR:` text; the caller encodes whatever comes back.
    ///
    /// `rng` is only consulted for the ATOS glitch.
    pub fn dispatch<R: Rng>(&self, header: &DecodedHeader, body: &str, rng: &mut R) -> String {
        tracing::debug!(
            method = %header.method,
            version = %header.version,
            body,
            "dispatching request"
        );
        self.answer(header, body, rng)
            .unwrap_or_else(|e| e.to_string())
    }

    fn answer<R: Rng>(
        &self,
        header: &DecodedHeader,
        body: &str,
        rng: &mut R,
    ) -> Result<String, DispatchError> {
        match header.method {
            Method::Vers => Ok(versions_message()),
            Method::Caps => Ok(capabilities_message(header.version)),
            Method::Anim => {
                let prefix = require_body(body)?;
                let matches = self.catalog.animals_with_prefix(prefix);
                Ok(listing_message("animals", prefix, &matches))
            }
            Method::Soun => {
                let prefix = require_body(body)?;
                let matches = self.catalog.sounds_with_prefix(prefix);
                Ok(listing_message("sounds", prefix, &matches))
            }
            Method::Atos => {
                let animal = require_body(body)?;
                self.animal_to_sound(header.version, animal, rng)
            }
        }
    }

    fn animal_to_sound<R: Rng>(
        &self,
        version: ProtocolVersion,
        animal: &str,
        rng: &mut R,
    ) -> Result<String, DispatchError> {
        // The draw only happens once the trigger matches.
        if animal == GLITCH_ANIMAL
            && version == GLITCH_VERSION
            && rng.gen::<f64>() < GLITCH_PROBABILITY
        {
            tracing::debug!("glitch triggered");
            return Ok(GLITCH_MESSAGE.to_string());
        }

        let sound = self
            .catalog
            .sound_of(animal)
            .ok_or(DispatchError::AnimalNotFound)?;
        Ok(format!("'{animal}' sound is {sound}"))
    }
}

fn require_body(body: &str) -> Result<&str, DispatchError> {
    if body.is_empty() {
        Err(DispatchError::EmptyBody)
    } else {
        Ok(body)
    }
}

fn versions_message() -> String {
    let versions: Vec<String> = ProtocolVersion::SUPPORTED
        .iter()
        .map(ToString::to_string)
        .collect();
    format!("Server supports ASP versions {}.", versions.join(", "))
}

fn capabilities_message(version: ProtocolVersion) -> String {
    let methods: Vec<&str> = Method::ALL.iter().map(|m| m.code()).collect();
    format!(
        "Server supports methods {} as part of version {version}.",
        methods.join(", ")
    )
}

fn listing_message(kind: &str, prefix: &str, matches: &[&str]) -> String {
    format!(
        "Server has {} {kind} starting with '{prefix}':\n{}",
        matches.len(),
        quoted_list(matches)
    )
}

/// Render names as `['a', 'b']`, the list notation ASP clients expect.
fn quoted_list(names: &[&str]) -> String {
    let items: Vec<String> = names.iter().map(|n| quote_name(n)).collect();
    format!("[{}]", items.join(", "))
}

/// Single-quote a name, switching to double quotes when the name holds a
/// single quote but no double quote.
fn quote_name(name: &str) -> String {
    let quote = if name.contains('\'') && !name.contains('"') {
        '"'
    } else {
        '\''
    };

    let mut out = String::with_capacity(name.len() + 2);
    out.push(quote);
    for c in name.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if c == quote => {
                out.push('\\');
                out.push(c);
            }
            c if is_unprintable(c) => out.push_str(&format!("\\x{:02x}", c as u32)),
            c => out.push(c),
        }
    }
    out.push(quote);
    out
}

// Covers the Latin-1 range; wider characters are left as they are.
fn is_unprintable(c: char) -> bool {
    matches!(c as u32, 0x00..=0x1f | 0x7f..=0xa0 | 0xad)
}
