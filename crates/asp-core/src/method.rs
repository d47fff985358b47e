//! The fixed ASP method set.

use std::fmt;

/// Length of every method code on the wire.
pub const METHOD_LEN: usize = 4;

/// A request method. Codes are exactly four plaintext characters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    /// List supported protocol versions.
    Vers,
    /// List supported methods for the requested version.
    Caps,
    /// Prefix search over animal names.
    Anim,
    /// Prefix search over sound names.
    Soun,
    /// Animal to sound lookup.
    Atos,
}

impl Method {
    /// Every method, in the order the server advertises them.
    pub const ALL: [Method; 5] = [
        Method::Vers,
        Method::Caps,
        Method::Anim,
        Method::Soun,
        Method::Atos,
    ];

    pub fn code(self) -> &'static str {
        match self {
            Method::Vers => "VERS",
            Method::Caps => "CAPS",
            Method::Anim => "ANIM",
            Method::Soun => "SOUN",
            Method::Atos => "ATOS",
        }
    }

    /// Look up a method by its exact plaintext code. Case-sensitive.
    pub fn from_code(code: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|m| m.code() == code)
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}
