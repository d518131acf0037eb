//! Opaque session bearer tokens
//!
//! Session identity is a 256-bit random value, hex-encoded to 64 characters.
//! The token doubles as the bearer credential at the HTTP boundary, so it is
//! generated from the OS entropy source rather than a time-sortable UUID.

use rand::rngs::OsRng;
use rand::RngCore;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fmt::Write as _;

/// Length in bytes of the random token material (256 bits)
const TOKEN_BYTES: usize = 32;

/// Opaque identifier for a game session
///
/// Doubles as the player's bearer credential, so it carries no embedded
/// structure or timestamp.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionToken(String);

impl SessionToken {
    /// Generate a fresh token from OS entropy
    pub fn generate() -> Self {
        let mut bytes = [0u8; TOKEN_BYTES];
        OsRng.fill_bytes(&mut bytes);

        let mut encoded = String::with_capacity(TOKEN_BYTES * 2);
        for byte in bytes {
            // Writing to a String cannot fail
            let _ = write!(encoded, "{byte:02x}");
        }
        Self(encoded)
    }

    /// Get the token as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for SessionToken {
    fn from(raw: String) -> Self {
        Self(raw)
    }
}

impl From<&str> for SessionToken {
    fn from(raw: &str) -> Self {
        Self(raw.to_string())
    }
}

impl fmt::Display for SessionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
