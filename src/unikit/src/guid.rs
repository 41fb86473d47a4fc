//! Asset identifier tokens.
//!
//! Unity names every asset with a 32 character lowercase hexadecimal GUID,
//! stored in the asset's `.meta` sidecar as `guid: <token>`.

use std::borrow::Borrow;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Length of a GUID token in characters
pub const GUID_LEN: usize = 32;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum GuidError {
    #[error("GUID must be {GUID_LEN} characters, got {0}")]
    InvalidLength(usize),

    #[error("GUID contains a character that is not lowercase hex: {0:?}")]
    InvalidCharacter(char),
}

/// A validated 32 character lowercase hex token
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Guid(String);

impl Guid {
    /// Validate and wrap a token
    pub fn parse(s: &str) -> Result<Self, GuidError> {
        if s.len() != GUID_LEN {
            return Err(GuidError::InvalidLength(s.chars().count()));
        }
        if let Some(c) = s.chars().find(|c| !is_lower_hex(*c)) {
            return Err(GuidError::InvalidCharacter(c));
        }
        Ok(Guid(s.to_string()))
    }

    /// Generate a fresh random token
    pub fn generate() -> Self {
        Guid(uuid::Uuid::new_v4().simple().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

fn is_lower_hex(c: char) -> bool {
    c.is_ascii_digit() || ('a'..='f').contains(&c)
}

impl fmt::Display for Guid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for Guid {
    type Err = GuidError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Guid::parse(s)
    }
}

impl AsRef<str> for Guid {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for Guid {
    fn borrow(&self) -> &str {
        &self.0
    }
}
