//! Account identity used for stakers, owners and the farm's custody account.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::TypesError;

/// An opaque principal identity.
///
/// The farm never interprets the contents; it only compares, hashes and
/// orders identities. Whatever the host uses (hex addresses, key
/// fingerprints, user names) fits as long as it is non-empty and has no
/// whitespace.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct AccountId(String);

impl AccountId {
    /// Create an account id from a raw string.
    ///
    /// # Panics
    /// Panics if the string is not a valid identity. Use [`str::parse`] for
    /// untrusted input.
    pub fn new(raw: impl Into<String>) -> Self {
        let s = raw.into();
        assert!(Self::is_well_formed(&s), "account id must be non-empty without whitespace");
        Self(s)
    }

    /// Return the raw identity string.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Raw bytes used as the storage key.
    pub fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }

    fn is_well_formed(s: &str) -> bool {
        !s.is_empty() && !s.chars().any(char::is_whitespace)
    }
}

impl FromStr for AccountId {
    type Err = TypesError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if Self::is_well_formed(s) {
            Ok(Self(s.to_string()))
        } else {
            Err(TypesError::InvalidAccountId(s.to_string()))
        }
    }
}

impl TryFrom<&[u8]> for AccountId {
    type Error = TypesError;

    fn try_from(bytes: &[u8]) -> Result<Self, Self::Error> {
        let s = std::str::from_utf8(bytes)
            .map_err(|_| TypesError::InvalidAccountId(String::from_utf8_lossy(bytes).into_owned()))?;
        s.parse()
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for AccountId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}
