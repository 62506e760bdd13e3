//! # Identifiers
//!
//! Actor identities, caller-generated local ids and ledger-issued ids.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Prefix of the persistence key for an actor's history.
pub const HISTORY_KEY_PREFIX: &str = "tx_history";

/// Identity owning an Actor Ledger (typically an account address).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ActorId(String);

impl ActorId {
    /// Wrap an identity string. Surrounding whitespace is trimmed and hex
    /// addresses are lowercased so the same account always maps to one key.
    pub fn new(identity: impl AsRef<str>) -> Self {
        let trimmed = identity.as_ref().trim();
        if trimmed.starts_with("0x") || trimmed.starts_with("0X") {
            Self(trimmed.to_ascii_lowercase())
        } else {
            Self(trimmed.to_string())
        }
    }

    /// Borrow the identity string.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Stable persistence key for this actor's record collection.
    pub fn storage_key(&self) -> Vec<u8> {
        format!("{}:{}", HISTORY_KEY_PREFIX, self.0).into_bytes()
    }
}

impl fmt::Display for ActorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ActorId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

/// Caller-generated, stable primary key of an Operation Record.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LocalId(String);

impl LocalId {
    /// Generate a fresh collision-resistant id (UUIDv4).
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    /// Borrow the id string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for LocalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for LocalId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for LocalId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// Identifier issued by the external ledger on an accepted submission.
pub type LedgerTxId = String;

/// Shorten a ledger id for display: `0x1234...abcd`.
pub fn short_hash(id: &str) -> String {
    if id.len() <= 12 {
        return id.to_string();
    }
    format!("{}...{}", &id[..6], &id[id.len() - 4..])
}
