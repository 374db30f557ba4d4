//! Write authorization gate and archived-record visibility filter.
//!
//! Both checks compare a value presented by the caller against a secret held
//! by the server. They take the secret as a parameter so they never depend on
//! when or how configuration was loaded.

use sha2::{Digest, Sha256};

use crate::resource::{Record, Schema};

/// Header carrying the write token
pub const TOKEN_HEADER: &str = "token";

/// Header carrying the archived-visibility key
pub const SHOW_ARCHIVED_HEADER: &str = "show-archived";

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum AccessDenied {
    #[error("Missing Token header")]
    MissingToken,
    #[error("Invalid token")]
    InvalidToken,
    #[error("Writes are disabled on this server")]
    NotConfigured,
}

/// Server-held secrets for both checks
#[derive(Clone, Default)]
pub struct Secrets {
    pub write_token: Option<String>,
    pub show_archived: Option<String>,
}

impl std::fmt::Debug for Secrets {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Secrets")
            .field("write_token", &self.write_token.as_ref().map(|_| "<redacted>"))
            .field("show_archived", &self.show_archived.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

/// Decide whether a create or update may proceed.
///
/// An unset or empty secret rejects everything.
pub fn authorize(secret: Option<&str>, presented: Option<&str>) -> Result<(), AccessDenied> {
    let secret = secret.filter(|s| !s.is_empty()).ok_or(AccessDenied::NotConfigured)?;
    let presented = presented.ok_or(AccessDenied::MissingToken)?;

    if secrets_match(secret, presented) {
        Ok(())
    } else {
        Err(AccessDenied::InvalidToken)
    }
}

/// Whether archived records are included in a listing. Fails closed.
pub fn archived_visible(secret: Option<&str>, presented: Option<&str>) -> bool {
    match (secret.filter(|s| !s.is_empty()), presented) {
        (Some(secret), Some(presented)) => secrets_match(secret, presented),
        _ => false,
    }
}

pub fn is_visible<S: Schema>(record: &Record<S>, include_archived: bool) -> bool {
    include_archived || !record.archived()
}

// Exact equality, compared on digests so timing does not track a shared prefix
fn secrets_match(expected: &str, presented: &str) -> bool {
    Sha256::digest(expected.as_bytes()) == Sha256::digest(presented.as_bytes())
}
