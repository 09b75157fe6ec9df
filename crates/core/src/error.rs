//! Shared domain error types
//!
//! These are the errors raised by logic in this crate (credential vault,
//! config merge, token verification). HTTP-facing crates convert them into
//! the canonical error envelope at their boundary; they never carry HTTP
//! status codes themselves.

use crate::types::{ClubId, UserId};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors from the credential vault (`security::encrypt_credentials` /
/// `decrypt_credentials`).
#[derive(Error, Debug)]
pub enum VaultError {
    #[error("encryption key must be {expected} bytes, got {actual}")]
    InvalidKeyLength { expected: usize, actual: usize },

    #[error("encryption key is not valid hex")]
    InvalidKeyEncoding,

    #[error("failed to encrypt credentials")]
    EncryptionFailed,

    #[error("failed to decrypt credentials: wrong key or corrupted blob")]
    DecryptionFailed,

    #[error("club has no stored credentials")]
    MissingCredentials,
}

/// Errors from HMAC token issuance/verification.
#[derive(Error, Debug)]
pub enum TokenError {
    #[error("token is malformed")]
    Malformed,

    #[error("token signature does not match")]
    BadSignature,

    #[error("token has expired")]
    Expired,

    #[error("token belongs to club {token_club}, not {resolved_club}")]
    WrongTenant {
        token_club: ClubId,
        resolved_club: ClubId,
    },

    #[error("user {0} is no longer active")]
    UserDeactivated(UserId),
}

/// A single field-level validation failure, surfaced verbatim in
/// `VALIDATION_ERROR` responses.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Errors from display/branding config validation (`merge` module).
#[derive(Error, Debug)]
#[error("validation failed")]
pub struct ValidationError {
    pub fields: Vec<FieldError>,
}

impl ValidationError {
    pub fn single(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            fields: vec![FieldError::new(field, message)],
        }
    }
}
