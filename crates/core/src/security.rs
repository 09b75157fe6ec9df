//! Security primitives shared by the API and provisioning CLI:
//! - Argon2id password hashing, with rehash-on-login when parameters change.
//! - HMAC-signed admin bearer tokens.
//! - AEAD encryption for upstream credentials.

use crate::error::{TokenError, VaultError};
use crate::types::{ClubId, UserId};
use aes_gcm::aead::{Aead, AeadCore, KeyInit, OsRng as AeadOsRng};
use aes_gcm::{Aes256Gcm, Nonce};
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng};
use argon2::{Algorithm, Argon2, Params, Version};
use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// Target ~100ms on production hardware; encoded into the hash string so
/// raising these later doesn't invalidate existing records.
fn current_argon2_params() -> Params {
    Params::new(19_456, 2, 1, None).expect("static Argon2 params are valid")
}

fn argon2id() -> Argon2<'static> {
    Argon2::new(Algorithm::Argon2id, Version::V0x13, current_argon2_params())
}

/// Hash a password using Argon2id with the current target parameters.
pub fn hash_password(password: &str) -> anyhow::Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = argon2id()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| anyhow::anyhow!("failed to hash password: {e}"))?;
    Ok(hash.to_string())
}

/// Verify a password against a stored Argon2id hash.
///
/// Returns whether the password matched, and whether the hash was produced
/// with outdated parameters (callers should rehash and persist in that case).
pub fn verify_password(password: &str, hash: &str) -> anyhow::Result<PasswordCheck> {
    let parsed = PasswordHash::new(hash).map_err(|e| anyhow::anyhow!("malformed password hash: {e}"))?;
    let matches = argon2id()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok();

    let needs_rehash = matches
        && Params::try_from(&parsed)
            .map(|p| p.m_cost() != current_argon2_params().m_cost())
            .unwrap_or(true);

    Ok(PasswordCheck {
        matches,
        needs_rehash,
    })
}

pub struct PasswordCheck {
    pub matches: bool,
    pub needs_rehash: bool,
}

/// Claims embedded in an admin bearer token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenClaims {
    pub user_id: UserId,
    pub club_id: ClubId,
    pub role: String,
    pub iat: i64,
    pub exp: i64,
}

/// HMAC-SHA256 signed, base64url `header.payload.signature` token. The
/// algorithm is fixed and explicit in the header; there is no "none" variant.
pub fn issue_token(claims: &TokenClaims, secret: &str) -> anyhow::Result<String> {
    let header = base64_url_encode(br#"{"alg":"HS256","typ":"JWT"}"#);
    let payload_json = serde_json::to_vec(claims)?;
    let payload = base64_url_encode(&payload_json);
    let signing_input = format!("{header}.{payload}");
    let signature = sign(&signing_input, secret)?;
    Ok(format!("{signing_input}.{signature}"))
}

/// Verify a token's signature and expiry, returning its claims.
///
/// Does not check `is_active` — callers must do a DB check per §4.6 if the
/// route requires it (see `TokenError::UserDeactivated`, constructed by the
/// caller, not here).
pub fn verify_token(token: &str, secret: &str, now: i64) -> Result<TokenClaims, TokenError> {
    let mut parts = token.split('.');
    let (header, payload, signature) = match (parts.next(), parts.next(), parts.next()) {
        (Some(h), Some(p), Some(s)) if parts.next().is_none() => (h, p, s),
        _ => return Err(TokenError::Malformed),
    };

    let signing_input = format!("{header}.{payload}");
    let expected = sign(&signing_input, secret).map_err(|_| TokenError::Malformed)?;
    if !constant_time_eq(expected.as_bytes(), signature.as_bytes()) {
        return Err(TokenError::BadSignature);
    }

    let payload_bytes = base64_url_decode(payload).map_err(|_| TokenError::Malformed)?;
    let claims: TokenClaims =
        serde_json::from_slice(&payload_bytes).map_err(|_| TokenError::Malformed)?;

    if claims.exp < now {
        return Err(TokenError::Expired);
    }

    Ok(claims)
}

fn sign(signing_input: &str, secret: &str) -> anyhow::Result<String> {
    let mut mac = <HmacSha256 as Mac>::new_from_slice(secret.as_bytes())
        .map_err(|e| anyhow::anyhow!("invalid HMAC key: {e}"))?;
    mac.update(signing_input.as_bytes());
    Ok(base64_url_encode(&mac.finalize().into_bytes()))
}

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

fn base64_url_encode(data: &[u8]) -> String {
    use base64::Engine;
    base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(data)
}

fn base64_url_decode(data: &str) -> anyhow::Result<Vec<u8>> {
    use base64::Engine;
    Ok(base64::engine::general_purpose::URL_SAFE_NO_PAD.decode(data)?)
}

/// Plaintext upstream login credentials, as stored (encrypted) on the club.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct UpstreamCredentials {
    pub username: String,
    pub password: String,
}

/// Encrypt credentials with a fresh random nonce. The nonce is prepended to
/// the ciphertext (which carries its own authentication tag), then the whole
/// blob is hex-encoded for storage in the `data_source_config` JSON column.
pub fn encrypt_credentials(
    creds: &UpstreamCredentials,
    key: &[u8; 32],
) -> Result<String, VaultError> {
    let cipher = Aes256Gcm::new(key.into());
    let nonce = Aes256Gcm::generate_nonce(&mut AeadOsRng);
    let plaintext = serde_json::to_vec(creds).map_err(|_| VaultError::EncryptionFailed)?;
    let ciphertext = cipher
        .encrypt(&nonce, plaintext.as_ref())
        .map_err(|_| VaultError::EncryptionFailed)?;

    let mut blob = Vec::with_capacity(nonce.len() + ciphertext.len());
    blob.extend_from_slice(&nonce);
    blob.extend_from_slice(&ciphertext);
    Ok(hex::encode(blob))
}

/// Decrypt a blob produced by [`encrypt_credentials`]. Fails closed: any
/// error (wrong key, truncated blob, tampered tag) returns an error with no
/// partial plaintext.
pub fn decrypt_credentials(
    blob_hex: &str,
    key: &[u8; 32],
) -> Result<UpstreamCredentials, VaultError> {
    let blob = hex::decode(blob_hex).map_err(|_| VaultError::DecryptionFailed)?;
    if blob.len() < 12 {
        return Err(VaultError::DecryptionFailed);
    }
    let (nonce_bytes, ciphertext) = blob.split_at(12);
    let nonce = Nonce::from_slice(nonce_bytes);

    let cipher = Aes256Gcm::new(key.into());
    let plaintext = cipher
        .decrypt(nonce, ciphertext)
        .map_err(|_| VaultError::DecryptionFailed)?;

    serde_json::from_slice(&plaintext).map_err(|_| VaultError::DecryptionFailed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn password_hashing_round_trips() {
        let hash = hash_password("correct horse battery staple").unwrap();
        assert!(hash.starts_with("$argon2id"));
        let check = verify_password("correct horse battery staple", &hash).unwrap();
        assert!(check.matches);
        assert!(!check.needs_rehash);
    }

    #[test]
    fn password_hashing_rejects_wrong_password() {
        let hash = hash_password("right").unwrap();
        let check = verify_password("wrong", &hash).unwrap();
        assert!(!check.matches);
    }

    #[test]
    fn token_round_trips() {
        let claims = TokenClaims {
            user_id: UserId::new(),
            club_id: ClubId::new(),
            role: "club_admin".into(),
            iat: 1000,
            exp: 2000,
        };
        let token = issue_token(&claims, "secret").unwrap();
        let verified = verify_token(&token, "secret", 1500).unwrap();
        assert_eq!(verified.user_id, claims.user_id);
        assert_eq!(verified.club_id, claims.club_id);
    }

    #[test]
    fn token_rejects_expired() {
        let claims = TokenClaims {
            user_id: UserId::new(),
            club_id: ClubId::new(),
            role: "club_admin".into(),
            iat: 1000,
            exp: 2000,
        };
        let token = issue_token(&claims, "secret").unwrap();
        let err = verify_token(&token, "secret", 2001).unwrap_err();
        assert!(matches!(err, TokenError::Expired));
    }

    #[test]
    fn token_rejects_wrong_secret() {
        let claims = TokenClaims {
            user_id: UserId::new(),
            club_id: ClubId::new(),
            role: "club_admin".into(),
            iat: 1000,
            exp: 2000,
        };
        let token = issue_token(&claims, "secret").unwrap();
        let err = verify_token(&token, "other secret", 1500).unwrap_err();
        assert!(matches!(err, TokenError::BadSignature));
    }

    #[test]
    fn token_rejects_malformed() {
        let err = verify_token("not-a-token", "secret", 0).unwrap_err();
        assert!(matches!(err, TokenError::Malformed));
    }

    #[test]
    fn credentials_encrypt_decrypt_identity() {
        let key = [3u8; 32];
        let creds = UpstreamCredentials {
            username: "coach".into(),
            password: "hunter2".into(),
        };
        let blob = encrypt_credentials(&creds, &key).unwrap();
        let decrypted = decrypt_credentials(&blob, &key).unwrap();
        assert_eq!(decrypted, creds);
    }

    #[test]
    fn credentials_decrypt_fails_closed_with_wrong_key() {
        let key = [3u8; 32];
        let wrong_key = [4u8; 32];
        let creds = UpstreamCredentials {
            username: "coach".into(),
            password: "hunter2".into(),
        };
        let blob = encrypt_credentials(&creds, &key).unwrap();
        assert!(decrypt_credentials(&blob, &wrong_key).is_err());
    }

    #[test]
    fn credentials_decrypt_fails_on_corrupted_blob() {
        let key = [3u8; 32];
        let creds = UpstreamCredentials {
            username: "coach".into(),
            password: "hunter2".into(),
        };
        let mut blob = hex::decode(encrypt_credentials(&creds, &key).unwrap()).unwrap();
        let last = blob.len() - 1;
        blob[last] ^= 0xFF;
        assert!(decrypt_credentials(&hex::encode(blob), &key).is_err());
    }

    #[test]
    fn rotation_produces_different_ciphertext() {
        let key = [9u8; 32];
        let creds = UpstreamCredentials {
            username: "u".into(),
            password: "p".into(),
        };
        let blob1 = encrypt_credentials(&creds, &key).unwrap();
        let blob2 = encrypt_credentials(&creds, &key).unwrap();
        assert_ne!(blob1, blob2, "nonce must be random per encryption");
    }
}
