// src/auth.rs

//! GitHub App authentication.
//!
//! Builds the short-lived RS256 JWT that identifies this program as the
//! org's GitHub App. The JWT is only ever used to bootstrap an
//! installation access token; it is created once per run and never stored.

use anyhow::{Context, Result};
use chrono::Utc;
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use serde::Serialize;

/// Backdate `iat` to absorb clock skew against GitHub's verifier.
const CLOCK_SKEW_SECS: i64 = 60;

/// Lifetime from `iat`. GitHub rejects JWTs valid for more than 10 minutes,
/// so 60s skew + 9 minutes keeps the window inside the limit.
const LIFETIME_SECS: i64 = 9 * 60;

#[derive(Debug, Serialize)]
struct Claims {
    /// Issued at (Unix timestamp)
    iat: i64,
    /// Expiry (Unix timestamp)
    exp: i64,
    /// Issuer: the GitHub App id
    iss: String,
}

fn claims_at(app_id: u64, now: i64) -> Claims {
    Claims {
        iat: now - CLOCK_SKEW_SECS,
        exp: now + LIFETIME_SECS,
        iss: app_id.to_string(),
    }
}

/// Mint the app JWT from the configured app id and private key.
///
/// A malformed key is a configuration error and fails the run outright;
/// there is nothing to retry.
pub fn mint_app_jwt(app_id: u64, private_key_pem: &str) -> Result<String> {
    let key = EncodingKey::from_rsa_pem(private_key_pem.as_bytes())
        .context("ORG_APP_PRIVATE_KEY is not a valid RSA private key (PEM)")?;

    let claims = claims_at(app_id, Utc::now().timestamp());

    encode(&Header::new(Algorithm::RS256), &claims, &key).context("Failed to sign app JWT")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn claims_window_is_backdated_and_bounded() {
        let now = 1_700_000_000;
        let claims = claims_at(42, now);

        assert_eq!(claims.iat, now - 60);
        assert_eq!(claims.exp, now + 540);
        // Total validity must stay within GitHub's 10 minute ceiling
        assert!(claims.exp - claims.iat <= 600);
        assert_eq!(claims.iss, "42");
    }

    #[test]
    fn malformed_key_fails_before_signing() {
        let err = mint_app_jwt(42, "this is not a PEM").unwrap_err();
        assert!(err.to_string().contains("private key"));
    }
}
