use chrono::{DateTime, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, Validation};
use serde::Deserialize;
use std::{error::Error as StdError, fmt};

use crate::services::auth::claims::{ClaimSet, ScopeClaim};

// Errors returned by access-token verification + strict claim validation.
#[derive(Debug)]
pub enum AccessJwtError {
    Jwt(jsonwebtoken::errors::Error),
    EmptyClaim(&'static str),
    InvalidExpiry,
}

impl fmt::Display for AccessJwtError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Jwt(e) => write!(f, "jwt verification failed: {}", e),
            Self::EmptyClaim(name) => write!(f, "empty '{}' claim", name),
            Self::InvalidExpiry => write!(f, "'exp' claim is out of range"),
        }
    }
}

impl StdError for AccessJwtError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self {
            Self::Jwt(e) => Some(e),
            _ => None,
        }
    }
}

impl From<jsonwebtoken::errors::Error> for AccessJwtError {
    fn from(e: jsonwebtoken::errors::Error) -> Self {
        Self::Jwt(e)
    }
}

/// Turns a raw bearer token into a verified claim set.
///
/// The gate only depends on this trait; signature and expiry checks live in the
/// implementation.
pub trait TokenVerifier: Send + Sync {
    fn verify(&self, token: &str) -> Result<ClaimSet, AccessJwtError>;
}

/// Access token (JWT) claims as they arrive on the wire.
///
/// NOTE:
/// - `scope` is preferred over `scp` when both are present.
/// - either may be a space-delimited string or an array of strings.
#[derive(Debug, Clone, Deserialize)]
struct AccessTokenClaims {
    iss: String,
    exp: u64,

    #[serde(default)]
    sub: Option<String>,

    #[serde(default)]
    scope: Option<ScopeClaim>,
    #[serde(default)]
    scp: Option<ScopeClaim>,
}

/// JWT access-token verifier backed by `jsonwebtoken`.
///
/// - Key material is intentionally not printable via Debug.
#[derive(Clone)]
pub struct JwtVerifier {
    decoding_key: DecodingKey,
    validation: Validation,
}

impl std::fmt::Debug for JwtVerifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Do not print key material
        f.debug_struct("JwtVerifier")
            .field("validation", &self.validation)
            .finish()
    }
}

impl JwtVerifier {
    pub fn new(
        decoding_key: DecodingKey,
        algorithm: Algorithm,
        issuer: &str,
        audience: Option<&str>,
        leeway_seconds: u64,
    ) -> Self {
        let mut validation = Validation::new(algorithm);
        validation.set_issuer(&[issuer]);
        validation.set_required_spec_claims(&["exp", "iss"]);
        match audience {
            Some(aud) => validation.set_audience(&[aud]),
            // No audience configured: accept whatever `aud` the issuer put in.
            None => validation.validate_aud = false,
        }
        validation.leeway = leeway_seconds;

        Self {
            decoding_key,
            validation,
        }
    }

    /// Build a verifier from the issuer's PEM-encoded public key.
    pub fn from_public_key_pem(
        pem: &str,
        algorithm: Algorithm,
        issuer: &str,
        audience: Option<&str>,
        leeway_seconds: u64,
    ) -> Result<Self, AccessJwtError> {
        let decoding_key = match algorithm {
            Algorithm::EdDSA => DecodingKey::from_ed_pem(pem.as_bytes())?,
            Algorithm::ES256 | Algorithm::ES384 => DecodingKey::from_ec_pem(pem.as_bytes())?,
            _ => DecodingKey::from_rsa_pem(pem.as_bytes())?,
        };

        Ok(Self::new(
            decoding_key,
            algorithm,
            issuer,
            audience,
            leeway_seconds,
        ))
    }

    // Verify and decode a JWT access token.
    fn decode(&self, token: &str) -> Result<AccessTokenClaims, jsonwebtoken::errors::Error> {
        let data =
            jsonwebtoken::decode::<AccessTokenClaims>(token, &self.decoding_key, &self.validation)?;

        Ok(data.claims)
    }
}

impl TokenVerifier for JwtVerifier {
    /// Verify + strict claim validation, then convert into a `ClaimSet`.
    ///
    /// `jsonwebtoken::Validation` already checks:
    /// - signature
    /// - `exp` (with leeway)
    /// - `iss` and, when configured, `aud`
    fn verify(&self, token: &str) -> Result<ClaimSet, AccessJwtError> {
        let claims = self.decode(token)?;

        if claims.iss.trim().is_empty() {
            return Err(AccessJwtError::EmptyClaim("iss"));
        }

        let expires_at = i64::try_from(claims.exp)
            .ok()
            .and_then(|secs| DateTime::<Utc>::from_timestamp(secs, 0))
            .ok_or(AccessJwtError::InvalidExpiry)?;

        let scopes = claims
            .scope
            .or(claims.scp)
            .map(ScopeClaim::into_scopes)
            .unwrap_or_default();

        Ok(ClaimSet {
            subject: claims.sub.filter(|s| !s.trim().is_empty()),
            issuer: claims.iss,
            scopes,
            expires_at,
        })
    }
}
