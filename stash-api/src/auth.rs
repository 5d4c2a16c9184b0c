//! Authentication for the STASH cache service.
//!
//! Clients present a signed bearer token, either bare or as
//! `Authorization: Bearer <token>`. The token is an EdDSA (Ed25519) JWT
//! verified against a single public key configured at process start. There
//! is no key rotation and, deliberately, no expiry enforcement: the
//! verifier checks the signature and the presence of a subject, nothing
//! else. Callers that care about expiry can inspect the claims surfaced on
//! [`Token`].
//!
//! Verification is pure: a failed authorization touches nothing but the
//! header string.

use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use stash_core::{AuthError, ConfigError};

// ============================================================================
// TOKEN
// ============================================================================

/// Verified identity extracted from a bearer token.
///
/// Immutable and scoped to one session (streaming calls) or one request
/// (unary calls). The subject is the tenant identity and the unit of
/// key-space isolation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    /// Subject claim: the tenant identity. Always present and non-empty.
    pub subject: String,

    /// Audience claim, if the issuer set one.
    pub audience: Option<String>,

    /// Issued-at as Unix epoch seconds, if present.
    pub issued_at: Option<i64>,

    /// Expiry as Unix epoch seconds, if present. Not enforced here.
    pub expires: Option<i64>,
}

impl Token {
    /// Whether the token's own expiry claim has passed at `now`.
    ///
    /// Authorization does not call this; it exists for callers that want
    /// stricter-than-default policy. Tokens without an `exp` claim never
    /// report expired.
    pub fn is_expired(&self, now: i64) -> bool {
        matches!(self.expires, Some(exp) if exp < now)
    }
}

/// Raw JWT claims as deserialized from the token payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct Claims {
    sub: Option<String>,
    aud: Option<String>,
    iat: Option<i64>,
    exp: Option<i64>,
}

// ============================================================================
// CONFIGURATION
// ============================================================================

/// Authentication configuration.
#[derive(Debug, Clone, Default)]
pub struct AuthConfig {
    /// PEM-encoded Ed25519 public key used to verify token signatures.
    pub public_key_pem: Option<String>,
}

impl AuthConfig {
    /// Create authentication configuration from environment variables.
    ///
    /// # Environment Variables
    /// - `STASH_AUTH_PUBLIC_KEY`: PEM-encoded Ed25519 public key (SPKI)
    pub fn from_env() -> Self {
        Self {
            public_key_pem: std::env::var("STASH_AUTH_PUBLIC_KEY").ok(),
        }
    }

    /// Validate the authentication configuration for the given environment.
    ///
    /// Production refuses to start without a verification key; development
    /// logs a warning and continues so local tooling can poke at an
    /// unauthenticated-by-accident server and get clean errors back.
    pub fn validate_for_production(&self, environment: &str) -> Result<(), ConfigError> {
        let is_production = matches!(environment.to_lowercase().as_str(), "production" | "prod");

        if self.public_key_pem.is_none() {
            if is_production {
                return Err(ConfigError::MissingRequired {
                    field: "STASH_AUTH_PUBLIC_KEY".to_string(),
                });
            }
            tracing::warn!(
                "No token verification key configured. Every request will be \
                 rejected as unauthenticated. Set STASH_AUTH_PUBLIC_KEY to a \
                 PEM-encoded Ed25519 public key."
            );
        }

        Ok(())
    }
}

// ============================================================================
// AUTHORIZER
// ============================================================================

/// Verifies bearer tokens against the configured public key.
pub struct Authorizer {
    decoding_key: Option<DecodingKey>,
    validation: Validation,
}

impl Authorizer {
    /// Build an authorizer from configuration, parsing the public key once.
    pub fn from_config(config: &AuthConfig) -> Result<Self, ConfigError> {
        let decoding_key = match &config.public_key_pem {
            Some(pem) => Some(DecodingKey::from_ed_pem(pem.as_bytes()).map_err(|e| {
                ConfigError::InvalidValue {
                    field: "STASH_AUTH_PUBLIC_KEY".to_string(),
                    value: "<pem>".to_string(),
                    reason: e.to_string(),
                }
            })?),
            None => None,
        };

        // Signature verification only. Expiry is intentionally not
        // enforced; the Token surfaces exp for callers that want it.
        let mut validation = Validation::new(Algorithm::EdDSA);
        validation.validate_exp = false;
        validation.validate_nbf = false;
        validation.validate_aud = false;
        validation.required_spec_claims = std::collections::HashSet::new();

        Ok(Self {
            decoding_key,
            validation,
        })
    }

    /// Verify a bearer header value and extract the tenant identity.
    ///
    /// Accepts the raw token or a `Bearer <token>` form; any other shape is
    /// rejected before the signature is examined.
    pub fn authorize(&self, header_value: &str) -> Result<Token, AuthError> {
        let raw = strip_bearer_scheme(header_value)?;

        let decoding_key = self
            .decoding_key
            .as_ref()
            .ok_or(AuthError::MissingVerificationKey)?;

        let token_data = decode::<Claims>(raw, decoding_key, &self.validation).map_err(|e| {
            AuthError::InvalidToken {
                reason: e.to_string(),
            }
        })?;

        let claims = token_data.claims;
        let subject = match claims.sub {
            Some(sub) if !sub.is_empty() => sub,
            _ => return Err(AuthError::MissingSubject),
        };

        Ok(Token {
            subject,
            audience: claims.aud,
            issued_at: claims.iat,
            expires: claims.exp,
        })
    }
}

/// Reduce a header value to the bare token.
///
/// Accepted shapes: `<token>` and `<scheme> <token>` where the scheme is
/// `Bearer` in any case. Anything else is a malformed header.
fn strip_bearer_scheme(header_value: &str) -> Result<&str, AuthError> {
    let fields: Vec<&str> = header_value.split_whitespace().collect();

    match fields.as_slice() {
        [] => Err(AuthError::MissingCredentials),
        [token] => Ok(token),
        [scheme, token] if scheme.eq_ignore_ascii_case("bearer") => Ok(token),
        _ => Err(AuthError::MalformedHeader),
    }
}

// ============================================================================
// TESTS
// ============================================================================
