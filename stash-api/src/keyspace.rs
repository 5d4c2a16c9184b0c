//! Tenant-scoped key derivation.
//!
//! Every client-supplied key is qualified with the verified tenant subject
//! and the logical database number before it touches the store, so two
//! tenants can never observe each other's entries. The internal form is
//! `"{subject}.{database}-{client_key}"`, kept for compatibility with
//! existing deployments.
//!
//! Known limitation: the separator characters can appear inside subjects
//! and keys, so the derivation is not collision-free against adversarial
//! component strings. Subjects come from the token issuer rather than the
//! request, which bounds the exposure; a length-prefixed composition would
//! remove it entirely and can be swapped in here without touching call
//! sites.

use stash_core::KeyError;

use crate::auth::Token;

/// A derived storage key plus the client-visible key it was built from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DerivedKey {
    internal: String,
    client: String,
}

impl DerivedKey {
    /// The fully-qualified key used against the store.
    pub fn internal(&self) -> &str {
        &self.internal
    }

    /// The original client-visible key, echoed back in responses.
    pub fn client(&self) -> &str {
        &self.client
    }
}

/// Derive the internal storage key for a client key.
///
/// Deterministic and pure. The error return is the seam for stricter
/// derivation policies; the current composition never fails.
pub fn derive(token: &Token, database: u32, client_key: &str) -> Result<DerivedKey, KeyError> {
    Ok(DerivedKey {
        internal: format!("{}.{}-{}", token.subject, database, client_key),
        client: client_key.to_string(),
    })
}

/// The prefix every key in a tenant's database namespace starts with.
///
/// Purge matches against this; deriving with an empty client key yields
/// the namespace itself, which is why an empty purge prefix sweeps exactly
/// the caller's namespace and nothing else.
pub fn namespace_prefix(token: &Token, database: u32) -> Result<String, KeyError> {
    derive(token, database, "").map(|key| key.internal)
}
