//! Property-Based Tests for Key Derivation
//!
//! The derivation is the tenant-isolation boundary: it must be
//! deterministic, echo the client key untouched, and never map two
//! different tenants onto the same internal key for the same
//! (database, key) pair.

use proptest::prelude::*;
use stash_api::keyspace;
use stash_api::Token;

fn token(subject: &str) -> Token {
    Token {
        subject: subject.to_string(),
        audience: None,
        issued_at: None,
        expires: None,
    }
}

/// Strategy for tenant subjects as issuers mint them.
fn subject_strategy() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9_:-]{1,32}"
}

/// Strategy for arbitrary client keys, including separator characters.
fn client_key_strategy() -> impl Strategy<Value = String> {
    "[ -~]{0,48}"
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(500))]

    /// Property: Derivation is deterministic - repeated calls with the
    /// same inputs yield identical internal keys.
    #[test]
    fn prop_derivation_deterministic(
        subject in subject_strategy(),
        database in any::<u32>(),
        key in client_key_strategy(),
    ) {
        let t = token(&subject);
        let first = keyspace::derive(&t, database, &key).expect("derive should succeed");
        let second = keyspace::derive(&t, database, &key).expect("derive should succeed");
        prop_assert_eq!(first, second);
    }

    /// Property: Different subjects never collide for the same
    /// (database, key) pair. The suffix after the subject is identical on
    /// both sides, so equal internal keys would force equal subjects.
    #[test]
    fn prop_subjects_are_disjoint(
        s1 in subject_strategy(),
        s2 in subject_strategy(),
        database in any::<u32>(),
        key in client_key_strategy(),
    ) {
        prop_assume!(s1 != s2);
        let a = keyspace::derive(&token(&s1), database, &key).expect("derive should succeed");
        let b = keyspace::derive(&token(&s2), database, &key).expect("derive should succeed");
        prop_assert_ne!(a.internal().to_string(), b.internal().to_string());
    }

    /// Property: The client-visible key is echoed back unchanged.
    #[test]
    fn prop_client_key_echoed(
        subject in subject_strategy(),
        database in any::<u32>(),
        key in client_key_strategy(),
    ) {
        let derived = keyspace::derive(&token(&subject), database, &key)
            .expect("derive should succeed");
        prop_assert_eq!(derived.client(), key.as_str());
    }

    /// Property: Every derived key lives under its namespace prefix, so a
    /// prefix-scoped purge always covers exactly the caller's namespace.
    #[test]
    fn prop_derived_keys_under_namespace_prefix(
        subject in subject_strategy(),
        database in any::<u32>(),
        key in client_key_strategy(),
    ) {
        let t = token(&subject);
        let prefix = keyspace::namespace_prefix(&t, database).expect("prefix should derive");
        let derived = keyspace::derive(&t, database, &key).expect("derive should succeed");
        prop_assert!(derived.internal().starts_with(&prefix));
    }
}
