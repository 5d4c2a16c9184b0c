//! Developer utility that mints a signed bearer token.
//!
//! Usage: `generate-token <subject> [ttl-secs]`
//!
//! Reads the Ed25519 private key PEM from `STASH_AUTH_PRIVATE_KEY` and
//! prints a token the server's configured public key will accept. With no
//! TTL the token carries no expiry claim.

use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use secrecy::{ExposeSecret, SecretString};
use serde_json::json;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let mut args = std::env::args().skip(1);
    let subject = args
        .next()
        .ok_or("usage: generate-token <subject> [ttl-secs]")?;
    let ttl_secs: i64 = match args.next() {
        Some(s) => s.parse()?,
        None => 0,
    };

    let pem = SecretString::from(
        std::env::var("STASH_AUTH_PRIVATE_KEY")
            .map_err(|_| "STASH_AUTH_PRIVATE_KEY not set (PEM-encoded Ed25519 private key)")?,
    );
    let key = EncodingKey::from_ed_pem(pem.expose_secret().as_bytes())?;

    let now = chrono::Utc::now().timestamp();
    let mut claims = json!({
        "sub": subject,
        "iat": now,
        "aud": "stash",
    });
    if ttl_secs > 0 {
        claims["exp"] = json!(now + ttl_secs);
    }

    let token = encode(&Header::new(Algorithm::EdDSA), &claims, &key)?;
    println!("{token}");

    Ok(())
}
