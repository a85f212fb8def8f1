//! Token and credential primitives shared by the reset flow and the user directory.

use std::sync::LazyLock;

use anyhow::{Context, Result};
use argon2::{
    Algorithm, Argon2, Params, Version,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use regex::Regex;
use sha2::{Digest, Sha256};
use tokio::task;

use crate::config::SecurityConfig;

/// Raw reset tokens carry 256 bits of entropy.
const RESET_TOKEN_BYTES: usize = 32;

static DIGIT: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[0-9]").expect("Invalid regex"));

/// Generates a URL-safe reset token from the thread-local CSPRNG.
#[must_use]
pub fn generate_reset_token() -> String {
    use rand::Rng;

    let bytes: [u8; RESET_TOKEN_BYTES] = rand::rng().random();
    URL_SAFE_NO_PAD.encode(bytes)
}

/// One-way digest used to store and look up reset tokens.
#[must_use]
pub fn hash_token(raw: &str) -> String {
    hex::encode(Sha256::digest(raw.as_bytes()))
}

/// Password policy: minimum length plus at least one digit.
pub fn validate_password(password: &str, min_length: usize) -> Result<(), String> {
    if password.chars().count() < min_length {
        return Err(format!(
            "password must be at least {min_length} characters long"
        ));
    }

    if !DIGIT.is_match(password) {
        return Err("password must contain at least one number".to_string());
    }

    Ok(())
}

/// Hash a password using Argon2id with the configured cost parameters.
pub fn hash_password_blocking(password: &str, config: &SecurityConfig) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);

    let params = Params::new(
        config.argon2_memory_cost_kib,
        config.argon2_time_cost,
        config.argon2_parallelism,
        None,
    )
    .map_err(|e| anyhow::anyhow!("Invalid Argon2 params: {e}"))?;

    let hash = Argon2::new(Algorithm::Argon2id, Version::V0x13, params)
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| anyhow::anyhow!("Failed to hash password: {e}"))?;

    Ok(hash.to_string())
}

/// Argon2 is CPU bound, so hashing runs on the blocking pool.
pub async fn hash_password(password: &str, config: &SecurityConfig) -> Result<String> {
    let password = password.to_string();
    let config = config.clone();

    task::spawn_blocking(move || hash_password_blocking(&password, &config))
        .await
        .context("Password hashing task panicked")?
}

pub async fn verify_password(password_hash: &str, password: &str) -> Result<bool> {
    let password_hash = password_hash.to_string();
    let password = password.to_string();

    task::spawn_blocking(move || {
        let parsed = PasswordHash::new(&password_hash)
            .map_err(|e| anyhow::anyhow!("Invalid password hash format: {e}"))?;

        Ok::<bool, anyhow::Error>(
            Argon2::default()
                .verify_password(password.as_bytes(), &parsed)
                .is_ok(),
        )
    })
    .await
    .context("Password verification task panicked")?
}
