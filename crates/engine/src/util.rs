//! Internal helpers for input validation and normalization.
//!
//! These utilities are **not** part of the public API. They centralize the
//! checks shared by signup, friend and group operations.

use base64::{Engine as _, engine::general_purpose::STANDARD};
use sha2::{Digest, Sha256};
use unicode_normalization::{UnicodeNormalization, char::is_combining_mark};
use uuid::Uuid;

use crate::{EngineError, ResultEngine};

const MIN_PASSWORD_LEN: usize = 8;
const MIN_NAME_LEN: usize = 2;

/// Collapse runs of whitespace and trim. Returns `None` for blank input.
pub(crate) fn normalize_display(input: &str) -> Option<String> {
    let out = input.split_whitespace().collect::<Vec<_>>().join(" ");
    if out.is_empty() { None } else { Some(out) }
}

/// Case and accent insensitive comparison key.
pub(crate) fn normalize_key(input: &str) -> String {
    input
        .trim()
        .nfkd()
        .filter(|ch| !is_combining_mark(*ch))
        .flat_map(char::to_lowercase)
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

pub(crate) fn normalize_email(input: &str) -> String {
    input.trim().to_lowercase()
}

pub(crate) fn validate_email(email: &str) -> ResultEngine<()> {
    let valid = match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.contains('@')
                && domain
                    .split_once('.')
                    .is_some_and(|(host, tld)| !host.is_empty() && tld.len() >= 2)
                && !domain.ends_with('.')
                && !email.chars().any(char::is_whitespace)
        }
        None => false,
    };
    if !valid {
        return Err(EngineError::Validation(format!("invalid email: {email}")));
    }
    Ok(())
}

pub(crate) fn validate_name(name: &str) -> ResultEngine<()> {
    if name.chars().count() < MIN_NAME_LEN {
        return Err(EngineError::Validation(format!(
            "name must be at least {MIN_NAME_LEN} characters"
        )));
    }
    Ok(())
}

pub(crate) fn validate_password(password: &str) -> ResultEngine<()> {
    let long_enough = password.chars().count() >= MIN_PASSWORD_LEN;
    let upper = password.chars().any(char::is_uppercase);
    let lower = password.chars().any(char::is_lowercase);
    let digit = password.chars().any(|ch| ch.is_ascii_digit());
    let special = password
        .chars()
        .any(|ch| !ch.is_alphanumeric() && !ch.is_whitespace());
    if !(long_enough && upper && lower && digit && special) {
        return Err(EngineError::Validation(format!(
            "password must be at least {MIN_PASSWORD_LEN} characters and contain upper case, \
             lower case, digit and special characters"
        )));
    }
    Ok(())
}

/// SHA-256 digest of the password, base64 encoded.
pub(crate) fn hash_password(password: &str) -> String {
    STANDARD.encode(Sha256::digest(password.as_bytes()))
}

/// Parse a UUID from storage and return a labeled error on failure.
pub(crate) fn parse_uuid(value: &str, label: &str) -> ResultEngine<Uuid> {
    Uuid::parse_str(value).map_err(|_| EngineError::Decode(format!("invalid {label} id")))
}
