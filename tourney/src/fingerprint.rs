//! Stable fingerprints of generation requests.

use serde::Serialize;
use sha2::{Digest, Sha256};

use crate::errors::BracketResult;

/// Hex SHA-256 of the bincode encoding of a value
///
/// Generation is a pure function of its request, so equal fingerprints mean
/// equal output and can be used as a cache key.
///
/// # Errors
///
/// * `Encode` - the value could not be encoded
pub fn fingerprint<T: Serialize>(value: &T) -> BracketResult<String> {
    let bytes = bincode::serde::encode_to_vec(value, bincode::config::standard())?;
    Ok(hex::encode(Sha256::digest(&bytes)))
}
