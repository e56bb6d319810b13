//! Hashing utilities for deterministic identifiers.
//!
//! This module provides:
//! - `ContentHash`: a full 64-character hash of arbitrary bytes
//! - `hash_bytes()`: arbitrary byte hashing
//! - `stable_id()`: a UUID-shaped id derived from a list of name parts
//!
//! Platform schemas that require ids (Dialogflow intents, entities, parameters)
//! derive them from names so that two runs over the same content produce
//! byte-identical files.

use sha2::{Digest, Sha256};

use crate::consts::STABLE_ID_HEX_LEN;

/// A full 64-character SHA256 hash.
///
/// # Format
///
/// The hash is a lowercase hexadecimal string (64 characters).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ContentHash(pub String);

/// Hash arbitrary bytes.
///
/// Returns the full 64-character SHA256 hash.
pub fn hash_bytes(data: &[u8]) -> ContentHash {
  let mut hasher = Sha256::new();
  hasher.update(data);
  ContentHash(hex::encode(hasher.finalize()))
}

/// Derive a UUID-shaped identifier from name parts.
///
/// Parts are joined with a NUL separator before hashing so that
/// `["ab", "c"]` and `["a", "bc"]` never collide.
///
/// # Example
///
/// ```
/// use voxgen_lib::util::hash::stable_id;
///
/// let id = stable_id(&["intent", "Greeting"]);
/// assert_eq!(id.len(), 36);
/// assert_eq!(id, stable_id(&["intent", "Greeting"]));
/// ```
pub fn stable_id(parts: &[&str]) -> String {
  let joined = parts.join("\0");
  let hash = hash_bytes(joined.as_bytes());
  let hex = &hash.0[..STABLE_ID_HEX_LEN];
  format!(
    "{}-{}-{}-{}-{}",
    &hex[0..8],
    &hex[8..12],
    &hex[12..16],
    &hex[16..20],
    &hex[20..32]
  )
}
