use serde::Serialize;

use crate::Result;

/// Serialize an entity into the canonical payload text stored in
/// snapshot rows. serde_json keeps object keys sorted, so byte equality
/// of two payloads means the underlying entities are equal — the dedup
/// check in the snapshot store relies on this.
pub fn canonical_json<T: Serialize>(value: &T) -> Result<String> {
    Ok(serde_json::to_string(value)?)
}
