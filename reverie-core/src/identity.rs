//! Identity types for Reverie entities

use chrono::{DateTime, Utc};
use sha2::{Digest, Sha256};
use uuid::Uuid;

/// Identifier of a captured reasoning trace.
///
/// Traces are produced upstream; their IDs are accepted as given and never
/// reassigned by this subsystem.
pub type TraceId = Uuid;

/// Identifier assigned by a vector store to a persisted record.
pub type VectorId = Uuid;

/// Timestamp type using UTC timezone.
pub type Timestamp = DateTime<Utc>;

/// SHA-256 content hash for deduplication and integrity verification.
pub type ContentHash = [u8; 32];

/// Generate a new UUIDv7 identifier (timestamp-sortable).
/// UUIDv7 embeds a Unix timestamp, making IDs naturally sortable by creation time.
pub fn new_entity_id() -> Uuid {
    Uuid::now_v7()
}

/// Compute SHA-256 hash of content.
pub fn compute_content_hash(content: &[u8]) -> ContentHash {
    let mut hasher = Sha256::new();
    hasher.update(content);
    let result = hasher.finalize();
    let mut hash = [0u8; 32];
    hash.copy_from_slice(&result);
    hash
}

/// Render a content hash as lowercase hex for payloads and logs.
pub fn content_hash_hex(hash: &ContentHash) -> String {
    hex::encode(hash)
}

// =============================================================================
// TESTS
// =============================================================================
