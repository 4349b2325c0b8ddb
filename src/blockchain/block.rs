use chrono::Utc;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::{MAX_NONCE, hasher};

/// A single sealed block. Only `nonce`/`hash` move while mining and
/// `height` is filled in once the ledger links the block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Block {
    pub timestamp: i64, // Unix timestamp (UTC)
    pub author: String,
    pub prev_hash: String,
    pub data: String,
    pub nonce: u32,
    /// Cached hash of the block. Never trusted when received.
    #[serde(default)]
    pub hash: String,
    /// Position in the known-block tree, `None` until linked.
    #[serde(default)]
    pub height: Option<u64>,
}

impl Block {
    /// Create a block stamped with the current time and a random nonce.
    pub fn new(author: impl Into<String>, prev_hash: impl Into<String>, data: impl Into<String>) -> Self {
        Self::with_timestamp(Utc::now().timestamp(), author, prev_hash, data)
    }

    pub fn with_timestamp(
        timestamp: i64,
        author: impl Into<String>,
        prev_hash: impl Into<String>,
        data: impl Into<String>,
    ) -> Self {
        let mut block = Self {
            timestamp,
            author: author.into(),
            prev_hash: prev_hash.into(),
            data: data.into(),
            nonce: 0,
            hash: String::new(),
            height: None,
        };
        block.reseed_nonce();
        block
    }

    /// Compute the hash of this block from its fields (excluding `hash`
    /// and `height`).
    pub fn compute_hash(&self) -> String {
        hasher::block_hash(
            self.timestamp,
            &self.author,
            &self.prev_hash,
            &self.data,
            self.nonce,
        )
    }

    /// Draw a fresh nonce in `[0, MAX_NONCE]` and refresh the cached hash.
    pub fn reseed_nonce(&mut self) {
        self.nonce = rand::thread_rng().gen_range(0..=MAX_NONCE);
        self.hash = self.compute_hash();
    }

    /// Point the candidate at another parent. The hash is stale afterwards
    /// until the next `reseed_nonce`.
    pub fn retarget(&mut self, prev_hash: &str) {
        if self.prev_hash != prev_hash {
            self.prev_hash = prev_hash.to_string();
        }
    }

    /// Drop any caller-supplied hash/height and recompute from content.
    pub fn reseal(&mut self) {
        self.hash = self.compute_hash();
        self.height = None;
    }
}

#[cfg(test)]
mod tests {
    use super::Block;
    use crate::blockchain::{MAX_NONCE, SENTINEL_HASH};

    #[test]
    fn new_block_has_valid_hash() {
        let b = Block::new("alice", SENTINEL_HASH, "");
        assert_eq!(b.hash, b.compute_hash());
        assert!(b.nonce <= MAX_NONCE);
        assert_eq!(b.height, None);
    }

    #[test]
    fn reseed_changes_nonce_and_hash() {
        let mut b = Block::with_timestamp(10, "alice", SENTINEL_HASH, "");
        let (old_nonce, old_hash) = (b.nonce, b.hash.clone());
        // two identical draws in a row are possible, so retry a few times
        for _ in 0..8 {
            b.reseed_nonce();
            if b.nonce != old_nonce {
                break;
            }
        }
        assert_ne!(b.nonce, old_nonce);
        assert_ne!(b.hash, old_hash);
        assert_eq!(b.hash, b.compute_hash());
    }

    #[test]
    fn tampered_hash_is_replaced_on_reseal() {
        let mut b = Block::with_timestamp(10, "alice", SENTINEL_HASH, "x");
        let real = b.hash.clone();
        b.hash = "0".repeat(64);
        b.height = Some(99);
        b.reseal();
        assert_eq!(b.hash, real);
        assert_eq!(b.height, None);
    }

    #[test]
    fn retarget_then_reseed_links_new_parent() {
        let mut b = Block::with_timestamp(10, "alice", SENTINEL_HASH, "");
        let parent = "ab".repeat(32);
        b.retarget(&parent);
        b.reseed_nonce();
        assert_eq!(b.prev_hash, parent);
        assert_eq!(b.hash, b.compute_hash());
    }

    #[test]
    fn deserializes_without_derived_fields() {
        let json = r#"{"timestamp":5,"author":"bob","prev_hash":"00","data":"d","nonce":3}"#;
        let b: Block = serde_json::from_str(json).expect("valid json");
        assert!(b.hash.is_empty());
        assert_eq!(b.height, None);
        assert_eq!(b.nonce, 3);
    }
}
