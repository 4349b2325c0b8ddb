use sha3::{Digest, Sha3_256};

/// SHA3-256 of the UTF-8 bytes of `text`, as lowercase hex.
pub fn hash(text: &str) -> String {
    let mut hasher = Sha3_256::new();
    hasher.update(text.as_bytes());
    hex::encode(hasher.finalize())
}

/// Content hash of a block.
///
/// The preimage is the plain concatenation of the decimal timestamp, the
/// author, the parent hash, the hash of the payload and the decimal nonce.
/// Peers recompute this exact string, so neither the order nor the rendering
/// may change.
pub fn block_hash(timestamp: i64, author: &str, prev_hash: &str, data: &str, nonce: u32) -> String {
    let data_hash = hash(data);
    hash(&format!("{timestamp}{author}{prev_hash}{data_hash}{nonce}"))
}
