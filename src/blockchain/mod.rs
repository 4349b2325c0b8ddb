pub mod block;
pub mod hasher;
pub mod ledger;

pub use block::Block;
pub use ledger::{IngestOutcome, Ledger, Rejection, SharedLedger};

/// Parent hash of a genesis-level block (64 hex zeros).
pub const SENTINEL_HASH: &str = "0000000000000000000000000000000000000000000000000000000000000000";

/// Inclusive upper bound a block hash must not exceed. Every cooperating
/// node must use the same value or they silently stop accepting each
/// other's blocks.
pub const DIFFICULTY_TARGET: &str =
    "000000ffffffffffffffffffffffffffffffffffffffffffffffffffffffffff";

/// Largest nonce drawn when seeding or reseeding a block.
pub const MAX_NONCE: u32 = 0x7FFF_FFFF;

/// How many attempts between two hashrate reports.
pub const REPORT_EVERY: u64 = 5000;

/// Returns true when `hash` is at or below `target`.
///
/// Both values are fixed-length lowercase hex, so the lexicographic order
/// matches the numeric one.
pub fn meets_target(hash: &str, target: &str) -> bool {
    hash.len() == target.len() && hash <= target
}
