use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex};

use serde::Serialize;

use super::{Block, DIFFICULTY_TARGET, SENTINEL_HASH, meets_target};
use crate::error::{NodeError, Result};

/// The ledger is the only state shared between the miner, the writer and
/// block ingestion; every access goes through this one mutex.
pub type SharedLedger = Arc<Mutex<Ledger>>;

/// Why an ingested block was turned away. Rejections are final.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Rejection {
    DifficultyNotMet,
    Duplicate,
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rejection::DifficultyNotMet => write!(f, "difficulty not met"),
            Rejection::Duplicate => write!(f, "duplicate block"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IngestOutcome {
    /// Stored. `linked` is false while the block waits for its parent.
    Accepted { hash: String, linked: bool },
    Rejected { hash: String, reason: Rejection },
}

impl IngestOutcome {
    pub fn is_accepted(&self) -> bool {
        matches!(self, IngestOutcome::Accepted { .. })
    }

    pub fn hash(&self) -> &str {
        match self {
            IngestOutcome::Accepted { hash, .. } | IngestOutcome::Rejected { hash, .. } => hash,
        }
    }
}

/// Known-block tree plus the orphans still waiting for a parent.
#[derive(Debug)]
pub struct Ledger {
    target: String,
    known: HashMap<String, Block>,
    pending: Vec<Block>,
    tip: Option<String>,
    tip_height: i64,
}

impl Default for Ledger {
    fn default() -> Self {
        Self::with_target(DIFFICULTY_TARGET)
    }
}

impl Ledger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Empty ledger validating against a custom target (tests, local nets).
    pub fn with_target(target: &str) -> Self {
        Self {
            target: target.to_string(),
            known: HashMap::new(),
            pending: Vec::new(),
            tip: None,
            tip_height: -1,
        }
    }

    pub fn shared(self) -> SharedLedger {
        Arc::new(Mutex::new(self))
    }

    pub fn target(&self) -> &str {
        &self.target
    }

    /// Validate and store a block, then link whatever became linkable.
    pub fn ingest(&mut self, mut block: Block) -> IngestOutcome {
        block.reseal();
        let hash = block.hash.clone();

        if !meets_target(&hash, &self.target) {
            return IngestOutcome::Rejected {
                hash,
                reason: Rejection::DifficultyNotMet,
            };
        }
        if self.known.contains_key(&hash) || self.pending.iter().any(|b| b.hash == hash) {
            return IngestOutcome::Rejected {
                hash,
                reason: Rejection::Duplicate,
            };
        }

        self.pending.push(block);
        self.reconcile();

        let linked = self.known.contains_key(&hash);
        IngestOutcome::Accepted { hash, linked }
    }

    /// Promote pending blocks whose parent is known (or the sentinel),
    /// repeating until a pass resolves nothing. Returns how many moved.
    pub fn reconcile(&mut self) -> usize {
        let mut promoted = 0;
        loop {
            let resolved = self.reconcile_pass();
            if resolved == 0 {
                return promoted;
            }
            promoted += resolved;
        }
    }

    fn reconcile_pass(&mut self) -> usize {
        let mut resolvable: Vec<(usize, u64)> = Vec::new();
        for (index, block) in self.pending.iter().enumerate() {
            if block.prev_hash == SENTINEL_HASH {
                resolvable.push((index, 0));
            } else if let Some(parent_height) =
                self.known.get(&block.prev_hash).and_then(|p| p.height)
            {
                resolvable.push((index, parent_height + 1));
            }
        }

        // highest index first so earlier indexes stay valid
        let count = resolvable.len();
        for (index, height) in resolvable.into_iter().rev() {
            let mut block = self.pending.remove(index);
            block.height = Some(height);
            self.update_tip(&block);
            self.known.insert(block.hash.clone(), block);
        }
        count
    }

    fn update_tip(&mut self, block: &Block) {
        let Some(height) = block.height else {
            return;
        };
        let height = height as i64;
        if height > self.tip_height {
            self.tip_height = height;
            self.tip = Some(block.hash.clone());
        }
    }

    /// Hash miners should extend: the tip, or the sentinel when empty.
    pub fn current_tip_hash(&self) -> &str {
        self.tip.as_deref().unwrap_or(SENTINEL_HASH)
    }

    pub fn tip(&self) -> Option<&Block> {
        self.tip.as_ref().and_then(|hash| self.known.get(hash))
    }

    /// Height of the tip, -1 when nothing has been linked yet.
    pub fn tip_height(&self) -> i64 {
        self.tip_height
    }

    pub fn get(&self, hash: &str) -> Option<&Block> {
        self.known.get(hash)
    }

    pub fn known_len(&self) -> usize {
        self.known.len()
    }

    pub fn pending(&self) -> &[Block] {
        &self.pending
    }

    /// Winning chain from tip back to the genesis-level block.
    ///
    /// A parent link that is neither known nor the sentinel means the
    /// known-block set is corrupt; that is reported, never truncated.
    pub fn winning_chain(&self) -> Result<Vec<&Block>> {
        let mut chain = Vec::with_capacity(self.tip_height.max(0) as usize + 1);
        let Some(mut block) = self.tip() else {
            return Ok(chain);
        };
        loop {
            chain.push(block);
            if block.prev_hash == SENTINEL_HASH {
                return Ok(chain);
            }
            block = self
                .known
                .get(&block.prev_hash)
                .ok_or_else(|| NodeError::ChainIntegrity {
                    hash: block.hash.clone(),
                    missing_parent: block.prev_hash.clone(),
                })?;
        }
    }

    #[cfg(test)]
    pub(crate) fn known_mut(&mut self) -> &mut HashMap<String, Block> {
        &mut self.known
    }
}
