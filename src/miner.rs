use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::{Duration, Instant};

use log::info;
use serde::Serialize;

use crate::blockchain::{Block, REPORT_EVERY, SharedLedger, meets_target};

/// Counters surfaced through the stats endpoint. Informational only.
#[derive(Debug, Default)]
pub struct MinerStats {
    hashes: AtomicU64,
    blocks_found: AtomicU64,
    hashrate: AtomicU64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MinerStatsSnapshot {
    pub hashes: u64,
    pub blocks_found: u64,
    /// Hashes per second at the last report.
    pub hashrate: u64,
}

impl MinerStats {
    pub fn snapshot(&self) -> MinerStatsSnapshot {
        MinerStatsSnapshot {
            hashes: self.hashes.load(Ordering::Relaxed),
            blocks_found: self.blocks_found.load(Ordering::Relaxed),
            hashrate: self.hashrate.load(Ordering::Relaxed),
        }
    }
}

/// `count` events per second over `elapsed`; the raw count under one second.
pub fn rate(count: u64, elapsed: Duration) -> f64 {
    let secs = elapsed.as_secs_f64();
    if secs < 1.0 {
        count as f64
    } else {
        count as f64 / secs
    }
}

/// Proof-of-work search that always extends the ledger's current tip.
pub struct Miner {
    ledger: SharedLedger,
    author: String,
    target: String,
    stop: Arc<AtomicBool>,
    stats: Arc<MinerStats>,
    preview: bool,
}

impl Miner {
    pub fn new(
        ledger: SharedLedger,
        author: impl Into<String>,
        stop: Arc<AtomicBool>,
        stats: Arc<MinerStats>,
    ) -> Self {
        let target = ledger.lock().expect("mutex poisoned").target().to_string();
        Self {
            ledger,
            author: author.into(),
            target,
            stop,
            stats,
            preview: true,
        }
    }

    pub fn with_preview(mut self, preview: bool) -> Self {
        self.preview = preview;
        self
    }

    fn tip_hash(&self) -> String {
        self.ledger
            .lock()
            .expect("mutex poisoned")
            .current_tip_hash()
            .to_string()
    }

    fn stopping(&self) -> bool {
        self.stop.load(Ordering::Relaxed)
    }

    /// Move the candidate onto the current tip and try a fresh nonce.
    fn next_attempt(&self, block: &mut Block) {
        block.retarget(&self.tip_hash());
        block.reseed_nonce();
    }

    /// Search for a block on top of the current tip.
    ///
    /// Returns `None` once the stop flag is raised. After every miss the
    /// candidate is moved onto whatever tip the ledger holds now, so work
    /// never continues on a branch that has already been beaten.
    pub fn find_block(&self) -> Option<Block> {
        let mut block = Block::new(self.author.as_str(), self.tip_hash(), "");
        let started = Instant::now();
        let mut attempts: u64 = 0;

        while !meets_target(&block.hash, &self.target) {
            if self.stopping() {
                return None;
            }
            self.next_attempt(&mut block);
            attempts += 1;
            self.stats.hashes.fetch_add(1, Ordering::Relaxed);

            if attempts % REPORT_EVERY == 0 {
                let hashrate = rate(attempts, started.elapsed());
                self.stats.hashrate.store(hashrate as u64, Ordering::Relaxed);
                if self.preview {
                    info!("{} Kilohashes / second", (hashrate / 1000.0) as u64);
                }
            }
        }
        Some(block)
    }

    /// Mine until stopped, handing every found block to `on_found`.
    pub fn run<F>(&self, mut on_found: F)
    where
        F: FnMut(Block),
    {
        let started = Instant::now();
        let mut found: u64 = 0;

        while !self.stopping() {
            let Some(block) = self.find_block() else {
                return;
            };
            found += 1;
            self.stats.blocks_found.fetch_add(1, Ordering::Relaxed);
            let per_hour = rate(found, started.elapsed()) * 3600.0;
            info!("Valid block {} found! {} blocks / hour", block.hash, per_hour as u64);
            on_found(block);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blockchain::{Ledger, SENTINEL_HASH};
    use std::thread;

    const EASY: &str = "ffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffff";
    const IMPOSSIBLE: &str = "0000000000000000000000000000000000000000000000000000000000000000";

    fn miner(ledger: &SharedLedger, stop: &Arc<AtomicBool>) -> Miner {
        Miner::new(ledger.clone(), "tester", stop.clone(), Arc::default()).with_preview(false)
    }

    #[test]
    fn rate_handles_sub_second_elapsed() {
        assert_eq!(rate(5000, Duration::from_millis(0)), 5000.0);
        assert_eq!(rate(10, Duration::from_secs(5)), 2.0);
    }

    #[test]
    fn found_block_extends_current_tip() {
        let ledger = Ledger::with_target(EASY).shared();
        let stop = Arc::new(AtomicBool::new(false));
        let m = miner(&ledger, &stop);

        let genesis = m.find_block().expect("easy target");
        assert_eq!(genesis.prev_hash, SENTINEL_HASH);
        assert_eq!(genesis.author, "tester");
        assert_eq!(genesis.data, "");
        ledger.lock().expect("mutex poisoned").ingest(genesis.clone());

        let next = m.find_block().expect("easy target");
        assert_eq!(next.prev_hash, genesis.hash);
    }

    #[test]
    fn stop_before_search_returns_nothing() {
        let ledger = Ledger::with_target(IMPOSSIBLE).shared();
        let stop = Arc::new(AtomicBool::new(true));
        assert!(miner(&ledger, &stop).find_block().is_none());
    }

    #[test]
    fn stop_mid_search_returns_nothing() {
        let ledger = Ledger::with_target(IMPOSSIBLE).shared();
        let stop = Arc::new(AtomicBool::new(false));
        let stats = Arc::new(MinerStats::default());
        let m = Miner::new(ledger, "tester", stop.clone(), stats.clone()).with_preview(false);

        let search = thread::spawn(move || m.find_block());
        thread::sleep(Duration::from_millis(50));
        stop.store(true, Ordering::Relaxed);

        assert!(search.join().expect("miner thread").is_none());
        assert!(stats.snapshot().hashes > 0);
        assert_eq!(stats.snapshot().blocks_found, 0);
    }

    #[test]
    fn search_follows_tip_found_by_others() {
        let ledger = Ledger::with_target(EASY).shared();
        let stop = Arc::new(AtomicBool::new(false));
        let m = miner(&ledger, &stop);

        let mut candidate = Block::new("tester", m.tip_hash(), "");
        assert_eq!(candidate.prev_hash, SENTINEL_HASH);

        let other = Block::with_timestamp(1, "peer", SENTINEL_HASH, "");
        ledger.lock().expect("mutex poisoned").ingest(other.clone());

        m.next_attempt(&mut candidate);
        assert_eq!(candidate.prev_hash, other.hash);
        assert_eq!(candidate.hash, candidate.compute_hash());
    }

    #[test]
    fn run_chains_blocks_until_stopped() {
        let ledger = Ledger::with_target(EASY).shared();
        let stop = Arc::new(AtomicBool::new(false));
        let stats = Arc::new(MinerStats::default());
        let m = Miner::new(ledger.clone(), "tester", stop.clone(), stats.clone())
            .with_preview(false);

        let mut found = 0;
        m.run(|block| {
            ledger.lock().expect("mutex poisoned").ingest(block);
            found += 1;
            if found == 3 {
                stop.store(true, Ordering::Relaxed);
            }
        });

        let guard = ledger.lock().expect("mutex poisoned");
        assert_eq!(guard.tip_height(), 2);
        assert_eq!(guard.winning_chain().expect("linked").len(), 3);
        assert_eq!(stats.snapshot().blocks_found, 3);
    }
}
