//! Wires ledger, miner, writer and transport into a running node.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use log::{debug, error, info, warn};

use crate::blockchain::{Block, IngestOutcome, Ledger, Rejection, SharedLedger};
use crate::config::Config;
use crate::error::{NodeError, Result};
use crate::miner::{Miner, MinerStats};
use crate::transport::{NodeMessage, Transport};
use crate::writer::ChainWriter;

/// Granularity at which sleeping activities notice the stop flag.
const STOP_POLL: Duration = Duration::from_millis(100);

pub struct Node {
    config: Config,
    ledger: SharedLedger,
    stop: Arc<AtomicBool>,
    stats: Arc<MinerStats>,
}

impl Node {
    pub fn new(config: Config) -> Self {
        Self::with_ledger(config, Ledger::new())
    }

    pub fn with_ledger(config: Config, ledger: Ledger) -> Self {
        Self {
            config,
            ledger: ledger.shared(),
            stop: Arc::new(AtomicBool::new(false)),
            stats: Arc::new(MinerStats::default()),
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn ledger(&self) -> &SharedLedger {
        &self.ledger
    }

    pub fn stats(&self) -> &MinerStats {
        &self.stats
    }

    pub fn is_stopping(&self) -> bool {
        self.stop.load(Ordering::Relaxed)
    }

    pub fn request_stop(&self) {
        self.stop.store(true, Ordering::Relaxed);
    }

    /// The ledger's write path, shared by local and peer blocks.
    pub fn ingest(&self, block: Block) -> IngestOutcome {
        let author = block.author.clone();
        let outcome = self.ledger.lock().expect("mutex poisoned").ingest(block);
        match &outcome {
            IngestOutcome::Accepted { hash, linked: true } => {
                info!("📥 Storing block {hash} from {author}");
            }
            IngestOutcome::Accepted {
                hash,
                linked: false,
            } => {
                info!("📥 Storing block {hash} from {author} (waiting for parent)");
            }
            IngestOutcome::Rejected {
                hash,
                reason: Rejection::DifficultyNotMet,
            } => {
                warn!("❌ Rejected block {hash} from {author}");
            }
            IngestOutcome::Rejected {
                hash,
                reason: Rejection::Duplicate,
            } => {
                debug!("ignoring duplicate block {hash} from {author}");
            }
        }
        outcome
    }

    /// Single entry point for messages coming off any transport.
    pub fn dispatch(&self, message: NodeMessage) -> IngestOutcome {
        match message {
            NodeMessage::IncomingBlock(block) => self.ingest(block),
        }
    }

    /// Spawn the miner (unless disabled) and the periodic chain writer.
    pub fn start(self: &Arc<Self>, transport: Arc<dyn Transport>) -> Result<NodeHandle> {
        let miner = if self.config.mining {
            let node = Arc::clone(self);
            Some(
                thread::Builder::new()
                    .name("miner".into())
                    .spawn(move || node.mine(transport.as_ref()))?,
            )
        } else {
            info!("mining disabled, running as relay");
            None
        };

        let node = Arc::clone(self);
        let writer = thread::Builder::new()
            .name("chain-writer".into())
            .spawn(move || node.write_periodically())?;

        Ok(NodeHandle {
            stop: self.stop.clone(),
            miner,
            writer,
        })
    }

    fn mine(&self, transport: &dyn Transport) {
        info!("⛏️ Mining as {}", self.config.miner_name);
        let miner = Miner::new(
            self.ledger.clone(),
            self.config.miner_name.clone(),
            self.stop.clone(),
            self.stats.clone(),
        )
        .with_preview(self.config.mining_preview);

        miner.run(|block| {
            let message = NodeMessage::IncomingBlock(block.clone());
            self.ingest(block);
            if let Err(e) = transport.broadcast(&message) {
                warn!("broadcast from {} incomplete: {e}", transport.addr());
            }
        });
        info!("miner stopped");
    }

    fn write_periodically(&self) -> Result<()> {
        let writer = ChainWriter::new(self.ledger.clone(), self.config.output_path.clone());
        while self.sleep_unless_stopped(self.config.write_interval) {
            match writer.write_once() {
                Ok(Some(records)) => debug!(
                    "wrote {records} blocks to {}",
                    writer.path().display()
                ),
                Ok(None) => {}
                Err(e @ NodeError::ChainIntegrity { .. }) => {
                    error!("{e}; shutting down");
                    self.request_stop();
                    return Err(e);
                }
                Err(e) => warn!("could not write {}: {e}", writer.path().display()),
            }
        }
        Ok(())
    }

    /// Sleep for `period`; false if the stop flag was raised meanwhile.
    fn sleep_unless_stopped(&self, period: Duration) -> bool {
        let deadline = Instant::now() + period;
        loop {
            if self.is_stopping() {
                return false;
            }
            let now = Instant::now();
            if now >= deadline {
                return true;
            }
            thread::sleep(STOP_POLL.min(deadline - now));
        }
    }
}

/// Running activities of a started node.
pub struct NodeHandle {
    stop: Arc<AtomicBool>,
    miner: Option<JoinHandle<()>>,
    writer: JoinHandle<Result<()>>,
}

impl NodeHandle {
    pub fn shutdown(&self) {
        self.stop.store(true, Ordering::Relaxed);
    }

    /// Wait for every activity to finish; surfaces the writer's fatal error.
    pub fn join(self) -> Result<()> {
        if let Some(miner) = self.miner {
            if let Err(panic) = miner.join() {
                std::panic::resume_unwind(panic);
            }
        }
        match self.writer.join() {
            Ok(result) => result,
            Err(panic) => std::panic::resume_unwind(panic),
        }
    }
}
