use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};

use chrono::DateTime;

use crate::blockchain::{Block, SharedLedger};
use crate::error::Result;

const BORDER_WIDTH: usize = 83;

/// Dumps the winning chain, tip first, to a plain-text file.
pub struct ChainWriter {
    ledger: SharedLedger,
    path: PathBuf,
}

impl ChainWriter {
    pub fn new(ledger: SharedLedger, path: impl Into<PathBuf>) -> Self {
        Self {
            ledger,
            path: path.into(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Overwrite the output file with the current winning chain.
    ///
    /// Returns the number of records written, or `None` when the ledger has
    /// no tip yet (the file is left untouched).
    pub fn write_once(&self) -> Result<Option<usize>> {
        let (text, records) = {
            let ledger = self.ledger.lock().expect("mutex poisoned");
            let chain = ledger.winning_chain()?;
            if chain.is_empty() {
                return Ok(None);
            }
            (render(&chain), chain.len())
        };
        fs::write(&self.path, text)?;
        Ok(Some(records))
    }
}

/// ctime-style rendering of a Unix timestamp, in UTC.
pub fn human_time(timestamp: i64) -> String {
    DateTime::from_timestamp(timestamp, 0)
        .map(|dt| dt.format("%a %b %e %H:%M:%S %Y").to_string())
        .unwrap_or_else(|| "invalid timestamp".to_string())
}

/// One bordered record per block, in the order given.
pub fn render(chain: &[&Block]) -> String {
    let border = "-".repeat(BORDER_WIDTH);
    let mut out = String::new();
    for block in chain {
        let height = block
            .height
            .map_or_else(|| "unknown".to_string(), |h| h.to_string());
        // writing into a String cannot fail
        let _ = writeln!(out, "{border}");
        let _ = writeln!(out, "| hash:       | {}", block.hash);
        let _ = writeln!(out, "| height:     | {height}");
        let _ = writeln!(
            out,
            "| timestamp:  | {} ({})",
            block.timestamp,
            human_time(block.timestamp)
        );
        let _ = writeln!(out, "| author:     | {}", block.author);
        let _ = writeln!(out, "| prev_hash:  | {}", block.prev_hash);
        let _ = writeln!(out, "| data:       | {}", block.data);
        let _ = writeln!(out, "{border}");
    }
    out
}
