use std::sync::Arc;

use serde::Serialize;

use crate::blockchain::{Block, Rejection};
use crate::miner::MinerStatsSnapshot;
use crate::node::Node;

/// Shared application state: the running node.
pub struct AppState {
    pub node: Arc<Node>,
}

impl AppState {
    pub fn new(node: Arc<Node>) -> Self {
        Self { node }
    }
}

/* ---------- Block ingestion ---------- */

#[derive(Serialize)]
pub struct IngestResponse {
    pub accepted: bool,
    pub hash: String,
    /// Whether the block is already linked into the known-block tree.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub linked: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<Rejection>,
}

/* ---------- Chain API Models ---------- */

#[derive(Serialize)]
pub struct ChainResponse<'a> {
    pub height: i64,
    pub blocks: Vec<&'a Block>,
}

#[derive(Serialize)]
pub struct TipResponse {
    pub hash: String,
    pub height: i64,
}

#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

/* ---------- Stats ---------- */

#[derive(Serialize)]
pub struct StatsResponse {
    pub miner_name: String,
    pub mining: bool,
    pub tip_height: i64,
    pub known_blocks: usize,
    pub pending_blocks: usize,
    pub difficulty_target: String,
    pub miner: MinerStatsSnapshot,
}
