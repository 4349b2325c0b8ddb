//! How blocks travel between nodes.
//!
//! Nodes exchange exactly one kind of message, a block announcement, and
//! every implementation hands received messages to `Node::dispatch`.

mod http;
mod local;

pub use http::HttpTransport;
pub use local::LocalTransport;

use serde::{Deserialize, Serialize};

use crate::blockchain::Block;

/// Errors that can occur while delivering a message to peers.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("peer not found: {0}")]
    PeerNotFound(String),

    #[error("failed to send message to {0}")]
    SendFailed(String),

    #[error("http client error: {0}")]
    Http(#[from] reqwest::Error),
}

/// Wire message: `{"kind": "incoming_block", "payload": {...}}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "payload", rename_all = "snake_case")]
pub enum NodeMessage {
    IncomingBlock(Block),
}

impl NodeMessage {
    pub fn block(&self) -> &Block {
        match self {
            NodeMessage::IncomingBlock(block) => block,
        }
    }
}

/// Outbound side of the peer network.
pub trait Transport: Send + Sync {
    /// Send `message` to every known peer. Every peer is attempted even
    /// when an earlier one fails; the first failure is returned.
    fn broadcast(&self, message: &NodeMessage) -> Result<(), TransportError>;

    /// Address this node is reachable at.
    fn addr(&self) -> String;
}
