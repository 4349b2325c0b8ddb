//! Proof-of-work ledger node: mines blocks on the tallest known chain,
//! accepts peer blocks, and periodically dumps the winning chain.

pub mod api;
pub mod blockchain;
pub mod config;
pub mod error;
pub mod miner;
pub mod node;
pub mod transport;
pub mod writer;
