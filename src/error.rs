use thiserror::Error;

use crate::transport::TransportError;

pub type Result<T> = std::result::Result<T, NodeError>;

/// Fatal node errors. Rejected blocks are not errors, see `IngestOutcome`.
#[derive(Debug, Error)]
pub enum NodeError {
    /// `MINER_NAME` is unset or blank.
    #[error("miner identity not configured: set MINER_NAME")]
    MissingIdentity,

    #[error("invalid value for {key}: {value:?}")]
    InvalidConfig { key: &'static str, value: String },

    /// The known-block set links to a parent it does not contain.
    #[error("chain integrity violation: block {hash} points to unknown parent {missing_parent}")]
    ChainIntegrity {
        hash: String,
        missing_parent: String,
    },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Transport(#[from] TransportError),
}
