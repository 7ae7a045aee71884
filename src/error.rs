use std::path::PathBuf;
use std::time::Duration;

use ethers_core::types::H256;
use ethers_providers::ProviderError;

use crate::config::ConfigError;

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Network(#[from] NetworkError),
    #[error("failed to write {path:?}: {source}")]
    FileWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to encode transaction bundle: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Anything that goes wrong while talking to the node.
#[derive(thiserror::Error, Debug)]
pub enum NetworkError {
    #[error("{method} failed: {source}")]
    Rpc {
        method: &'static str,
        #[source]
        source: ProviderError,
    },
    #[error("{method} issued after the {budget:?} request budget ran out")]
    Timeout {
        method: &'static str,
        budget: Duration,
    },
    #[error("{what} {id} not found")]
    NotFound { what: &'static str, id: String },
    #[error("block {id} is missing its {field}")]
    IncompleteBlock { id: String, field: &'static str },
    #[error("node returned an out-of-range {field}")]
    OutOfRange { field: &'static str },
    #[error("log is missing its {0}")]
    IncompleteLog(&'static str),
    #[error("receipt for {hash:?} is missing its {field}")]
    IncompleteReceipt { hash: H256, field: &'static str },
    #[error("transaction at index {index} of block {block_hash:?} is {found:?}, expected {expected:?}")]
    SenderMismatch {
        block_hash: H256,
        index: u64,
        expected: H256,
        found: H256,
    },
    #[error("gas cost of {0:?} overflows 256 bits")]
    GasOverflow(H256),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
