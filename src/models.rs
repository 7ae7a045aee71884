use ethers_core::types::{Address, H256, U256};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockSummary {
    pub number: u64,
    pub timestamp: u64,
}

/// Inclusive block range every event group is queried over.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockRange {
    pub start: BlockSummary,
    pub latest: BlockSummary,
}

/// The parts of a matched log the aggregation needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogEntry {
    pub transaction_hash: H256,
    pub block_hash: H256,
    pub block_number: u64,
    pub log_index: u64,
    pub transaction_index: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReceiptGas {
    pub effective_gas_price: U256,
    pub gas_used: U256,
}

/// One reimbursable transaction, keyed by hash in the dedup set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TxRecord {
    pub sender: Address,
    pub gas_cost_wei: U256,
}
