use std::collections::{BTreeMap, HashMap};

use ethers_core::types::{Address, H256, U256};
use tracing::{debug, info};

use crate::{
    catalog::EventGroup,
    error::NetworkError,
    eth::ChainReader,
    models::{LogEntry, TxRecord},
    report::format_eth,
};

/// What a run owes, built from every transaction attributed to a sender.
#[derive(Debug, Default, Clone)]
pub struct Reimbursements {
    /// Dedup set: each transaction is attributed once, to the first group
    /// whose logs reach it.
    pub included: HashMap<H256, TxRecord>,
    /// Detail text per sender, one block per transaction.
    pub details: BTreeMap<Address, String>,
    /// Wei owed per sender.
    pub totals: BTreeMap<Address, U256>,
}

impl Reimbursements {
    /// Sum owed across all senders; `None` past 256 bits.
    pub fn grand_total(&self) -> Option<U256> {
        self.totals
            .values()
            .try_fold(U256::zero(), |acc, amount| acc.checked_add(*amount))
    }

    fn attribute(&mut self, label: &str, log: &LogEntry, record: TxRecord) {
        let detail = self.details.entry(record.sender).or_default();
        detail.push_str(&format!(
            "Type: {}\nTxHash: 0x{:x}\nGas: {} ETH\nBlock: {}\n\n",
            label,
            log.transaction_hash,
            format_eth(record.gas_cost_wei),
            log.block_number
        ));
        self.included.insert(log.transaction_hash, record);
    }

    fn sum_totals(&mut self) -> Result<(), NetworkError> {
        self.totals.clear();
        for (hash, record) in &self.included {
            let total = self.totals.entry(record.sender).or_insert_with(U256::zero);
            *total = total
                .checked_add(record.gas_cost_wei)
                .ok_or(NetworkError::GasOverflow(*hash))?;
        }
        Ok(())
    }
}

/// Queries every group over `[from_block, to_block]` and attributes each
/// matched transaction's gas cost to its sender.
pub async fn aggregate<C: ChainReader>(
    chain: &C,
    groups: &[EventGroup],
    from_block: u64,
    to_block: u64,
) -> Result<Reimbursements, NetworkError> {
    let mut out = Reimbursements::default();

    for group in groups {
        let logs = chain.logs(from_block, to_block, group).await?;
        info!("{}: {} matching logs", group.label, logs.len());

        for log in &logs {
            if out.included.contains_key(&log.transaction_hash) {
                debug!("skipping already attributed tx 0x{:x}", log.transaction_hash);
                continue;
            }

            let record = resolve(chain, log).await?;
            debug!(
                "{}: tx 0x{:x} (block {} log {}) from {:?} cost {} wei",
                group.label,
                log.transaction_hash,
                log.block_number,
                log.log_index,
                record.sender,
                record.gas_cost_wei
            );
            out.attribute(group.label, log, record);
        }
    }

    out.sum_totals()?;
    Ok(out)
}

async fn resolve<C: ChainReader>(chain: &C, log: &LogEntry) -> Result<TxRecord, NetworkError> {
    let tx = chain.transaction(log.transaction_hash).await?;
    let sender = chain
        .transaction_sender(&tx, log.block_hash, log.transaction_index)
        .await?;
    let receipt = chain.receipt(log.transaction_hash).await?;

    let gas_cost_wei = receipt
        .effective_gas_price
        .checked_mul(receipt.gas_used)
        .ok_or(NetworkError::GasOverflow(log.transaction_hash))?;

    Ok(TxRecord {
        sender,
        gas_cost_wei,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn log(hash: u64, block: u64) -> LogEntry {
        LogEntry {
            transaction_hash: H256::from_low_u64_be(hash),
            block_hash: H256::from_low_u64_be(block),
            block_number: block,
            log_index: 0,
            transaction_index: 0,
        }
    }

    #[test]
    fn totals_sum_every_record_per_sender() {
        let alice = Address::from_low_u64_be(0xa);
        let bob = Address::from_low_u64_be(0xb);
        let mut out = Reimbursements::default();
        out.attribute(
            "multisig",
            &log(1, 10),
            TxRecord {
                sender: alice,
                gas_cost_wei: U256::from(100u64),
            },
        );
        out.attribute(
            "payouts",
            &log(2, 11),
            TxRecord {
                sender: alice,
                gas_cost_wei: U256::from(50u64),
            },
        );
        out.attribute(
            "payouts",
            &log(3, 12),
            TxRecord {
                sender: bob,
                gas_cost_wei: U256::from(7u64),
            },
        );
        out.sum_totals().unwrap();

        assert_eq!(out.totals[&alice], U256::from(150u64));
        assert_eq!(out.totals[&bob], U256::from(7u64));
        assert_eq!(out.grand_total(), Some(U256::from(157u64)));
        assert_eq!(out.details.len(), out.totals.len());
        assert_eq!(out.details[&alice].matches("Type: ").count(), 2);
    }

    #[test]
    fn sender_total_past_256_bits_is_an_error() {
        let alice = Address::from_low_u64_be(0xa);
        let mut out = Reimbursements::default();
        out.attribute(
            "multisig",
            &log(1, 10),
            TxRecord {
                sender: alice,
                gas_cost_wei: U256::MAX,
            },
        );
        out.attribute(
            "payouts",
            &log(2, 11),
            TxRecord {
                sender: alice,
                gas_cost_wei: U256::one(),
            },
        );

        let err = out.sum_totals().unwrap_err();
        assert!(matches!(err, NetworkError::GasOverflow(_)));
    }

    #[test]
    fn grand_total_past_256_bits_is_none() {
        let mut out = Reimbursements::default();
        out.totals.insert(Address::from_low_u64_be(0xa), U256::MAX);
        out.totals.insert(Address::from_low_u64_be(0xb), U256::one());
        assert_eq!(out.grand_total(), None);
    }

    #[test]
    fn detail_block_names_label_hash_gas_and_block() {
        let sender = Address::from_low_u64_be(0xa);
        let mut out = Reimbursements::default();
        out.attribute(
            "Execute multisig tx",
            &log(0xff, 42),
            TxRecord {
                sender,
                gas_cost_wei: U256::from(210_000_000_000_000u64),
            },
        );
        assert_eq!(
            out.details[&sender],
            format!(
                "Type: Execute multisig tx\nTxHash: 0x{:x}\nGas: 0.00021 ETH\nBlock: 42\n\n",
                H256::from_low_u64_be(0xff)
            )
        );
    }
}
