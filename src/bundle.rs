use ethers_core::utils::to_checksum;
use serde::{Deserialize, Serialize};

use crate::{report::TITLE, ReimbursementRun};

pub const CHAIN_ID: &str = "1";

/// Batch of transfers in the shape multisig wallet front-ends import.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionBundle {
    pub chain_id: String,
    pub created_at: i64,
    pub meta: Meta,
    pub transactions: Vec<Transfer>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Meta {
    pub name: String,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transfer {
    pub to: String,
    /// Wei, as a plain decimal integer.
    pub value: String,
}

impl TransactionBundle {
    /// One transfer per sender owed anything, stamped with `created_at`.
    pub fn build(run: &ReimbursementRun, created_at: i64) -> Self {
        let transactions = run
            .reimbursements
            .totals
            .iter()
            .map(|(sender, wei)| Transfer {
                to: to_checksum(sender, None),
                value: wei.to_string(),
            })
            .collect();

        Self {
            chain_id: CHAIN_ID.to_string(),
            created_at,
            meta: Meta {
                name: TITLE.to_string(),
                description: format!(
                    "Gas reimbursements from block {} to {}",
                    run.range.start.number, run.range.latest.number
                ),
            },
            transactions,
        }
    }

    pub fn to_json(&self) -> serde_json::Result<Vec<u8>> {
        serde_json::to_vec(self)
    }
}
