use std::future::Future;
use std::time::Duration;

use ethers_core::types::{
    Address, BlockId, BlockNumber, Filter, Log, Transaction, ValueOrArray, H256, U256, U64,
};
use ethers_providers::{Http, JsonRpcClient, Middleware, Provider, ProviderError};
use tokio::time::Instant;
use url::Url;

use crate::{
    catalog::EventGroup,
    config::ConfigError,
    error::NetworkError,
    models::{BlockSummary, LogEntry, ReceiptGas},
};

/// Read access to the chain, as much as the reimbursement run needs.
///
/// [`EthClient`] talks to a JSON-RPC node; tests plug in an in-memory chain.
#[allow(async_fn_in_trait)]
pub trait ChainReader {
    /// Block `number`, or the latest block for `None`.
    async fn block(&self, number: Option<u64>) -> Result<BlockSummary, NetworkError>;

    async fn logs(
        &self,
        from_block: u64,
        to_block: u64,
        group: &EventGroup,
    ) -> Result<Vec<LogEntry>, NetworkError>;

    async fn transaction(&self, hash: H256) -> Result<Transaction, NetworkError>;

    /// Resolves who paid for `tx`, given the block it was seen in and its
    /// index there.
    async fn transaction_sender(
        &self,
        tx: &Transaction,
        block_hash: H256,
        index: u64,
    ) -> Result<Address, NetworkError>;

    async fn receipt(&self, hash: H256) -> Result<ReceiptGas, NetworkError>;
}

#[derive(Clone)]
pub struct EthClient<P = Http> {
    provider: Provider<P>,
    deadline: Instant,
    budget: Duration,
}

impl EthClient<Http> {
    /// Every request made through the returned client must finish within
    /// `budget` of this call.
    pub fn new(rpc_url: &str, budget: Duration) -> Result<Self, ConfigError> {
        let url = Url::parse(rpc_url).map_err(|source| ConfigError::InvalidRpcUrl {
            url: rpc_url.to_string(),
            source,
        })?;
        let client = reqwest::Client::builder()
            .no_proxy()
            .build()
            .map_err(ConfigError::HttpClient)?;
        let transport = Http::new_with_client(url, client);
        Ok(Self::with_provider(Provider::new(transport), budget))
    }
}

impl<P: JsonRpcClient> EthClient<P> {
    pub fn with_provider(provider: Provider<P>, budget: Duration) -> Self {
        Self {
            provider,
            deadline: Instant::now() + budget,
            budget,
        }
    }

    async fn call<T, F>(&self, method: &'static str, request: F) -> Result<T, NetworkError>
    where
        F: Future<Output = Result<T, ProviderError>>,
    {
        within_deadline(self.deadline, self.budget, method, request).await
    }
}

async fn within_deadline<T, F>(
    deadline: Instant,
    budget: Duration,
    method: &'static str,
    request: F,
) -> Result<T, NetworkError>
where
    F: Future<Output = Result<T, ProviderError>>,
{
    match tokio::time::timeout_at(deadline, request).await {
        Ok(result) => result.map_err(|source| NetworkError::Rpc { method, source }),
        Err(_) => Err(NetworkError::Timeout { method, budget }),
    }
}

impl<P: JsonRpcClient> ChainReader for EthClient<P> {
    async fn block(&self, number: Option<u64>) -> Result<BlockSummary, NetworkError> {
        let (id, label) = match number {
            Some(n) => (BlockNumber::Number(n.into()), n.to_string()),
            None => (BlockNumber::Latest, "latest".to_string()),
        };
        let block = self
            .call("eth_getBlockByNumber", self.provider.get_block(BlockId::Number(id)))
            .await?
            .ok_or_else(|| NetworkError::NotFound {
                what: "block",
                id: label.clone(),
            })?;
        let number = block.number.ok_or_else(|| NetworkError::IncompleteBlock {
            id: label,
            field: "number",
        })?;
        Ok(BlockSummary {
            number: number.as_u64(),
            timestamp: to_u64(block.timestamp, "block timestamp")?,
        })
    }

    async fn logs(
        &self,
        from_block: u64,
        to_block: u64,
        group: &EventGroup,
    ) -> Result<Vec<LogEntry>, NetworkError> {
        let filter = group_filter(from_block, to_block, group);
        let logs = self.call("eth_getLogs", self.provider.get_logs(&filter)).await?;
        logs.into_iter().map(log_entry).collect()
    }

    async fn transaction(&self, hash: H256) -> Result<Transaction, NetworkError> {
        self.call("eth_getTransactionByHash", self.provider.get_transaction(hash))
            .await?
            .ok_or_else(|| NetworkError::NotFound {
                what: "transaction",
                id: format!("0x{:x}", hash),
            })
    }

    async fn transaction_sender(
        &self,
        tx: &Transaction,
        block_hash: H256,
        index: u64,
    ) -> Result<Address, NetworkError> {
        // The node already reported the sender for this inclusion.
        if tx.block_hash == Some(block_hash) {
            return Ok(tx.from);
        }

        let located = self
            .call(
                "eth_getTransactionByBlockHashAndIndex",
                self.provider
                    .get_transaction_by_block_and_index(block_hash, U64::from(index)),
            )
            .await?
            .ok_or_else(|| NetworkError::NotFound {
                what: "transaction",
                id: format!("0x{:x}#{}", block_hash, index),
            })?;

        if located.hash != tx.hash {
            return Err(NetworkError::SenderMismatch {
                block_hash,
                index,
                expected: tx.hash,
                found: located.hash,
            });
        }
        Ok(located.from)
    }

    async fn receipt(&self, hash: H256) -> Result<ReceiptGas, NetworkError> {
        let receipt = self
            .call(
                "eth_getTransactionReceipt",
                self.provider.get_transaction_receipt(hash),
            )
            .await?
            .ok_or_else(|| NetworkError::NotFound {
                what: "receipt",
                id: format!("0x{:x}", hash),
            })?;

        let effective_gas_price =
            receipt
                .effective_gas_price
                .ok_or(NetworkError::IncompleteReceipt {
                    hash,
                    field: "effectiveGasPrice",
                })?;
        let gas_used = receipt.gas_used.ok_or(NetworkError::IncompleteReceipt {
            hash,
            field: "gasUsed",
        })?;

        Ok(ReceiptGas {
            effective_gas_price,
            gas_used,
        })
    }
}

/// Builds the `eth_getLogs` filter for one event group.
pub fn group_filter(from_block: u64, to_block: u64, group: &EventGroup) -> Filter {
    let mut filter = Filter::new()
        .from_block(from_block)
        .to_block(to_block)
        .address(group.addresses.clone());

    for (slot, position) in filter.topics.iter_mut().zip(&group.topics) {
        *slot = if position.is_empty() {
            None
        } else {
            Some(ValueOrArray::Array(
                position.iter().copied().map(Some).collect(),
            ))
        };
    }
    filter
}

fn to_u64(value: U256, field: &'static str) -> Result<u64, NetworkError> {
    u64::try_from(value).map_err(|_| NetworkError::OutOfRange { field })
}

fn log_entry(log: Log) -> Result<LogEntry, NetworkError> {
    Ok(LogEntry {
        transaction_hash: log
            .transaction_hash
            .ok_or(NetworkError::IncompleteLog("transactionHash"))?,
        block_hash: log
            .block_hash
            .ok_or(NetworkError::IncompleteLog("blockHash"))?,
        block_number: log
            .block_number
            .ok_or(NetworkError::IncompleteLog("blockNumber"))?
            .as_u64(),
        log_index: to_u64(
            log.log_index
                .ok_or(NetworkError::IncompleteLog("logIndex"))?,
            "logIndex",
        )?,
        transaction_index: log
            .transaction_index
            .ok_or(NetworkError::IncompleteLog("transactionIndex"))?
            .as_u64(),
    })
}
