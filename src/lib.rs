//! Gas reimbursements for transactions that triggered a fixed set of
//! contract events: a text report plus a multisig transfer bundle.

pub mod aggregate;
pub mod bundle;
pub mod catalog;
pub mod config;
pub mod error;
pub mod eth;
pub mod models;
pub mod report;

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing::info;

use crate::{
    aggregate::Reimbursements,
    bundle::TransactionBundle,
    catalog::EventGroup,
    config::Config,
    error::{Error, NetworkError, Result},
    eth::{ChainReader, EthClient},
    models::BlockRange,
};

/// Everything gathered from the chain in one run.
#[derive(Debug, Clone)]
pub struct ReimbursementRun {
    pub range: BlockRange,
    pub reimbursements: Reimbursements,
}

/// Fixes the block range, then aggregates every group over it.
pub async fn collect<C: ChainReader>(
    chain: &C,
    groups: &[EventGroup],
    start_block: u64,
) -> Result<ReimbursementRun, NetworkError> {
    let start = chain.block(Some(start_block)).await?;
    let latest = chain.block(None).await?;
    info!("scanning blocks {} to {}", start.number, latest.number);

    let reimbursements = aggregate::aggregate(chain, groups, start.number, latest.number).await?;

    Ok(ReimbursementRun {
        range: BlockRange { start, latest },
        reimbursements,
    })
}

/// Collects, renders, and only then writes both output files.
pub async fn execute<C: ChainReader>(
    chain: &C,
    config: &Config,
    groups: &[EventGroup],
) -> Result<ReimbursementRun> {
    let run = collect(chain, groups, config.start_block).await?;

    let report = report::render(&run);
    let bundle = TransactionBundle::build(&run, chrono::Utc::now().timestamp()).to_json()?;

    let total = run
        .reimbursements
        .grand_total()
        .map(report::format_eth)
        .unwrap_or_else(|| "more than 2^256 wei".to_string());
    info!(
        "{} transactions from {} senders, {} ETH total",
        run.reimbursements.included.len(),
        run.reimbursements.totals.len(),
        total
    );

    write_outputs(&[
        (config.bundle_path.as_path(), bundle.as_slice()),
        (config.report_path.as_path(), report.as_bytes()),
    ])?;
    Ok(run)
}

/// Runs against the node at `config.rpc_url` with the built-in catalog.
pub async fn run(config: &Config) -> Result<ReimbursementRun> {
    let groups = catalog::event_groups()?;
    let client = EthClient::new(&config.rpc_url, config.rpc_timeout)?;
    execute(&client, config, &groups).await
}

/// Writes every output to a sibling staging file first and only moves them
/// into place once all of them are written, so a failed run never leaves
/// a new file next to a stale one.
fn write_outputs(outputs: &[(&Path, &[u8])]) -> Result<()> {
    let mut staged: Vec<(PathBuf, &Path)> = Vec::with_capacity(outputs.len());

    for &(path, contents) in outputs {
        let staging = staging_path(path);
        let written = if path.is_dir() {
            Err(io::Error::new(io::ErrorKind::Other, "destination is a directory"))
        } else {
            fs::write(&staging, contents)
        };
        if let Err(source) = written {
            let _ = fs::remove_file(&staging);
            discard(&staged);
            return Err(Error::FileWrite {
                path: path.to_path_buf(),
                source,
            });
        }
        staged.push((staging, path));
    }

    for (staging, path) in &staged {
        fs::rename(staging, path).map_err(|source| {
            discard(&staged);
            Error::FileWrite {
                path: path.to_path_buf(),
                source,
            }
        })?;
        info!("wrote {}", path.display());
    }
    Ok(())
}

fn staging_path(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    path.with_file_name(format!(".{}.tmp", name))
}

fn discard(staged: &[(PathBuf, &Path)]) {
    for (staging, _) in staged {
        let _ = fs::remove_file(staging);
    }
}
