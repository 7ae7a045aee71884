use chrono::{TimeZone, Utc};
use ethers_core::types::U256;
use ethers_core::utils::{format_ether, to_checksum};

use crate::ReimbursementRun;

pub const TITLE: &str = "JuiceboxDAO Gas Reimbursements";

/// Renders a wei amount in ether, exactly, without trailing zeros.
pub fn format_eth(wei: U256) -> String {
    let formatted = format_ether(wei);
    if !formatted.contains('.') {
        return formatted;
    }
    formatted
        .trim_end_matches('0')
        .trim_end_matches('.')
        .to_string()
}

/// RFC 1123 in UTC, e.g. `Sat, 06 Jan 2024 12:00:00 UTC`.
pub fn format_block_time(unix_secs: u64) -> String {
    match i64::try_from(unix_secs)
        .ok()
        .and_then(|secs| Utc.timestamp_opt(secs, 0).single())
    {
        Some(time) => time.format("%a, %d %b %Y %H:%M:%S UTC").to_string(),
        None => format!("unix {}", unix_secs),
    }
}

pub fn render(run: &ReimbursementRun) -> String {
    let range = &run.range;
    let mut report = format!(
        "# {}\n\nFrom {} to {} (block {} to block {})\n\n",
        TITLE,
        format_block_time(range.start.timestamp),
        format_block_time(range.latest.timestamp),
        range.start.number,
        range.latest.number
    );

    for (sender, details) in &run.reimbursements.details {
        let total = run
            .reimbursements
            .totals
            .get(sender)
            .copied()
            .unwrap_or_default();
        report.push_str(&format!(
            "## Summary for {}\n\nTotal gas to reimburse: {} ETH\n\n### Transactions\n\n",
            to_checksum(sender, None),
            format_eth(total)
        ));
        report.push_str(details);
    }

    report
}
