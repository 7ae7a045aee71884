use std::path::Path;
use std::process::ExitCode;

use anyhow::Context;

use gas_reimbursements::config::{self, Config};

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    init_tracing();

    match try_main().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!("{:#}", err);
            ExitCode::FAILURE
        }
    }
}

async fn try_main() -> anyhow::Result<()> {
    config::load_env_file(Path::new(".env")).context("failed to load .env")?;
    let config = Config::from_env().context("failed to load configuration")?;

    gas_reimbursements::run(&config)
        .await
        .context("gas reimbursement run failed")?;
    Ok(())
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();
}
