use std::env;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// First block scanned for reimbursable events.
pub const START_BLOCK: u64 = 18_949_176;
pub const REPORT_PATH: &str = "report.txt";
pub const BUNDLE_PATH: &str = "bundle.json";
/// Budget shared by every RPC request of a run, not per request.
pub const RPC_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Clone)]
pub struct Config {
    pub rpc_url: String,
    pub start_block: u64,
    pub report_path: PathBuf,
    pub bundle_path: PathBuf,
    pub rpc_timeout: Duration,
}

#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error("RPC_URL not set")]
    MissingRpcUrl,
    #[error("invalid RPC_URL {url:?}: {source}")]
    InvalidRpcUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },
    #[error("failed to build HTTP client: {0}")]
    HttpClient(#[source] reqwest::Error),
    #[error("failed to load env file {path:?}: {source}")]
    EnvFile {
        path: PathBuf,
        #[source]
        source: dotenvy::Error,
    },
    #[error("malformed catalog entry {value:?} in group {group:?}")]
    Catalog { group: &'static str, value: &'static str },
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let rpc_url = lookup("RPC_URL")
            .map(|url| url.trim().to_string())
            .filter(|url| !url.is_empty())
            .ok_or(ConfigError::MissingRpcUrl)?;

        Ok(Self {
            rpc_url,
            start_block: START_BLOCK,
            report_path: PathBuf::from(REPORT_PATH),
            bundle_path: PathBuf::from(BUNDLE_PATH),
            rpc_timeout: RPC_TIMEOUT,
        })
    }

    /// Points both output files into `dir`, keeping their names.
    pub fn with_output_dir(mut self, dir: &Path) -> Self {
        self.report_path = dir.join(REPORT_PATH);
        self.bundle_path = dir.join(BUNDLE_PATH);
        self
    }
}

/// Loads `path` into the process environment when it exists.
///
/// Returns whether a file was loaded. A missing file is fine; one that
/// exists but does not parse is not.
pub fn load_env_file(path: &Path) -> Result<bool, ConfigError> {
    if !path.exists() {
        return Ok(false);
    }
    dotenvy::from_path(path).map_err(|source| ConfigError::EnvFile {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(true)
}
