//! Process bootstrap: configuration, logging and server composition.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use gitaly_config::{Config, LogFormat, LoggingConfig};
use gitaly_server::GitalyServer;
use tracing::info;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

pub use gitaly_server::{RpcRequest, RpcResponse, ServiceSet, REPO_PATH_METADATA_KEY};

const ENV_CONFIG_PATH: &str = "GITALY_CONFIG";

/// Loads the configuration, installs logging and composes the server.
pub fn bootstrap(config_path: &Path) -> Result<GitalyServer> {
    let config = load_config(config_path)?;
    init_logging(&config.logging)?;
    let server = build_server(&config)?;

    let services = server.services();
    info!(
        config_path = %config_path.display(),
        storages = config.storages.len(),
        operations = services.operations.is_some(),
        refs = services.refs.is_some(),
        commits = services.commits.is_some(),
        "server composed"
    );

    Ok(server)
}

pub fn run_from_args<I>(args: I) -> Result<GitalyServer>
where
    I: IntoIterator<Item = String>,
{
    let args = CliArgs::parse(args)?;
    bootstrap(&args.config_path)
}

pub fn load_config(path: &Path) -> Result<Config> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read config file `{}`", path.display()))?;
    Config::from_toml(&raw).with_context(|| format!("failed to parse config `{}`", path.display()))
}

pub fn build_server(config: &Config) -> Result<GitalyServer> {
    GitalyServer::from_config(config).context("failed to compose RPC services")
}

/// Installs the global subscriber. `RUST_LOG` takes precedence over the
/// configured level. Returns `false` if a subscriber was already installed.
pub fn init_logging(config: &LoggingConfig) -> Result<bool> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(&config.level)
            .with_context(|| format!("invalid logging level `{}`", config.level))?,
    };

    let registry = tracing_subscriber::registry().with(filter);
    let installed = match config.log_format() {
        LogFormat::Json => registry
            .with(tracing_subscriber::fmt::layer().json())
            .try_init(),
        LogFormat::Text => registry.with(tracing_subscriber::fmt::layer()).try_init(),
    };

    Ok(installed.is_ok())
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct CliArgs {
    config_path: PathBuf,
}

impl CliArgs {
    fn parse<I>(args: I) -> Result<Self>
    where
        I: IntoIterator<Item = String>,
    {
        let mut iter = args.into_iter();
        let _program_name = iter.next();

        let mut config_path = env::var_os(ENV_CONFIG_PATH).map(PathBuf::from);

        while let Some(arg) = iter.next() {
            match arg.as_str() {
                "--config" => {
                    let value = iter
                        .next()
                        .ok_or_else(|| anyhow!("missing value for `--config`"))?;
                    config_path = Some(PathBuf::from(value));
                }
                _ => return Err(anyhow!("unknown argument `{arg}`")),
            }
        }

        let config_path = config_path.ok_or_else(|| {
            anyhow!("missing config path; pass `--config <path>` or set `{ENV_CONFIG_PATH}`")
        })?;

        Ok(Self { config_path })
    }
}
