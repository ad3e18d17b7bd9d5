use std::path::PathBuf;

use carbonmart_deploy::{Deployer, DeployerBuilder, KnownNetwork};
use clap::Parser;
use tracing::level_filters::LevelFilter;

/// The network targeted when nothing else selects one.
const DEFAULT_NETWORK: KnownNetwork = KnownNetwork::Sepolia;

#[derive(Parser)]
#[command(name = "carbonmart")]
#[command(
    author,
    version,
    about = "Deploy the carbon token and its NFT marketplace, then hand the artifacts to the frontend"
)]
pub struct Cli {
    /// The verbosity level.
    #[arg(short, long, env = "CARBONMART_VERBOSITY", default_value_t = LevelFilter::INFO)]
    pub verbosity: LevelFilter,

    /// Path to a Carbonmart.toml configuration file, or a directory holding one.
    #[arg(long, alias = "conf", env = "CARBONMART_CONFIG")]
    pub config: Option<PathBuf>,

    /// A well-known network to deploy to (sepolia, localhost).
    ///
    /// Defaults to sepolia when neither the configuration nor `--network-url`
    /// provides an endpoint.
    #[arg(short, long, env = "CARBONMART_NETWORK_NAME")]
    pub network: Option<KnownNetwork>,

    /// The URL of a JSON-RPC endpoint. Takes precedence over `--network`.
    #[arg(long, alias = "rpc-url", env = "CARBONMART_NETWORK_URL")]
    pub network_url: Option<String>,

    /// Infura project ID used to reach named networks.
    #[arg(long, env = "INFURA_PROJECT_ID", hide_env_values = true)]
    pub infura_project_id: Option<String>,

    /// Private key of the deploying account.
    #[arg(long, env = "SEPOLIA_PRIVATE_KEY", hide_env_values = true)]
    pub signer_key: Option<String>,

    /// Directory holding the compiled Hardhat artifacts.
    #[arg(long, env = "CARBONMART_ARTIFACTS_DIR")]
    pub artifacts_dir: Option<PathBuf>,

    /// Frontend directory receiving Marketplace.json and myToken.json.
    #[arg(long, env = "CARBONMART_FRONTEND_DIR")]
    pub frontend_dir: Option<PathBuf>,

    /// Directory receiving the deployment journal.
    #[arg(long, env = "CARBONMART_JOURNAL_DIR")]
    pub journal_dir: Option<PathBuf>,

    /// Do not write a deployment journal.
    #[arg(long, env = "CARBONMART_NO_JOURNAL", conflicts_with = "journal_dir")]
    pub no_journal: bool,

    /// Seconds to wait for each deployment to be confirmed.
    #[arg(long, env = "CARBONMART_CONFIRMATION_TIMEOUT")]
    pub confirmation_timeout: Option<u64>,

    /// Save the resolved configuration (without the signer key) to this path
    /// before deploying.
    #[arg(long, env = "CARBONMART_SAVE_CONFIG")]
    pub save_config: Option<PathBuf>,
}

impl Cli {
    /// Apply the command line overrides on top of `base`.
    pub fn into_builder(self, base: Deployer) -> DeployerBuilder {
        let needs_default_network = self.network.is_none()
            && self.network_url.is_none()
            && base.network.network_url.is_none();

        let mut builder = DeployerBuilder::from_config(base).no_journal(self.no_journal);

        if let Some(network) = self.network {
            builder = builder.network(network);
        } else if needs_default_network {
            builder = builder.network(DEFAULT_NETWORK);
        }

        if let Some(url) = self.network_url {
            builder = builder.network_url(url);
        }
        if let Some(project_id) = self.infura_project_id {
            builder = builder.infura_project_id(project_id);
        }
        if let Some(key) = self.signer_key {
            builder = builder.signer_key(key);
        }
        if let Some(path) = self.artifacts_dir {
            builder = builder.artifacts_dir(path);
        }
        if let Some(path) = self.frontend_dir {
            builder = builder.frontend_dir(path);
        }
        if let Some(path) = self.journal_dir {
            builder = builder.journal_dir(path);
        }
        if let Some(timeout_secs) = self.confirmation_timeout {
            builder = builder.confirmation_timeout_secs(timeout_secs);
        }

        builder
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("carbonmart").chain(args.iter().copied()))
            .expect("arguments should parse")
    }

    #[test]
    fn test_named_network() {
        let cli = parse(&[
            "--network",
            "sepolia",
            "--infura-project-id",
            "abc123",
            "--signer-key",
            "0x01",
        ]);
        let deployer = cli.into_builder(Deployer::default()).build().unwrap();

        assert_eq!(
            deployer.network.network_url.as_deref(),
            Some("https://sepolia.infura.io/v3/abc123")
        );
        assert_eq!(deployer.network.signer_key.as_deref(), Some("0x01"));
    }

    #[test]
    fn test_configured_url_is_kept() {
        let mut base = Deployer::default();
        base.network.network_url = Some("http://127.0.0.1:8545".to_string());

        let deployer = parse(&[]).into_builder(base).build().unwrap();
        assert_eq!(
            deployer.network.network_url.as_deref(),
            Some("http://127.0.0.1:8545")
        );
        assert!(deployer.network.chain_id.is_none());
    }

    #[test]
    fn test_paths_and_journal() {
        let cli = parse(&[
            "--network-url",
            "http://127.0.0.1:8545",
            "--artifacts-dir",
            "build",
            "--frontend-dir",
            "web/src",
            "--no-journal",
            "--confirmation-timeout",
            "30",
        ]);
        let deployer = cli.into_builder(Deployer::default()).build().unwrap();

        assert_eq!(deployer.contracts.artifacts_dir, PathBuf::from("build"));
        assert_eq!(deployer.output.frontend_dir, PathBuf::from("web/src"));
        assert!(deployer.output.journal_dir.is_none());
        assert_eq!(deployer.confirmation.timeout_secs, 30);
    }

    #[test]
    fn test_unknown_network_is_rejected() {
        let result = Cli::try_parse_from(["carbonmart", "--network", "mainnet"]);
        assert!(result.is_err());
    }
}
