//! Configuration sections of a deployment run.

use std::{fmt, path::PathBuf, time::Duration};

use alloy_core::primitives::{
    U256,
    utils::{ParseUnits, parse_units},
};
use serde::{Deserialize, Deserializer, Serialize};

use crate::DeployError;

/// Default contract name for the fungible token.
pub const DEFAULT_TOKEN_CONTRACT: &str = "CarbonToken";
/// Default contract name for the marketplace.
pub const DEFAULT_MARKETPLACE_CONTRACT: &str = "NFTMarketplace";
/// Default initial token supply, in whole tokens.
pub const DEFAULT_INITIAL_SUPPLY: &str = "100000000";
/// Default token decimals.
pub const DEFAULT_DECIMALS: u8 = 18;

/// Default directory holding the compiled contract artifacts.
pub const DEFAULT_ARTIFACTS_DIR: &str = "artifacts";
/// Default frontend source directory receiving the artifact files.
pub const DEFAULT_FRONTEND_DIR: &str = "nft-marketplace/src";
/// Default file name of the marketplace artifact.
pub const DEFAULT_MARKETPLACE_FILE: &str = "Marketplace.json";
/// Default file name of the token artifact.
pub const DEFAULT_TOKEN_FILE: &str = "myToken.json";
/// Default directory for deployment journals.
pub const DEFAULT_JOURNAL_DIR: &str = "deployments";

/// Target network and credentials.
///
/// `signer_key` is never written back to disk when the configuration is saved.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NetworkConfig {
    /// The JSON-RPC endpoint of the target network.
    pub network_url: Option<String>,
    /// Hex-encoded secp256k1 private key of the deploying account.
    #[serde(skip_serializing)]
    pub signer_key: Option<String>,
    /// Expected chain ID. Queried from the node when unset.
    pub chain_id: Option<u64>,
}

impl fmt::Debug for NetworkConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NetworkConfig")
            .field("network_url", &self.network_url)
            .field("signer_key", &self.signer_key.as_ref().map(|_| "<redacted>"))
            .field("chain_id", &self.chain_id)
            .finish()
    }
}

/// The fungible token deployed first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TokenConfig {
    pub name: String,
    /// Initial supply in whole tokens, as a decimal string.
    ///
    /// Bare numbers (unquoted TOML values, environment overrides) are accepted
    /// and kept in their decimal form.
    #[serde(deserialize_with = "deserialize_supply")]
    pub initial_supply: String,
    pub decimals: u8,
}

impl Default for TokenConfig {
    fn default() -> Self {
        Self {
            name: DEFAULT_TOKEN_CONTRACT.to_string(),
            initial_supply: DEFAULT_INITIAL_SUPPLY.to_string(),
            decimals: DEFAULT_DECIMALS,
        }
    }
}

fn deserialize_supply<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Supply {
        Text(String),
        Whole(u64),
        Negative(i64),
        Fractional(f64),
    }

    Ok(match Supply::deserialize(deserializer)? {
        Supply::Text(text) => text,
        Supply::Whole(whole) => whole.to_string(),
        Supply::Negative(negative) => negative.to_string(),
        Supply::Fractional(fractional) => fractional.to_string(),
    })
}

impl TokenConfig {
    /// The initial supply scaled by `decimals`, as passed to the constructor.
    pub fn initial_supply_units(&self) -> Result<U256, DeployError> {
        match parse_units(&self.initial_supply, self.decimals) {
            Ok(ParseUnits::U256(value)) => Ok(value),
            Ok(ParseUnits::I256(_)) => Err(DeployError::Config(format!(
                "initial supply must not be negative, got {}",
                self.initial_supply
            ))),
            Err(e) => Err(DeployError::Config(format!(
                "invalid initial supply {:?} with {} decimals: {e}",
                self.initial_supply, self.decimals
            ))),
        }
    }
}

/// The marketplace deployed against the token address.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MarketplaceConfig {
    pub name: String,
}

impl Default for MarketplaceConfig {
    fn default() -> Self {
        Self {
            name: DEFAULT_MARKETPLACE_CONTRACT.to_string(),
        }
    }
}

/// Where compiled contracts are read from and which ones to deploy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContractsConfig {
    /// Hardhat artifacts directory.
    pub artifacts_dir: PathBuf,
    pub token: TokenConfig,
    pub marketplace: MarketplaceConfig,
}

impl Default for ContractsConfig {
    fn default() -> Self {
        Self {
            artifacts_dir: PathBuf::from(DEFAULT_ARTIFACTS_DIR),
            token: TokenConfig::default(),
            marketplace: MarketplaceConfig::default(),
        }
    }
}

/// Where the artifacts handed to the frontend are written.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Frontend directory. Must already exist.
    pub frontend_dir: PathBuf,
    pub marketplace_file: String,
    pub token_file: String,
    /// Directory for deployment journals. Disabled when unset.
    pub journal_dir: Option<PathBuf>,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            frontend_dir: PathBuf::from(DEFAULT_FRONTEND_DIR),
            marketplace_file: DEFAULT_MARKETPLACE_FILE.to_string(),
            token_file: DEFAULT_TOKEN_FILE.to_string(),
            journal_dir: Some(PathBuf::from(DEFAULT_JOURNAL_DIR)),
        }
    }
}

impl OutputConfig {
    pub fn marketplace_artifact_path(&self) -> PathBuf {
        self.frontend_dir.join(&self.marketplace_file)
    }

    pub fn token_artifact_path(&self) -> PathBuf {
        self.frontend_dir.join(&self.token_file)
    }
}

/// Transaction submission and confirmation parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConfirmationConfig {
    /// Maximum time to wait for a deployment to be confirmed.
    pub timeout_secs: u64,
    /// Interval between receipt polls.
    pub poll_interval_ms: u64,
    /// Number of blocks (including the inclusion block) to wait for.
    pub confirmations: u64,
    /// Extra gas added on top of the node's estimate, in percent.
    pub gas_limit_margin_percent: u64,
}

impl Default for ConfirmationConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 300,
            poll_interval_ms: 2000,
            confirmations: 1,
            gas_limit_margin_percent: 20,
        }
    }
}

impl ConfirmationConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_supply_has_no_precision_loss() {
        let supply = TokenConfig::default().initial_supply_units().unwrap();
        let expected = U256::from(100_000_000u64) * U256::from(10u64).pow(U256::from(18u64));

        assert_eq!(supply, expected);
        assert_eq!(supply.to_string(), "100000000000000000000000000");
    }

    #[test]
    fn test_fractional_supply() {
        let token = TokenConfig {
            initial_supply: "1.5".to_string(),
            decimals: 6,
            ..Default::default()
        };
        assert_eq!(token.initial_supply_units().unwrap(), U256::from(1_500_000u64));
    }

    #[test]
    fn test_negative_supply_is_rejected() {
        let token = TokenConfig {
            initial_supply: "-1".to_string(),
            ..Default::default()
        };
        assert!(matches!(
            token.initial_supply_units(),
            Err(DeployError::Config(_))
        ));
    }

    #[test]
    fn test_malformed_supply_is_rejected() {
        let token = TokenConfig {
            initial_supply: "one hundred".to_string(),
            ..Default::default()
        };
        assert!(matches!(
            token.initial_supply_units(),
            Err(DeployError::Config(_))
        ));
    }

    #[test]
    fn test_signer_key_is_redacted_and_not_serialized() {
        let network = NetworkConfig {
            network_url: Some("http://127.0.0.1:8545".to_string()),
            signer_key: Some("0xdeadbeef".to_string()),
            chain_id: None,
        };

        assert!(!format!("{network:?}").contains("deadbeef"));
        assert!(!toml::to_string(&network).unwrap().contains("deadbeef"));
    }

    #[test]
    fn test_artifact_paths() {
        let output = OutputConfig::default();
        assert_eq!(
            output.marketplace_artifact_path(),
            PathBuf::from("nft-marketplace/src/Marketplace.json")
        );
        assert_eq!(
            output.token_artifact_path(),
            PathBuf::from("nft-marketplace/src/myToken.json")
        );
    }

    #[test]
    fn test_supply_accepts_bare_numbers() {
        let token: TokenConfig = toml::from_str("initial_supply = 100000000").unwrap();
        assert_eq!(token.initial_supply, "100000000");
        assert_eq!(
            token.initial_supply_units().unwrap(),
            TokenConfig::default().initial_supply_units().unwrap()
        );

        let token: TokenConfig = toml::from_str("initial_supply = 2.5\ndecimals = 2").unwrap();
        assert_eq!(token.initial_supply_units().unwrap(), U256::from(250u64));

        let token: TokenConfig = toml::from_str("initial_supply = -3").unwrap();
        assert!(matches!(
            token.initial_supply_units(),
            Err(DeployError::Config(_))
        ));

        let token: TokenConfig = toml::from_str(r#"initial_supply = "42""#).unwrap();
        assert_eq!(token.initial_supply, "42");
    }
}
