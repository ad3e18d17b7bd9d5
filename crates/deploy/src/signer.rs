//! Signer resolution for the target network.

use std::str::FromStr;

use alloy_signer_local::PrivateKeySigner;
use url::Url;

use crate::{DeployError, NetworkConfig};

/// Resolve the account that signs every deployment of the run.
///
/// The key is taken as-is from the configuration: funding and authorization
/// are the operator's responsibility.
pub fn resolve_signer(network: &NetworkConfig) -> Result<PrivateKeySigner, DeployError> {
    let url = network.network_url.as_deref().ok_or_else(|| {
        DeployError::SignerUnavailable("no network URL configured for the target network".into())
    })?;
    Url::parse(url).map_err(|e| {
        DeployError::SignerUnavailable(format!("invalid network URL {url:?}: {e}"))
    })?;

    let key = network
        .signer_key
        .as_deref()
        .map(str::trim)
        .filter(|key| !key.is_empty())
        .ok_or_else(|| {
            DeployError::SignerUnavailable(format!("no signer key configured for {url}"))
        })?;

    let signer = PrivateKeySigner::from_str(key.trim_start_matches("0x"))
        .map_err(|e| DeployError::SignerUnavailable(format!("invalid signer key: {e}")))?;

    tracing::info!(address = %signer.address(), network_url = %url, "Resolved deployment signer");

    Ok(signer)
}
