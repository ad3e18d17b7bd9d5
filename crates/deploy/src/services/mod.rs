//! Deployment facilities.
//!
//! Each facility implements [`crate::ContractDeployer`] in its own submodule.

pub mod rpc_deployer;

pub use rpc_deployer::RpcDeployer;
