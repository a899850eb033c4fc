//! Governance Transaction Client
//!
//! This library builds and submits transactions against on-chain governance
//! contracts: spaces deployed as proxies through a proxy factory, avatar
//! execution strategies, and the authenticators that forward signed
//! proposals and votes into a space.
//!
//! # Features
//!
//! - **Space deployment**: Deterministic proxy addresses predicted by the factory
//! - **Authenticated actions**: Propose and vote calls wrapped by vanilla, EIP-712 or transaction authenticators
//! - **Direct space calls**: Execute, cancel and parameter updates
//! - **Proposal reads**: Decoded proposals and lifecycle status
//! - **Pluggable signers**: Any `ethers` middleware through [`TransactionSigner`]
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use governance_tx_client::{GovernanceClient, MiddlewareSigner, NetworkConfig};
//! use ethers::types::{Address, U256};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     governance_tx_client::init_tracing();
//!
//!     let config = Arc::new(NetworkConfig::goerli());
//!     let client = GovernanceClient::new(Some(config.clone()))?;
//!     let signer = MiddlewareSigner::connect(&config, "0x...")?;
//!
//!     let space = Address::repeat_byte(0x01);
//!     let status = client.get_proposal_status(&signer, space, U256::from(1)).await?;
//!     println!("Proposal status: {}", status);
//!
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(rustdoc::broken_intra_doc_links)]

pub mod abi;
pub mod authenticators;
pub mod client;
pub mod config;
pub mod error;
pub mod monitor;
pub mod strategies;
pub mod transaction;
pub mod types;

pub use authenticators::{AuthenticatorCall, AuthenticatorKind};
pub use client::{random_salt, resolve_actor, GovernanceClient};
pub use config::{Network, NetworkConfig};
pub use error::{GovernanceError, Result};
pub use monitor::{MonitorOptions, MonitorResult};
pub use strategies::{resolve_strategies_params, StrategyAction, StrategyKind};
pub use transaction::{MiddlewareSigner, TransactionSigner};
pub use types::{
    AddressConfig, Choice, DeploySpaceParams, DeploySpaceResult, Envelope, Proposal,
    ProposalStatus, ProposeData, SignatureData, StrategyConfig, TransactionHash, VoteData,
};

/// Install a `tracing` subscriber honouring `RUST_LOG`, defaulting to `info`
pub fn init_tracing() {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with(tracing_subscriber::fmt::layer())
        .init();
}
