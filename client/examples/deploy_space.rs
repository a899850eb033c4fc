//! Example: Deploy a governance space
//!
//! Reads the network from `GOV_CONFIG` (a TOML file, Goerli when unset) and
//! signs with the key in `PRIVATE_KEY`.

use anyhow::Context;
use ethers::types::{Address, Bytes};
use governance_tx_client::{
    AddressConfig, DeploySpaceParams, GovernanceClient, MiddlewareSigner, NetworkConfig,
    TransactionSigner,
};
use std::sync::Arc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    governance_tx_client::init_tracing();

    println!("=== Governance Space Deployment Example ===\n");

    let config = match std::env::var("GOV_CONFIG") {
        Ok(path) => NetworkConfig::from_file(&path)?,
        Err(_) => NetworkConfig::goerli(),
    };
    let config = Arc::new(config);
    println!("Network: {:?} (chain {})", config.network, config.chain_id);
    println!("Proxy factory: {:?}\n", config.proxy_factory);

    let private_key = std::env::var("PRIVATE_KEY").context("PRIVATE_KEY is not set")?;
    let signer = MiddlewareSigner::connect(&config, &private_key)?;
    let controller = signer.address().await?;
    println!("✓ Signer connected: {:?}\n", controller);

    let client = GovernanceClient::new(Some(config.clone()))?;

    let vanilla_strategy = config
        .strategies
        .keys()
        .next()
        .copied()
        .unwrap_or_else(Address::zero);

    let params = DeploySpaceParams {
        controller,
        voting_delay: 0,
        min_voting_duration: 0,
        max_voting_duration: 86_400,
        proposal_validation_strategy: AddressConfig {
            address: vanilla_strategy,
            params: Bytes::new(),
        },
        metadata_uri: String::new(),
        authenticators: config.authenticators.keys().copied().collect(),
        voting_strategies: vec![AddressConfig {
            address: vanilla_strategy,
            params: Bytes::new(),
        }],
        voting_strategies_metadata: vec![String::new()],
    };

    println!("Deploying space...");
    let result = client.deploy_space(&signer, params).await?;
    println!("✓ Deployment submitted");
    println!("  - Space: {:?}", result.space_address);
    println!("  - Transaction: {:?}", result.tx_id);
    println!("  - Salt: {:?}\n", result.salt);

    println!("Waiting for confirmation...");
    let receipt = client.wait_for_receipt(&signer, result.tx_id).await?;
    println!(
        "✓ Confirmed in block {}",
        receipt.block_number.unwrap_or_default()
    );

    Ok(())
}
