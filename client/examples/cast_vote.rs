//! Example: Cast a vote through the transaction authenticator
//!
//! Expects `PRIVATE_KEY`, `SPACE`, `AUTHENTICATOR`, `STRATEGY` and `PROPOSAL`
//! in the environment. The network comes from `GOV_CONFIG` or the Goerli
//! preset.

use anyhow::Context;
use ethers::types::{Address, U256};
use governance_tx_client::{
    Choice, Envelope, GovernanceClient, MiddlewareSigner, NetworkConfig, StrategyConfig, VoteData,
};
use std::sync::Arc;

fn env_address(name: &str) -> anyhow::Result<Address> {
    std::env::var(name)
        .with_context(|| format!("{} is not set", name))?
        .parse()
        .with_context(|| format!("{} is not an address", name))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    governance_tx_client::init_tracing();

    println!("=== Governance Vote Example ===\n");

    let config = match std::env::var("GOV_CONFIG") {
        Ok(path) => NetworkConfig::from_file(&path)?,
        Err(_) => NetworkConfig::goerli(),
    };
    let config = Arc::new(config);

    let private_key = std::env::var("PRIVATE_KEY").context("PRIVATE_KEY is not set")?;
    let signer = MiddlewareSigner::connect(&config, &private_key)?;
    let client = GovernanceClient::new(Some(config))?;

    let space = env_address("SPACE")?;
    let proposal: U256 = std::env::var("PROPOSAL")
        .context("PROPOSAL is not set")?
        .parse::<u64>()
        .context("PROPOSAL is not a number")?
        .into();

    let status = client.get_proposal_status(&signer, space, proposal).await?;
    println!("Proposal {} status: {}", proposal, status);

    let envelope = Envelope::unsigned(VoteData {
        space,
        authenticator: env_address("AUTHENTICATOR")?,
        strategies: vec![StrategyConfig {
            index: 0,
            address: env_address("STRATEGY")?,
        }],
        proposal,
        choice: Choice::For,
        metadata_uri: String::new(),
    });

    let tx_hash = client.vote(&signer, &envelope).await?;
    println!("✓ Vote submitted: {:?}", tx_hash);

    let receipt = client.wait_for_receipt(&signer, tx_hash).await?;
    println!("✓ Vote confirmed (gas used: {})", receipt.gas_used.unwrap_or_default());

    Ok(())
}
