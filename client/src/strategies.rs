//! Voting strategy parameter resolution.
//!
//! Every strategy listed in an envelope contributes one opaque `params` blob
//! to the encoded call. The blobs are resolved concurrently but always
//! returned in the order of the input list.

use crate::config::NetworkConfig;
use crate::error::{GovernanceError, Result};
use crate::types::StrategyConfig;
use ethers::types::{Address, Bytes};
use futures::future::try_join_all;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Action the parameters are resolved for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StrategyAction {
    /// Creating a proposal
    Propose,
    /// Casting a vote
    Vote,
}

/// Voting strategy implementation selected by contract address
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum StrategyKind {
    /// Constant voting power
    Vanilla,
    /// Delegated Comp-style token balance
    Comp,
}

impl StrategyKind {
    /// Find the implementation registered for `address`
    pub fn lookup(address: Address, config: &NetworkConfig) -> Option<Self> {
        config.strategies.get(&address).copied()
    }

    /// User parameters this strategy expects from `actor`
    pub async fn params(
        &self,
        _action: StrategyAction,
        _strategy: &StrategyConfig,
        _actor: Address,
        _config: &NetworkConfig,
    ) -> Result<Bytes> {
        match self {
            // Neither strategy reads user params.
            StrategyKind::Vanilla | StrategyKind::Comp => Ok(Bytes::from(vec![0x00])),
        }
    }
}

/// Resolve the user parameters of every strategy, preserving input order
pub async fn resolve_strategies_params(
    action: StrategyAction,
    strategies: &[StrategyConfig],
    actor: Address,
    config: &NetworkConfig,
) -> Result<Vec<Bytes>> {
    let kinds = strategies
        .iter()
        .map(|strategy| {
            StrategyKind::lookup(strategy.address, config)
                .map(|kind| (kind, strategy))
                .ok_or(GovernanceError::UnknownStrategy(strategy.address))
        })
        .collect::<Result<Vec<_>>>()?;

    let params = try_join_all(
        kinds
            .into_iter()
            .map(|(kind, strategy)| async move { kind.params(action, strategy, actor, config).await }),
    )
    .await?;

    debug!(
        "Resolved {} strategy params for {:?} by {:?}",
        params.len(),
        action,
        actor
    );
    Ok(params)
}
