//! Receipt monitoring.
//!
//! Polls a [`TransactionSigner`] for the receipt of a submitted transaction
//! until it is mined or the configured timeout elapses.

use crate::config::NetworkConfig;
use crate::error::{GovernanceError, Result};
use crate::transaction::TransactionSigner;
use crate::types::TransactionHash;
use ethers::types::{TransactionReceipt, U64};
use std::time::{Duration, Instant};
use tokio::time::sleep;
use tracing::{debug, info, warn};

/// Monitoring options
#[derive(Debug, Clone)]
pub struct MonitorOptions {
    /// Poll interval (in milliseconds)
    pub poll_interval_ms: u64,
    /// Timeout (in seconds)
    pub timeout_secs: u64,
}

impl MonitorOptions {
    /// Create from network config
    pub fn from_config(config: &NetworkConfig) -> Self {
        Self {
            poll_interval_ms: config.tx_poll_interval_ms,
            timeout_secs: config.tx_timeout_secs,
        }
    }

    /// Set custom poll interval
    pub fn with_poll_interval(mut self, interval_ms: u64) -> Self {
        self.poll_interval_ms = interval_ms;
        self
    }

    /// Set custom timeout
    pub fn with_timeout(mut self, timeout_secs: u64) -> Self {
        self.timeout_secs = timeout_secs;
        self
    }
}

/// Transaction monitoring result
#[derive(Debug, Clone)]
pub enum MonitorResult {
    /// Transaction mined with status 1
    Success(TransactionReceipt),
    /// Transaction mined but reverted
    Failed(TransactionReceipt),
    /// No receipt before the timeout
    Timeout,
}

impl MonitorResult {
    /// Receipt of a successful transaction, or the matching error
    pub fn into_receipt(self, hash: TransactionHash, timeout_secs: u64) -> Result<TransactionReceipt> {
        match self {
            MonitorResult::Success(receipt) => Ok(receipt),
            MonitorResult::Failed(_) => Err(GovernanceError::TransactionFailed(hash)),
            MonitorResult::Timeout => Err(GovernanceError::TransactionTimeout(timeout_secs)),
        }
    }
}

/// Poll for the receipt of `tx_hash`
///
/// Provider errors abort monitoring; a missing receipt keeps polling.
pub async fn monitor_transaction<S>(
    signer: &S,
    tx_hash: TransactionHash,
    options: &MonitorOptions,
) -> Result<MonitorResult>
where
    S: TransactionSigner + ?Sized,
{
    info!(
        "Monitoring transaction: {:?} (timeout: {}s)",
        tx_hash, options.timeout_secs
    );

    let start = Instant::now();
    let timeout = Duration::from_secs(options.timeout_secs);
    let poll_interval = Duration::from_millis(options.poll_interval_ms);

    loop {
        if start.elapsed() >= timeout {
            warn!("Transaction monitoring timed out: {:?}", tx_hash);
            return Ok(MonitorResult::Timeout);
        }

        match signer.transaction_receipt(tx_hash).await? {
            Some(receipt) if receipt.status == Some(U64::from(1)) => {
                info!("Transaction succeeded: {:?}", tx_hash);
                return Ok(MonitorResult::Success(receipt));
            }
            Some(receipt) => {
                warn!("Transaction reverted: {:?}", tx_hash);
                return Ok(MonitorResult::Failed(receipt));
            }
            None => {
                debug!("Transaction still pending: {:?}", tx_hash);
            }
        }

        sleep(poll_interval).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use ethers::types::H256;

    #[test]
    fn test_monitor_options_from_config() {
        let config = NetworkConfig::goerli();
        let options = MonitorOptions::from_config(&config);
        assert_eq!(options.poll_interval_ms, config.tx_poll_interval_ms);
        assert_eq!(options.timeout_secs, config.tx_timeout_secs);
    }

    #[test]
    fn test_monitor_options_builder() {
        let options = MonitorOptions::from_config(&NetworkConfig::goerli())
            .with_poll_interval(500)
            .with_timeout(10);

        assert_eq!(options.poll_interval_ms, 500);
        assert_eq!(options.timeout_secs, 10);
    }

    #[test]
    fn test_into_receipt() {
        let hash = H256::repeat_byte(0x01);

        assert_matches!(
            MonitorResult::Timeout.into_receipt(hash, 5),
            Err(GovernanceError::TransactionTimeout(5))
        );
        assert_matches!(
            MonitorResult::Failed(TransactionReceipt::default()).into_receipt(hash, 5),
            Err(GovernanceError::TransactionFailed(h)) if h == hash
        );
        assert!(MonitorResult::Success(TransactionReceipt::default())
            .into_receipt(hash, 5)
            .is_ok());
    }
}
