//! Network configuration for the governance contracts.
//!
//! A [`NetworkConfig`] names the JSON-RPC endpoint, the proxy factory and
//! master space template used for space deployments, and the mapping tables
//! that select an authenticator or voting strategy implementation by contract
//! address.

use crate::authenticators::AuthenticatorKind;
use crate::error::{GovernanceError, Result};
use crate::strategies::StrategyKind;
use ethers::types::Address;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;
use url::Url;

// Placeholder deployment addresses. Supply real ones through a TOML config.
const GOERLI_PROXY_FACTORY: &str = "0x4b4f7f64be813ccc66aefc3bfce2baa01188631c";
const GOERLI_MASTER_SPACE: &str = "0xc3031a7d3326e47d49bff9d374d74f364b29ce4d";
const GOERLI_VANILLA_AUTHENTICATOR: &str = "0x86bfa0726cba0febeee457f04b705ab74b54d01c";
const GOERLI_ETH_SIG_AUTHENTICATOR: &str = "0x328c6f186639f1981dc25eb7a5f5ae5f6b9b0a94";
const GOERLI_ETH_TX_AUTHENTICATOR: &str = "0x37315ce75b0d7b7bd7e0bdb6e4d3e1b9e6f0c6c3";
const GOERLI_VANILLA_STRATEGY: &str = "0x395ed61716b48dc904140b515e9f682e33330154";
const GOERLI_COMP_STRATEGY: &str = "0xbbd17346378f76c1c94032594b57c93c24857b01";

/// Network type enumeration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Network {
    /// Goerli test network
    Goerli,
    /// Custom network with user-defined endpoint and contracts
    Custom,
}

impl Network {
    /// EIP-155 chain id of the network, `0` for custom networks
    pub fn chain_id(&self) -> u64 {
        match self {
            Network::Goerli => 5,
            Network::Custom => 0,
        }
    }

    /// Default JSON-RPC URL for this network
    pub fn default_rpc_url(&self) -> &'static str {
        match self {
            Network::Goerli => "https://rpc.ankr.com/eth_goerli",
            Network::Custom => "",
        }
    }
}

fn default_request_timeout_secs() -> u64 {
    30
}

fn default_tx_poll_interval_ms() -> u64 {
    1000
}

fn default_tx_timeout_secs() -> u64 {
    120
}

/// Configuration shared by every call of a [`crate::GovernanceClient`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NetworkConfig {
    /// Network preset
    pub network: Network,

    /// EIP-155 chain id used when signing
    pub chain_id: u64,

    /// JSON-RPC endpoint URL
    pub rpc_url: String,

    /// HTTP request timeout (in seconds)
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// Proxy factory used to deploy spaces
    pub proxy_factory: Address,

    /// Space implementation every proxy delegates to
    pub master_space: Address,

    /// Authenticator implementations keyed by contract address
    #[serde(default)]
    pub authenticators: HashMap<Address, AuthenticatorKind>,

    /// Voting strategy implementations keyed by contract address
    #[serde(default)]
    pub strategies: HashMap<Address, StrategyKind>,

    /// Receipt polling interval (in milliseconds)
    #[serde(default = "default_tx_poll_interval_ms")]
    pub tx_poll_interval_ms: u64,

    /// Receipt wait timeout (in seconds)
    #[serde(default = "default_tx_timeout_secs")]
    pub tx_timeout_secs: u64,
}

fn preset_address(value: &str) -> Address {
    value.parse().unwrap_or_default()
}

impl NetworkConfig {
    /// Goerli preset with placeholder factory, template, authenticator and strategy addresses
    ///
    /// Load a TOML configuration with the real deployment addresses before
    /// submitting transactions.
    pub fn goerli() -> Self {
        let network = Network::Goerli;

        let authenticators = HashMap::from([
            (
                preset_address(GOERLI_VANILLA_AUTHENTICATOR),
                AuthenticatorKind::Vanilla,
            ),
            (
                preset_address(GOERLI_ETH_SIG_AUTHENTICATOR),
                AuthenticatorKind::EthSig,
            ),
            (
                preset_address(GOERLI_ETH_TX_AUTHENTICATOR),
                AuthenticatorKind::EthTx,
            ),
        ]);
        let strategies = HashMap::from([
            (preset_address(GOERLI_VANILLA_STRATEGY), StrategyKind::Vanilla),
            (preset_address(GOERLI_COMP_STRATEGY), StrategyKind::Comp),
        ]);

        Self {
            network,
            chain_id: network.chain_id(),
            rpc_url: network.default_rpc_url().to_string(),
            request_timeout_secs: default_request_timeout_secs(),
            proxy_factory: preset_address(GOERLI_PROXY_FACTORY),
            master_space: preset_address(GOERLI_MASTER_SPACE),
            authenticators,
            strategies,
            tx_poll_interval_ms: default_tx_poll_interval_ms(),
            tx_timeout_secs: default_tx_timeout_secs(),
        }
    }

    /// Create a custom configuration with empty authenticator and strategy tables
    pub fn custom(
        chain_id: u64,
        rpc_url: String,
        proxy_factory: Address,
        master_space: Address,
    ) -> Result<Self> {
        let config = Self {
            network: Network::Custom,
            chain_id,
            rpc_url,
            request_timeout_secs: default_request_timeout_secs(),
            proxy_factory,
            master_space,
            authenticators: HashMap::new(),
            strategies: HashMap::new(),
            tx_poll_interval_ms: default_tx_poll_interval_ms(),
            tx_timeout_secs: default_tx_timeout_secs(),
        };
        config.validate()?;
        Ok(config)
    }

    /// Parse a configuration from TOML text
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: NetworkConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a TOML file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Set request timeout
    pub fn with_request_timeout(mut self, timeout_secs: u64) -> Self {
        self.request_timeout_secs = timeout_secs;
        self
    }

    /// HTTP request timeout
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Set receipt polling configuration
    pub fn with_tx_config(mut self, poll_interval_ms: u64, timeout_secs: u64) -> Self {
        self.tx_poll_interval_ms = poll_interval_ms;
        self.tx_timeout_secs = timeout_secs;
        self
    }

    /// Register an authenticator implementation
    pub fn with_authenticator(mut self, address: Address, kind: AuthenticatorKind) -> Self {
        self.authenticators.insert(address, kind);
        self
    }

    /// Register a voting strategy implementation
    pub fn with_strategy(mut self, address: Address, kind: StrategyKind) -> Self {
        self.strategies.insert(address, kind);
        self
    }

    /// Parsed RPC endpoint
    pub fn rpc_endpoint(&self) -> Result<Url> {
        Ok(Url::parse(&self.rpc_url)?)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.rpc_url.is_empty() {
            return Err(GovernanceError::ConfigError(
                "RPC URL cannot be empty".to_string(),
            ));
        }
        self.rpc_endpoint()?;
        if self.chain_id == 0 {
            return Err(GovernanceError::ConfigError(
                "Chain id must be greater than 0".to_string(),
            ));
        }
        if self.proxy_factory.is_zero() {
            return Err(GovernanceError::ConfigError(
                "Proxy factory address cannot be zero".to_string(),
            ));
        }
        if self.master_space.is_zero() {
            return Err(GovernanceError::ConfigError(
                "Master space address cannot be zero".to_string(),
            ));
        }
        if self.request_timeout_secs == 0 {
            return Err(GovernanceError::ConfigError(
                "Request timeout must be greater than 0".to_string(),
            ));
        }
        if self.tx_poll_interval_ms == 0 {
            return Err(GovernanceError::ConfigError(
                "Transaction poll interval must be greater than 0".to_string(),
            ));
        }
        if self.tx_timeout_secs == 0 {
            return Err(GovernanceError::ConfigError(
                "Transaction timeout must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self::goerli()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    fn addr(byte: u8) -> Address {
        Address::repeat_byte(byte)
    }

    #[test]
    fn test_goerli_config() {
        let config = NetworkConfig::goerli();
        assert_eq!(config.network, Network::Goerli);
        assert_eq!(config.chain_id, 5);
        assert!(!config.proxy_factory.is_zero());
        assert!(!config.master_space.is_zero());
        assert_eq!(config.authenticators.len(), 3);
        assert_eq!(config.strategies.len(), 2);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_default_config() {
        assert_eq!(NetworkConfig::default(), NetworkConfig::goerli());
    }

    #[test]
    fn test_custom_config() {
        let config = NetworkConfig::custom(
            31337,
            "http://localhost:8545".to_string(),
            addr(1),
            addr(2),
        )
        .unwrap();

        assert_eq!(config.network, Network::Custom);
        assert_eq!(config.proxy_factory, addr(1));
        assert!(config.authenticators.is_empty());
    }

    #[test]
    fn test_custom_config_rejects_zero_factory() {
        let result = NetworkConfig::custom(
            31337,
            "http://localhost:8545".to_string(),
            Address::zero(),
            addr(2),
        );
        assert_matches!(result, Err(GovernanceError::ConfigError(_)));
    }

    #[test]
    fn test_custom_config_rejects_bad_url() {
        let result = NetworkConfig::custom(31337, "not a url".to_string(), addr(1), addr(2));
        assert_matches!(result, Err(GovernanceError::UrlParseError(_)));
    }

    #[test]
    fn test_config_builder() {
        let config = NetworkConfig::goerli()
            .with_request_timeout(5)
            .with_tx_config(250, 30)
            .with_authenticator(addr(9), AuthenticatorKind::EthTx)
            .with_strategy(addr(8), StrategyKind::Comp);

        assert_eq!(config.request_timeout(), Duration::from_secs(5));
        assert_eq!(config.tx_poll_interval_ms, 250);
        assert_eq!(config.tx_timeout_secs, 30);
        assert_eq!(config.authenticators.get(&addr(9)), Some(&AuthenticatorKind::EthTx));
        assert_eq!(config.strategies.get(&addr(8)), Some(&StrategyKind::Comp));
    }

    #[test]
    fn test_config_validation() {
        let mut config = NetworkConfig::goerli();
        assert!(config.validate().is_ok());

        config.tx_poll_interval_ms = 0;
        assert!(config.validate().is_err());

        config.tx_poll_interval_ms = 1000;
        config.chain_id = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_from_toml() {
        let content = r#"
            network = "custom"
            chain_id = 31337
            rpc_url = "http://127.0.0.1:8545"
            proxy_factory = "0x1111111111111111111111111111111111111111"
            master_space = "0x2222222222222222222222222222222222222222"
            tx_timeout_secs = 15
            request_timeout_secs = 5

            [authenticators]
            "0x3333333333333333333333333333333333333333" = "ethSig"

            [strategies]
            "0x4444444444444444444444444444444444444444" = "vanilla"
        "#;

        let config = NetworkConfig::from_toml_str(content).unwrap();
        assert_eq!(config.network, Network::Custom);
        assert_eq!(config.master_space, addr(0x22));
        assert_eq!(config.tx_timeout_secs, 15);
        assert_eq!(config.tx_poll_interval_ms, 1000);
        assert_eq!(config.request_timeout(), Duration::from_secs(5));
        assert_eq!(
            config.authenticators.get(&addr(0x33)),
            Some(&AuthenticatorKind::EthSig)
        );
        assert_eq!(config.strategies.get(&addr(0x44)), Some(&StrategyKind::Vanilla));
    }

    #[test]
    fn test_request_timeout_defaults_in_toml() {
        let content = r#"
            network = "custom"
            chain_id = 31337
            rpc_url = "http://127.0.0.1:8545"
            proxy_factory = "0x1111111111111111111111111111111111111111"
            master_space = "0x2222222222222222222222222222222222222222"
        "#;

        let config = NetworkConfig::from_toml_str(content).unwrap();
        assert_eq!(config.request_timeout_secs, 30);
        assert_eq!(config.request_timeout(), Duration::from_secs(30));

        let zero = format!("{}\nrequest_timeout_secs = 0\n", content);
        assert_matches!(
            NetworkConfig::from_toml_str(&zero),
            Err(GovernanceError::ConfigError(_))
        );
    }

    #[test]
    fn test_config_from_missing_file() {
        let result = NetworkConfig::from_file("/nonexistent/governance.toml");
        assert_matches!(result, Err(GovernanceError::IoError(_)));
    }
}
