//! Contract ABIs and calldata helpers.
//!
//! The ABIs are kept as JSON fragments and parsed on demand with
//! `ethers::abi`, the same representation the contracts' build artifacts use.

use crate::error::{GovernanceError, Result};
use crate::types::{AddressConfig, StrategyConfig};
use ethers::abi::{Abi, Token};
use ethers::types::{Address, Bytes, U256};

/// Space contract entry points used by the client
pub const SPACE_ABI: &str = r#"[
  {
    "type": "function",
    "name": "initialize",
    "stateMutability": "nonpayable",
    "inputs": [
      {"name": "_owner", "type": "address"},
      {"name": "_votingDelay", "type": "uint32"},
      {"name": "_minVotingDuration", "type": "uint32"},
      {"name": "_maxVotingDuration", "type": "uint32"},
      {"name": "_proposalValidationStrategy", "type": "tuple", "components": [
        {"name": "addr", "type": "address"},
        {"name": "params", "type": "bytes"}
      ]},
      {"name": "_metadataURI", "type": "string"},
      {"name": "_votingStrategies", "type": "tuple[]", "components": [
        {"name": "addr", "type": "address"},
        {"name": "params", "type": "bytes"}
      ]},
      {"name": "_votingStrategyMetadataURIs", "type": "string[]"},
      {"name": "_authenticators", "type": "address[]"}
    ],
    "outputs": []
  },
  {
    "type": "function",
    "name": "propose",
    "stateMutability": "nonpayable",
    "inputs": [
      {"name": "author", "type": "address"},
      {"name": "metadataURI", "type": "string"},
      {"name": "executionStrategy", "type": "tuple", "components": [
        {"name": "addr", "type": "address"},
        {"name": "params", "type": "bytes"}
      ]},
      {"name": "userProposalValidationParams", "type": "bytes"}
    ],
    "outputs": []
  },
  {
    "type": "function",
    "name": "vote",
    "stateMutability": "nonpayable",
    "inputs": [
      {"name": "voterAddress", "type": "address"},
      {"name": "proposalId", "type": "uint256"},
      {"name": "choice", "type": "uint8"},
      {"name": "userVotingStrategies", "type": "tuple[]", "components": [
        {"name": "index", "type": "uint8"},
        {"name": "params", "type": "bytes"}
      ]},
      {"name": "metadataURI", "type": "string"}
    ],
    "outputs": []
  },
  {
    "type": "function",
    "name": "execute",
    "stateMutability": "nonpayable",
    "inputs": [
      {"name": "proposalId", "type": "uint256"},
      {"name": "executionPayload", "type": "bytes"}
    ],
    "outputs": []
  },
  {
    "type": "function",
    "name": "cancel",
    "stateMutability": "nonpayable",
    "inputs": [{"name": "proposalId", "type": "uint256"}],
    "outputs": []
  },
  {
    "type": "function",
    "name": "getProposal",
    "stateMutability": "view",
    "inputs": [{"name": "proposalId", "type": "uint256"}],
    "outputs": [
      {"name": "", "type": "tuple", "components": [
        {"name": "snapshotTimestamp", "type": "uint32"},
        {"name": "startTimestamp", "type": "uint32"},
        {"name": "minEndTimestamp", "type": "uint32"},
        {"name": "maxEndTimestamp", "type": "uint32"},
        {"name": "executionPayloadHash", "type": "bytes32"},
        {"name": "executionStrategy", "type": "address"},
        {"name": "author", "type": "address"},
        {"name": "finalizationStatus", "type": "uint8"},
        {"name": "activeVotingStrategies", "type": "uint256"}
      ]}
    ]
  },
  {
    "type": "function",
    "name": "getProposalStatus",
    "stateMutability": "view",
    "inputs": [{"name": "proposalId", "type": "uint256"}],
    "outputs": [{"name": "", "type": "uint8"}]
  },
  {
    "type": "function",
    "name": "setMaxVotingDuration",
    "stateMutability": "nonpayable",
    "inputs": [{"name": "_maxVotingDuration", "type": "uint32"}],
    "outputs": []
  },
  {
    "type": "function",
    "name": "setMinVotingDuration",
    "stateMutability": "nonpayable",
    "inputs": [{"name": "_minVotingDuration", "type": "uint32"}],
    "outputs": []
  },
  {
    "type": "function",
    "name": "setMetadataURI",
    "stateMutability": "nonpayable",
    "inputs": [{"name": "_metadataURI", "type": "string"}],
    "outputs": []
  },
  {
    "type": "function",
    "name": "setVotingDelay",
    "stateMutability": "nonpayable",
    "inputs": [{"name": "_votingDelay", "type": "uint32"}],
    "outputs": []
  }
]"#;

/// Proxy factory used for deterministic space deployments
pub const PROXY_FACTORY_ABI: &str = r#"[
  {
    "type": "function",
    "name": "deployProxy",
    "stateMutability": "nonpayable",
    "inputs": [
      {"name": "implementation", "type": "address"},
      {"name": "initializer", "type": "bytes"},
      {"name": "salt", "type": "bytes32"}
    ],
    "outputs": []
  },
  {
    "type": "function",
    "name": "predictProxyAddress",
    "stateMutability": "view",
    "inputs": [
      {"name": "implementation", "type": "address"},
      {"name": "salt", "type": "bytes32"}
    ],
    "outputs": [{"name": "", "type": "address"}]
  }
]"#;

/// Avatar execution strategy constructor
pub const AVATAR_EXECUTION_STRATEGY_ABI: &str = r#"[
  {
    "type": "constructor",
    "stateMutability": "nonpayable",
    "inputs": [
      {"name": "_owner", "type": "address"},
      {"name": "_target", "type": "address"},
      {"name": "_spaces", "type": "address[]"}
    ]
  }
]"#;

/// Authenticator that forwards calls without checking a signature
pub const VANILLA_AUTHENTICATOR_ABI: &str = r#"[
  {
    "type": "function",
    "name": "authenticate",
    "stateMutability": "nonpayable",
    "inputs": [
      {"name": "target", "type": "address"},
      {"name": "functionSelector", "type": "bytes4"},
      {"name": "data", "type": "bytes"}
    ],
    "outputs": []
  }
]"#;

/// Authenticator that checks the caller against the author or voter
pub const ETH_TX_AUTHENTICATOR_ABI: &str = VANILLA_AUTHENTICATOR_ABI;

/// Authenticator that verifies an EIP-712 signature
pub const ETH_SIG_AUTHENTICATOR_ABI: &str = r#"[
  {
    "type": "function",
    "name": "authenticate",
    "stateMutability": "nonpayable",
    "inputs": [
      {"name": "v", "type": "uint8"},
      {"name": "r", "type": "bytes32"},
      {"name": "s", "type": "bytes32"},
      {"name": "salt", "type": "uint256"},
      {"name": "target", "type": "address"},
      {"name": "functionSelector", "type": "bytes4"},
      {"name": "data", "type": "bytes"}
    ],
    "outputs": []
  }
]"#;

/// Parse a JSON ABI
pub fn parse_abi(abi_json: &str) -> Result<Abi> {
    serde_json::from_str(abi_json).map_err(GovernanceError::SerializationError)
}

/// Encode a call to `name` with the given tokens, selector included
pub fn encode_call(abi: &Abi, name: &str, tokens: &[Token]) -> Result<Bytes> {
    let function = abi.function(name)?;
    Ok(function.encode_input(tokens)?.into())
}

/// Decode the output of a call to `name`
pub fn decode_output(abi: &Abi, name: &str, data: &[u8]) -> Result<Vec<Token>> {
    let function = abi.function(name)?;
    Ok(function.decode_output(data)?)
}

/// Split encoded call data into its 4-byte selector and the argument payload
pub fn split_selector(data: &[u8]) -> Result<([u8; 4], Bytes)> {
    if data.len() < 4 {
        return Err(GovernanceError::InvalidResponse(format!(
            "Call data too short for a selector: {} bytes",
            data.len()
        )));
    }

    let mut selector = [0u8; 4];
    selector.copy_from_slice(&data[..4]);
    Ok((selector, Bytes::from(data[4..].to_vec())))
}

/// `(address addr, bytes params)` tuple
pub fn address_config_token(config: &AddressConfig) -> Token {
    Token::Tuple(vec![
        Token::Address(config.address),
        Token::Bytes(config.params.to_vec()),
    ])
}

/// `(index, params)` tuples pairing each strategy with its resolved params
///
/// `signed` selects `int8` encoding for the index, which only admits indices
/// up to 127.
pub fn indexed_strategies_token(
    strategies: &[StrategyConfig],
    params: &[Bytes],
    signed: bool,
) -> Result<Token> {
    let entries = strategies
        .iter()
        .zip(params)
        .map(|(strategy, params)| {
            let index = if signed {
                if strategy.index > i8::MAX as u8 {
                    return Err(GovernanceError::InvalidStrategyIndex(strategy.index));
                }
                Token::Int(U256::from(strategy.index))
            } else {
                Token::Uint(U256::from(strategy.index))
            };
            Ok(Token::Tuple(vec![index, Token::Bytes(params.to_vec())]))
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(Token::Array(entries))
}

/// Array of addresses
pub fn address_array_token(addresses: &[Address]) -> Token {
    Token::Array(addresses.iter().copied().map(Token::Address).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case(SPACE_ABI, "propose" ; "space")]
    #[test_case(PROXY_FACTORY_ABI, "deployProxy" ; "proxy factory")]
    #[test_case(VANILLA_AUTHENTICATOR_ABI, "authenticate" ; "vanilla authenticator")]
    #[test_case(ETH_SIG_AUTHENTICATOR_ABI, "authenticate" ; "eth sig authenticator")]
    fn test_abi_parses(abi_json: &str, function: &str) {
        let abi = parse_abi(abi_json).unwrap();
        assert!(abi.function(function).is_ok());
    }

    #[test]
    fn test_avatar_constructor_parses() {
        let abi = parse_abi(AVATAR_EXECUTION_STRATEGY_ABI).unwrap();
        assert_eq!(abi.constructor().unwrap().inputs.len(), 3);
    }

    #[test]
    fn test_cancel_selector() {
        let abi = parse_abi(SPACE_ABI).unwrap();
        let data = encode_call(&abi, "cancel", &[Token::Uint(U256::from(7))]).unwrap();
        let (selector, calldata) = split_selector(&data).unwrap();

        assert_eq!(selector, abi.function("cancel").unwrap().short_signature());
        assert_eq!(calldata.len(), 32);
        assert_eq!(calldata[31], 7);
    }

    #[test]
    fn test_split_selector_too_short() {
        assert!(split_selector(&[0x12, 0x34]).is_err());
    }

    #[test]
    fn test_unknown_function() {
        let abi = parse_abi(SPACE_ABI).unwrap();
        assert!(encode_call(&abi, "transfer", &[]).is_err());
    }

    #[test]
    fn test_indexed_strategies_preserve_order() {
        let strategies = vec![
            StrategyConfig {
                index: 2,
                address: Address::repeat_byte(2),
            },
            StrategyConfig {
                index: 0,
                address: Address::repeat_byte(1),
            },
        ];
        let params = vec![Bytes::from(vec![0xaa]), Bytes::from(vec![0xbb])];

        let token = indexed_strategies_token(&strategies, &params, false).unwrap();
        assert_eq!(
            token,
            Token::Array(vec![
                Token::Tuple(vec![Token::Uint(U256::from(2)), Token::Bytes(vec![0xaa])]),
                Token::Tuple(vec![Token::Uint(U256::from(0)), Token::Bytes(vec![0xbb])]),
            ])
        );
    }

    #[test]
    fn test_signed_index_fits_int8() {
        let params = vec![Bytes::from(vec![0x00])];
        let strategy = |index| {
            vec![StrategyConfig {
                index,
                address: Address::repeat_byte(1),
            }]
        };

        let token = indexed_strategies_token(&strategy(127), &params, true).unwrap();
        assert_eq!(
            token,
            Token::Array(vec![Token::Tuple(vec![
                Token::Int(U256::from(127)),
                Token::Bytes(vec![0x00]),
            ])])
        );

        let result = indexed_strategies_token(&strategy(200), &params, true);
        assert!(matches!(
            result,
            Err(GovernanceError::InvalidStrategyIndex(200))
        ));

        // uint8 indices accept the full range
        assert!(indexed_strategies_token(&strategy(200), &params, false).is_ok());
    }
}
