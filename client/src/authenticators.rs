//! Authenticator implementations.
//!
//! An authenticator contract verifies the acting party and forwards an
//! already encoded call into a space. Each kind knows the ABI of its
//! `authenticate` entry point and how to lay out its positional arguments.

use crate::abi::{self, ETH_SIG_AUTHENTICATOR_ABI, VANILLA_AUTHENTICATOR_ABI};
use crate::config::NetworkConfig;
use crate::error::{GovernanceError, Result};
use crate::types::SignatureData;
use ethers::abi::{Abi, Token};
use ethers::types::{Address, Bytes, Signature, SignatureError, U256};
use serde::{Deserialize, Serialize};

/// Authenticator implementation selected by contract address
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum AuthenticatorKind {
    /// No verification
    Vanilla,
    /// EIP-712 signature verification
    EthSig,
    /// `msg.sender` must be the author or voter
    EthTx,
}

/// ABI and arguments for an `authenticate` call
#[derive(Debug, Clone)]
pub struct AuthenticatorCall {
    /// Authenticator ABI
    pub abi: Abi,
    /// Positional arguments of `authenticate`
    pub args: Vec<Token>,
}

impl AuthenticatorCall {
    /// Encoded `authenticate` call data
    pub fn encode(&self) -> Result<Bytes> {
        abi::encode_call(&self.abi, "authenticate", &self.args)
    }
}

impl AuthenticatorKind {
    /// Find the implementation registered for `address`
    pub fn lookup(address: Address, config: &NetworkConfig) -> Option<Self> {
        config.authenticators.get(&address).copied()
    }

    /// Short name used in logs and errors
    pub fn name(&self) -> &'static str {
        match self {
            AuthenticatorKind::Vanilla => "vanilla",
            AuthenticatorKind::EthSig => "ethSig",
            AuthenticatorKind::EthTx => "ethTx",
        }
    }

    /// Build the `authenticate` call wrapping `selector` and `calldata` for `space`
    pub fn create_call(
        &self,
        space: Address,
        signature_data: Option<&SignatureData>,
        selector: [u8; 4],
        calldata: Bytes,
    ) -> Result<AuthenticatorCall> {
        let forwarded = [
            Token::Address(space),
            Token::FixedBytes(selector.to_vec()),
            Token::Bytes(calldata.to_vec()),
        ];

        match self {
            AuthenticatorKind::Vanilla | AuthenticatorKind::EthTx => Ok(AuthenticatorCall {
                abi: abi::parse_abi(VANILLA_AUTHENTICATOR_ABI)?,
                args: forwarded.to_vec(),
            }),
            AuthenticatorKind::EthSig => {
                let signature_data =
                    signature_data.ok_or(GovernanceError::MissingSignature(self.name()))?;
                let signature = Signature::try_from(signature_data.signature.as_ref())?;

                let mut r = [0u8; 32];
                let mut s = [0u8; 32];
                signature.r.to_big_endian(&mut r);
                signature.s.to_big_endian(&mut s);

                let mut args = vec![
                    Token::Uint(U256::from(recovery_v(signature.v)?)),
                    Token::FixedBytes(r.to_vec()),
                    Token::FixedBytes(s.to_vec()),
                    Token::Uint(signature_data.salt),
                ];
                args.extend(forwarded);

                Ok(AuthenticatorCall {
                    abi: abi::parse_abi(ETH_SIG_AUTHENTICATOR_ABI)?,
                    args,
                })
            }
        }
    }
}

/// Ethereum-style `v`: raw recovery ids 0 and 1 become 27 and 28
fn recovery_v(v: u64) -> Result<u64> {
    match v {
        0 | 1 => Ok(v + 27),
        v if v < 27 => Err(SignatureError::RecoveryError.into()),
        v => Ok(v),
    }
}
