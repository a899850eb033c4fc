//! Common types used across the governance client.
//!
//! Envelopes and their payloads mirror the messages produced by the signing
//! side, so they (de)serialize with camelCase field names.

use ethers::types::{Address, Bytes, TxHash, H256, U256};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Transaction hash returned for every submitted call
pub type TransactionHash = TxHash;

/// Signature attached to an envelope by the signing side
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignatureData {
    /// Address that produced the signature
    pub address: Address,
    /// 65-byte `r || s || v` signature
    pub signature: Bytes,
    /// Salt of the signed message
    #[serde(default)]
    pub salt: U256,
}

/// Signed message bundle
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Envelope<T> {
    /// Signature data, absent for transaction-based authentication
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signature_data: Option<SignatureData>,
    /// Action payload
    pub data: T,
}

impl<T> Envelope<T> {
    /// Envelope without signature data
    pub fn unsigned(data: T) -> Self {
        Self {
            signature_data: None,
            data,
        }
    }

    /// Address embedded in the signature data, if any
    pub fn embedded_address(&self) -> Option<Address> {
        self.signature_data.as_ref().map(|sig| sig.address)
    }
}

/// Contract reference with its configuration parameters
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddressConfig {
    /// Contract address
    #[serde(alias = "addr")]
    pub address: Address,
    /// ABI-encoded parameters
    #[serde(default)]
    pub params: Bytes,
}

/// Voting strategy selected by its index in the space's strategy list
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StrategyConfig {
    /// Index of the strategy in the space
    pub index: u8,
    /// Strategy contract address
    pub address: Address,
}

/// Payload of a propose envelope
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProposeData {
    /// Space receiving the proposal
    pub space: Address,
    /// Authenticator routing the call
    pub authenticator: Address,
    /// Proposal validation strategies, in order
    pub strategies: Vec<StrategyConfig>,
    /// Execution strategy and its payload
    pub execution_strategy: AddressConfig,
    /// Proposal metadata URI
    pub metadata_uri: String,
}

/// Vote choice
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum Choice {
    /// Vote against
    Against = 0,
    /// Vote for
    For = 1,
    /// Abstain
    Abstain = 2,
}

impl From<Choice> for u8 {
    fn from(choice: Choice) -> Self {
        choice as u8
    }
}

impl TryFrom<u8> for Choice {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Choice::Against),
            1 => Ok(Choice::For),
            2 => Ok(Choice::Abstain),
            other => Err(format!("invalid choice: {}", other)),
        }
    }
}

/// Payload of a vote envelope
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VoteData {
    /// Space holding the proposal
    pub space: Address,
    /// Authenticator routing the call
    pub authenticator: Address,
    /// Voting strategies, in order
    pub strategies: Vec<StrategyConfig>,
    /// Proposal id
    pub proposal: U256,
    /// Vote choice
    pub choice: Choice,
    /// Vote metadata URI
    #[serde(default)]
    pub metadata_uri: String,
}

/// Parameters of a new space
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeploySpaceParams {
    /// Space owner
    pub controller: Address,
    /// Delay before voting starts (seconds)
    pub voting_delay: u32,
    /// Minimum voting duration (seconds)
    pub min_voting_duration: u32,
    /// Maximum voting duration (seconds)
    pub max_voting_duration: u32,
    /// Strategy gating who may propose
    pub proposal_validation_strategy: AddressConfig,
    /// Space metadata URI
    pub metadata_uri: String,
    /// Whitelisted authenticators
    pub authenticators: Vec<Address>,
    /// Voting strategies, in order
    pub voting_strategies: Vec<AddressConfig>,
    /// Metadata URI for each voting strategy
    pub voting_strategies_metadata: Vec<String>,
}

/// Result of a space deployment
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeploySpaceResult {
    /// Deterministic address of the new space proxy
    pub space_address: Address,
    /// Hash of the deployment transaction
    pub tx_id: TransactionHash,
    /// Salt used for the deployment
    pub salt: H256,
}

/// Proposal lifecycle status as reported by the space
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProposalStatus {
    /// Waiting for the voting delay to pass
    VotingDelay,
    /// Voting is open
    VotingPeriod,
    /// Voting is open and the proposal already passes
    VotingPeriodAccepted,
    /// Voting closed, proposal accepted
    Accepted,
    /// Proposal executed
    Executed,
    /// Voting closed, proposal rejected
    Rejected,
    /// Proposal cancelled
    Cancelled,
}

impl TryFrom<u8> for ProposalStatus {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(ProposalStatus::VotingDelay),
            1 => Ok(ProposalStatus::VotingPeriod),
            2 => Ok(ProposalStatus::VotingPeriodAccepted),
            3 => Ok(ProposalStatus::Accepted),
            4 => Ok(ProposalStatus::Executed),
            5 => Ok(ProposalStatus::Rejected),
            6 => Ok(ProposalStatus::Cancelled),
            other => Err(format!("unknown proposal status: {}", other)),
        }
    }
}

impl fmt::Display for ProposalStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProposalStatus::VotingDelay => write!(f, "VOTING_DELAY"),
            ProposalStatus::VotingPeriod => write!(f, "VOTING_PERIOD"),
            ProposalStatus::VotingPeriodAccepted => write!(f, "VOTING_PERIOD_ACCEPTED"),
            ProposalStatus::Accepted => write!(f, "ACCEPTED"),
            ProposalStatus::Executed => write!(f, "EXECUTED"),
            ProposalStatus::Rejected => write!(f, "REJECTED"),
            ProposalStatus::Cancelled => write!(f, "CANCELLED"),
        }
    }
}

/// Proposal as stored by the space
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Proposal {
    /// Timestamp voting power is measured at
    pub snapshot_timestamp: u32,
    /// Voting start
    pub start_timestamp: u32,
    /// Earliest voting end
    pub min_end_timestamp: u32,
    /// Latest voting end
    pub max_end_timestamp: u32,
    /// Hash of the execution payload
    pub execution_payload_hash: H256,
    /// Execution strategy contract
    pub execution_strategy: Address,
    /// Proposal author
    pub author: Address,
    /// Raw finalization status
    pub finalization_status: u8,
    /// Bitmap of voting strategies active at creation
    pub active_voting_strategies: U256,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_choice_conversion() {
        assert_eq!(u8::from(Choice::For), 1);
        assert_eq!(Choice::try_from(2).unwrap(), Choice::Abstain);
        assert!(Choice::try_from(3).is_err());
    }

    #[test]
    fn test_proposal_status_display() {
        assert_eq!(ProposalStatus::VotingDelay.to_string(), "VOTING_DELAY");
        assert_eq!(ProposalStatus::Executed.to_string(), "EXECUTED");
        assert_eq!(ProposalStatus::try_from(6).unwrap(), ProposalStatus::Cancelled);
        assert!(ProposalStatus::try_from(7).is_err());
    }

    #[test]
    fn test_vote_envelope_from_json() {
        let json = serde_json::json!({
            "signatureData": {
                "address": "0x0538d033b879ac94c709c1e408cc081345427379",
                "signature": "0x1234",
                "salt": "0x0"
            },
            "data": {
                "space": "0x1111111111111111111111111111111111111111",
                "authenticator": "0x2222222222222222222222222222222222222222",
                "strategies": [
                    {"index": 1, "address": "0x3333333333333333333333333333333333333333"}
                ],
                "proposal": "0x3",
                "choice": 1,
                "metadataUri": ""
            }
        });

        let envelope: Envelope<VoteData> = serde_json::from_value(json).unwrap();
        assert_eq!(envelope.data.proposal, U256::from(3));
        assert_eq!(envelope.data.choice, Choice::For);
        assert_eq!(envelope.data.strategies[0].index, 1);
        assert_eq!(
            envelope.embedded_address(),
            Some(
                "0x0538d033b879ac94c709c1e408cc081345427379"
                    .parse::<Address>()
                    .unwrap()
            )
        );
    }

    #[test]
    fn test_unsigned_envelope() {
        let envelope = Envelope::unsigned(AddressConfig::default());
        assert!(envelope.embedded_address().is_none());

        let json = serde_json::to_value(&envelope).unwrap();
        assert!(json.get("signatureData").is_none());
    }
}
