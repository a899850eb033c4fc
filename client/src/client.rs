//! Governance transaction client.
//!
//! [`GovernanceClient`] turns high-level governance actions into contract
//! calls. Space deployments go through the proxy factory, proposals and votes
//! are wrapped by the authenticator named in their envelope, and the remaining
//! space entry points are called directly.

use crate::abi::{
    self, address_array_token, address_config_token, indexed_strategies_token,
    AVATAR_EXECUTION_STRATEGY_ABI, PROXY_FACTORY_ABI, SPACE_ABI,
};
use crate::authenticators::AuthenticatorKind;
use crate::config::NetworkConfig;
use crate::error::{GovernanceError, Result};
use crate::monitor::{monitor_transaction, MonitorOptions};
use crate::strategies::{resolve_strategies_params, StrategyAction};
use crate::transaction::{call_request, deploy_request, TransactionSigner};
use crate::types::{
    DeploySpaceParams, DeploySpaceResult, Envelope, Proposal, ProposalStatus, ProposeData,
    SignatureData, TransactionHash, VoteData,
};
use ethers::abi::Token;
use ethers::types::{Address, Bytes, TransactionReceipt, H256, U256};
use rand::rngs::OsRng;
use rand::RngCore;
use std::sync::Arc;
use tracing::{debug, info};

/// Client for the space, proxy factory, execution strategy and authenticator contracts
#[derive(Debug, Clone)]
pub struct GovernanceClient {
    /// Network configuration
    config: Arc<NetworkConfig>,
    /// Creation bytecode of the avatar execution strategy
    avatar_execution_bytecode: Option<Bytes>,
}

/// Fresh 32-byte salt from the operating system RNG
pub fn random_salt() -> H256 {
    let mut salt = [0u8; 32];
    OsRng.fill_bytes(&mut salt);
    H256::from(salt)
}

/// Acting address of an envelope: the signature's address wins over the live signer
pub async fn resolve_actor<S>(embedded: Option<Address>, signer: &S) -> Result<Address>
where
    S: TransactionSigner + ?Sized,
{
    match embedded {
        Some(address) => Ok(address),
        None => signer.address().await,
    }
}

impl GovernanceClient {
    /// Create a new client, defaulting to the Goerli preset
    pub fn new(config: Option<Arc<NetworkConfig>>) -> Result<Self> {
        let config = config.unwrap_or_else(|| Arc::new(NetworkConfig::goerli()));
        config.validate()?;

        info!(
            "Initializing governance client for network: {:?}",
            config.network
        );

        Ok(Self {
            config,
            avatar_execution_bytecode: None,
        })
    }

    /// Supply the creation bytecode used by [`Self::deploy_avatar_execution`]
    pub fn with_avatar_execution_bytecode(mut self, bytecode: Bytes) -> Self {
        self.avatar_execution_bytecode = Some(bytecode);
        self
    }

    /// Get configuration
    pub fn config(&self) -> &NetworkConfig {
        &self.config
    }

    /// Deploy an avatar execution strategy and return its address
    pub async fn deploy_avatar_execution<S>(
        &self,
        signer: &S,
        controller: Address,
        target: Address,
        spaces: &[Address],
    ) -> Result<Address>
    where
        S: TransactionSigner + ?Sized,
    {
        info!(
            "Deploying avatar execution strategy (controller: {:?}, target: {:?})",
            controller, target
        );

        let bytecode = self
            .avatar_execution_bytecode
            .clone()
            .ok_or(GovernanceError::MissingBytecode("AvatarExecutionStrategy"))?;

        let abi = abi::parse_abi(AVATAR_EXECUTION_STRATEGY_ABI)?;
        let constructor = abi
            .constructor()
            .ok_or_else(|| ethers::abi::Error::InvalidName("constructor".to_string()))?;
        let init_code = constructor.encode_input(
            bytecode.to_vec(),
            &[
                Token::Address(controller),
                Token::Address(target),
                address_array_token(spaces),
            ],
        )?;

        let tx_hash = signer.send_transaction(deploy_request(init_code.into())).await?;
        let receipt = self.wait_for_receipt(signer, tx_hash).await?;

        receipt.contract_address.ok_or_else(|| {
            GovernanceError::InvalidResponse(format!(
                "Receipt of {:?} has no contract address",
                tx_hash
            ))
        })
    }

    /// Address the proxy factory assigns to a space deployed with `salt`
    pub async fn predict_space_address<S>(&self, signer: &S, salt: H256) -> Result<Address>
    where
        S: TransactionSigner + ?Sized,
    {
        let factory = abi::parse_abi(PROXY_FACTORY_ABI)?;
        let data = abi::encode_call(
            &factory,
            "predictProxyAddress",
            &[
                Token::Address(self.config.master_space),
                Token::FixedBytes(salt.as_bytes().to_vec()),
            ],
        )?;

        let output = signer
            .call(call_request(self.config.proxy_factory, data))
            .await?;
        let mut tokens = abi::decode_output(&factory, "predictProxyAddress", &output)?;

        tokens
            .pop()
            .and_then(Token::into_address)
            .ok_or_else(|| {
                GovernanceError::InvalidResponse("predictProxyAddress returned no address".into())
            })
    }

    /// Deploy a new space proxy under a fresh random salt
    pub async fn deploy_space<S>(
        &self,
        signer: &S,
        params: DeploySpaceParams,
    ) -> Result<DeploySpaceResult>
    where
        S: TransactionSigner + ?Sized,
    {
        let salt = random_salt();
        info!("Deploying space with salt {:?}", salt);

        let space_abi = abi::parse_abi(SPACE_ABI)?;
        let initializer = abi::encode_call(
            &space_abi,
            "initialize",
            &[
                Token::Address(params.controller),
                Token::Uint(U256::from(params.voting_delay)),
                Token::Uint(U256::from(params.min_voting_duration)),
                Token::Uint(U256::from(params.max_voting_duration)),
                address_config_token(&params.proposal_validation_strategy),
                Token::String(params.metadata_uri),
                Token::Array(
                    params
                        .voting_strategies
                        .iter()
                        .map(address_config_token)
                        .collect(),
                ),
                Token::Array(
                    params
                        .voting_strategies_metadata
                        .into_iter()
                        .map(Token::String)
                        .collect(),
                ),
                address_array_token(&params.authenticators),
            ],
        )?;

        let space_address = self.predict_space_address(signer, salt).await?;

        let factory = abi::parse_abi(PROXY_FACTORY_ABI)?;
        let data = abi::encode_call(
            &factory,
            "deployProxy",
            &[
                Token::Address(self.config.master_space),
                Token::Bytes(initializer.to_vec()),
                Token::FixedBytes(salt.as_bytes().to_vec()),
            ],
        )?;
        let tx_id = signer
            .send_transaction(call_request(self.config.proxy_factory, data))
            .await?;

        info!("Space {:?} deployment submitted: {:?}", space_address, tx_id);
        Ok(DeploySpaceResult {
            space_address,
            tx_id,
            salt,
        })
    }

    /// Create a proposal through the envelope's authenticator
    pub async fn propose<S>(
        &self,
        signer: &S,
        envelope: &Envelope<ProposeData>,
    ) -> Result<TransactionHash>
    where
        S: TransactionSigner + ?Sized,
    {
        let data = &envelope.data;
        let authenticator = self.authenticator(data.authenticator)?;
        if let Some(strategy) = data.strategies.iter().find(|s| s.index > i8::MAX as u8) {
            return Err(GovernanceError::InvalidStrategyIndex(strategy.index));
        }

        let author = resolve_actor(envelope.embedded_address(), signer).await?;
        info!("Proposing on space {:?} as {:?}", data.space, author);

        let strategies_params = resolve_strategies_params(
            StrategyAction::Propose,
            &data.strategies,
            author,
            &self.config,
        )
        .await?;

        let user_proposal_validation_params = ethers::abi::encode(&[indexed_strategies_token(
            &data.strategies,
            &strategies_params,
            true,
        )?]);

        let function_data = self.space_call(
            "propose",
            &[
                Token::Address(author),
                Token::String(data.metadata_uri.clone()),
                address_config_token(&data.execution_strategy),
                Token::Bytes(user_proposal_validation_params),
            ],
        )?;

        self.authenticate(
            signer,
            authenticator,
            data.authenticator,
            data.space,
            envelope.signature_data.as_ref(),
            function_data,
        )
        .await
    }

    /// Cast a vote through the envelope's authenticator
    pub async fn vote<S>(
        &self,
        signer: &S,
        envelope: &Envelope<VoteData>,
    ) -> Result<TransactionHash>
    where
        S: TransactionSigner + ?Sized,
    {
        let data = &envelope.data;
        let authenticator = self.authenticator(data.authenticator)?;

        let voter = resolve_actor(envelope.embedded_address(), signer).await?;
        info!(
            "Voting {:?} on proposal {} of space {:?} as {:?}",
            data.choice, data.proposal, data.space, voter
        );

        // Votes resolve their params with the propose action label.
        let strategies_params = resolve_strategies_params(
            StrategyAction::Propose,
            &data.strategies,
            voter,
            &self.config,
        )
        .await?;

        let function_data = self.space_call(
            "vote",
            &[
                Token::Address(voter),
                Token::Uint(data.proposal),
                Token::Uint(U256::from(u8::from(data.choice))),
                indexed_strategies_token(&data.strategies, &strategies_params, false)?,
                Token::String(data.metadata_uri.clone()),
            ],
        )?;

        self.authenticate(
            signer,
            authenticator,
            data.authenticator,
            data.space,
            envelope.signature_data.as_ref(),
            function_data,
        )
        .await
    }

    /// Execute an accepted proposal
    pub async fn execute<S>(
        &self,
        signer: &S,
        space: Address,
        proposal: U256,
        execution_params: Bytes,
    ) -> Result<TransactionHash>
    where
        S: TransactionSigner + ?Sized,
    {
        info!("Executing proposal {} on space {:?}", proposal, space);
        self.send_space_call(
            signer,
            space,
            "execute",
            &[Token::Uint(proposal), Token::Bytes(execution_params.to_vec())],
        )
        .await
    }

    /// Cancel a proposal
    pub async fn cancel<S>(
        &self,
        signer: &S,
        space: Address,
        proposal: U256,
    ) -> Result<TransactionHash>
    where
        S: TransactionSigner + ?Sized,
    {
        info!("Cancelling proposal {} on space {:?}", proposal, space);
        self.send_space_call(signer, space, "cancel", &[Token::Uint(proposal)])
            .await
    }

    /// Read a proposal
    pub async fn get_proposal<S>(
        &self,
        signer: &S,
        space: Address,
        proposal: U256,
    ) -> Result<Proposal>
    where
        S: TransactionSigner + ?Sized,
    {
        let tokens = self
            .read_space(signer, space, "getProposal", &[Token::Uint(proposal)])
            .await?;
        proposal_from_tokens(tokens)
    }

    /// Read the lifecycle status of a proposal
    pub async fn get_proposal_status<S>(
        &self,
        signer: &S,
        space: Address,
        proposal: U256,
    ) -> Result<ProposalStatus>
    where
        S: TransactionSigner + ?Sized,
    {
        let mut tokens = self
            .read_space(signer, space, "getProposalStatus", &[Token::Uint(proposal)])
            .await?;
        let raw = tokens.pop().and_then(Token::into_uint).ok_or_else(|| {
            GovernanceError::InvalidResponse("getProposalStatus returned no value".into())
        })?;

        let raw = narrow(raw, u8::MAX as u64, "proposal status")? as u8;
        ProposalStatus::try_from(raw).map_err(GovernanceError::InvalidResponse)
    }

    /// Update the maximum voting duration
    pub async fn set_max_voting_duration<S>(
        &self,
        signer: &S,
        space: Address,
        max_voting_duration: u32,
    ) -> Result<TransactionHash>
    where
        S: TransactionSigner + ?Sized,
    {
        self.send_space_call(
            signer,
            space,
            "setMaxVotingDuration",
            &[Token::Uint(U256::from(max_voting_duration))],
        )
        .await
    }

    /// Update the minimum voting duration
    pub async fn set_min_voting_duration<S>(
        &self,
        signer: &S,
        space: Address,
        min_voting_duration: u32,
    ) -> Result<TransactionHash>
    where
        S: TransactionSigner + ?Sized,
    {
        self.send_space_call(
            signer,
            space,
            "setMinVotingDuration",
            &[Token::Uint(U256::from(min_voting_duration))],
        )
        .await
    }

    /// Update the space metadata URI
    pub async fn set_metadata_uri<S>(
        &self,
        signer: &S,
        space: Address,
        metadata_uri: &str,
    ) -> Result<TransactionHash>
    where
        S: TransactionSigner + ?Sized,
    {
        self.send_space_call(
            signer,
            space,
            "setMetadataURI",
            &[Token::String(metadata_uri.to_string())],
        )
        .await
    }

    /// Update the voting delay
    pub async fn set_voting_delay<S>(
        &self,
        signer: &S,
        space: Address,
        voting_delay: u32,
    ) -> Result<TransactionHash>
    where
        S: TransactionSigner + ?Sized,
    {
        self.send_space_call(
            signer,
            space,
            "setVotingDelay",
            &[Token::Uint(U256::from(voting_delay))],
        )
        .await
    }

    /// Wait until `tx_hash` is mined successfully
    pub async fn wait_for_receipt<S>(
        &self,
        signer: &S,
        tx_hash: TransactionHash,
    ) -> Result<TransactionReceipt>
    where
        S: TransactionSigner + ?Sized,
    {
        let options = MonitorOptions::from_config(&self.config);
        monitor_transaction(signer, tx_hash, &options)
            .await?
            .into_receipt(tx_hash, options.timeout_secs)
    }

    fn authenticator(&self, address: Address) -> Result<AuthenticatorKind> {
        AuthenticatorKind::lookup(address, &self.config)
            .ok_or(GovernanceError::UnknownAuthenticator(address))
    }

    fn space_call(&self, name: &str, tokens: &[Token]) -> Result<Bytes> {
        let space_abi = abi::parse_abi(SPACE_ABI)?;
        abi::encode_call(&space_abi, name, tokens)
    }

    async fn authenticate<S>(
        &self,
        signer: &S,
        authenticator: AuthenticatorKind,
        authenticator_address: Address,
        space: Address,
        signature_data: Option<&SignatureData>,
        function_data: Bytes,
    ) -> Result<TransactionHash>
    where
        S: TransactionSigner + ?Sized,
    {
        let (selector, calldata) = abi::split_selector(&function_data)?;
        let call = authenticator.create_call(space, signature_data, selector, calldata)?;

        debug!(
            "Routing selector 0x{} through {} authenticator {:?}",
            selector.iter().map(|b| format!("{:02x}", b)).collect::<String>(),
            authenticator.name(),
            authenticator_address
        );

        signer
            .send_transaction(call_request(authenticator_address, call.encode()?))
            .await
    }

    async fn send_space_call<S>(
        &self,
        signer: &S,
        space: Address,
        name: &str,
        tokens: &[Token],
    ) -> Result<TransactionHash>
    where
        S: TransactionSigner + ?Sized,
    {
        let data = self.space_call(name, tokens)?;
        debug!("Calling {} on space {:?}", name, space);
        signer.send_transaction(call_request(space, data)).await
    }

    async fn read_space<S>(
        &self,
        signer: &S,
        space: Address,
        name: &str,
        tokens: &[Token],
    ) -> Result<Vec<Token>>
    where
        S: TransactionSigner + ?Sized,
    {
        let space_abi = abi::parse_abi(SPACE_ABI)?;
        let data = abi::encode_call(&space_abi, name, tokens)?;
        let output = signer.call(call_request(space, data)).await?;
        abi::decode_output(&space_abi, name, &output)
    }
}

fn narrow(value: U256, max: u64, field: &str) -> Result<u64> {
    if value > U256::from(max) {
        return Err(GovernanceError::InvalidResponse(format!(
            "{} out of range: {}",
            field, value
        )));
    }
    Ok(value.as_u64())
}

fn next_field(fields: &mut impl Iterator<Item = Token>, name: &str) -> Result<Token> {
    fields
        .next()
        .ok_or_else(|| GovernanceError::InvalidResponse(format!("missing proposal field {}", name)))
}

fn next_uint(fields: &mut impl Iterator<Item = Token>, name: &str) -> Result<U256> {
    next_field(fields, name)?
        .into_uint()
        .ok_or_else(|| GovernanceError::InvalidResponse(format!("{} is not a uint", name)))
}

fn next_u32(fields: &mut impl Iterator<Item = Token>, name: &str) -> Result<u32> {
    Ok(narrow(next_uint(fields, name)?, u32::MAX as u64, name)? as u32)
}

fn next_address(fields: &mut impl Iterator<Item = Token>, name: &str) -> Result<Address> {
    next_field(fields, name)?
        .into_address()
        .ok_or_else(|| GovernanceError::InvalidResponse(format!("{} is not an address", name)))
}

fn proposal_from_tokens(mut tokens: Vec<Token>) -> Result<Proposal> {
    let fields = tokens
        .pop()
        .and_then(Token::into_tuple)
        .ok_or_else(|| GovernanceError::InvalidResponse("getProposal returned no proposal".into()))?;
    let fields = &mut fields.into_iter();

    let snapshot_timestamp = next_u32(fields, "snapshotTimestamp")?;
    let start_timestamp = next_u32(fields, "startTimestamp")?;
    let min_end_timestamp = next_u32(fields, "minEndTimestamp")?;
    let max_end_timestamp = next_u32(fields, "maxEndTimestamp")?;

    let payload_hash = next_field(fields, "executionPayloadHash")?
        .into_fixed_bytes()
        .filter(|bytes| bytes.len() == 32)
        .ok_or_else(|| {
            GovernanceError::InvalidResponse("executionPayloadHash is not bytes32".into())
        })?;

    let execution_strategy = next_address(fields, "executionStrategy")?;
    let author = next_address(fields, "author")?;
    let finalization_status = narrow(
        next_uint(fields, "finalizationStatus")?,
        u8::MAX as u64,
        "finalizationStatus",
    )? as u8;
    let active_voting_strategies = next_uint(fields, "activeVotingStrategies")?;

    Ok(Proposal {
        snapshot_timestamp,
        start_timestamp,
        min_end_timestamp,
        max_end_timestamp,
        execution_payload_hash: H256::from_slice(&payload_hash),
        execution_strategy,
        author,
        finalization_status,
        active_voting_strategies,
    })
}
