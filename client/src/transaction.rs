//! Transaction signing and submission.
//!
//! [`TransactionSigner`] is the seam between the client and the network: it
//! reports the acting address, submits transactions, performs read-only calls
//! and fetches receipts. [`MiddlewareSigner`] implements it on top of any
//! `ethers` middleware stack.

use crate::config::NetworkConfig;
use crate::error::{GovernanceError, Result};
use crate::types::TransactionHash;
use async_trait::async_trait;
use ethers::middleware::SignerMiddleware;
use ethers::providers::{Http, Middleware, Provider};
use ethers::signers::{LocalWallet, Signer};
use ethers::types::transaction::eip2718::TypedTransaction;
use ethers::types::{Address, Bytes, Eip1559TransactionRequest, TransactionReceipt};
use std::sync::Arc;
use tracing::{debug, info};

/// Identity that can submit transactions and read chain state
#[async_trait]
pub trait TransactionSigner: Send + Sync {
    /// Address transactions are sent from
    async fn address(&self) -> Result<Address>;

    /// Submit a transaction and return its hash without waiting for inclusion
    async fn send_transaction(&self, tx: TypedTransaction) -> Result<TransactionHash>;

    /// Execute a read-only call against the latest block
    async fn call(&self, tx: TypedTransaction) -> Result<Bytes>;

    /// Receipt of a mined transaction, `None` while pending
    async fn transaction_receipt(&self, hash: TransactionHash)
        -> Result<Option<TransactionReceipt>>;
}

/// Build a call to `to` carrying `data`
pub fn call_request(to: Address, data: Bytes) -> TypedTransaction {
    Eip1559TransactionRequest::new().to(to).data(data).into()
}

/// Build a contract creation transaction carrying `init_code`
pub fn deploy_request(init_code: Bytes) -> TypedTransaction {
    Eip1559TransactionRequest::new().data(init_code).into()
}

/// [`TransactionSigner`] backed by an `ethers` middleware
#[derive(Debug)]
pub struct MiddlewareSigner<M> {
    inner: Arc<M>,
}

impl<M> Clone for MiddlewareSigner<M> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<M: Middleware> MiddlewareSigner<M> {
    /// Wrap an existing middleware
    pub fn new(inner: Arc<M>) -> Self {
        Self { inner }
    }

    /// Underlying middleware
    pub fn inner(&self) -> &M {
        &self.inner
    }
}

/// Middleware stack produced by [`MiddlewareSigner::connect`]
pub type HttpSigner = SignerMiddleware<Provider<Http>, LocalWallet>;

impl MiddlewareSigner<HttpSigner> {
    /// Connect to the configured RPC endpoint with a local private key
    pub fn connect(config: &NetworkConfig, private_key: &str) -> Result<Self> {
        config.validate()?;

        let client = reqwest::Client::builder()
            .timeout(config.request_timeout())
            .build()?;
        let provider = Provider::new(Http::new_with_client(config.rpc_endpoint()?, client));

        let wallet = private_key
            .trim_start_matches("0x")
            .parse::<LocalWallet>()?
            .with_chain_id(config.chain_id);

        info!(
            "Connected signer {:?} to {} (chain {})",
            wallet.address(),
            config.rpc_url,
            config.chain_id
        );

        Ok(Self::new(Arc::new(SignerMiddleware::new(provider, wallet))))
    }
}

#[async_trait]
impl<M> TransactionSigner for MiddlewareSigner<M>
where
    M: Middleware + 'static,
    M::Error: 'static,
{
    async fn address(&self) -> Result<Address> {
        self.inner
            .default_sender()
            .ok_or(GovernanceError::MissingSender)
    }

    async fn send_transaction(&self, tx: TypedTransaction) -> Result<TransactionHash> {
        let pending = self
            .inner
            .send_transaction(tx, None)
            .await
            .map_err(GovernanceError::provider)?;
        let hash = *pending;

        debug!("Transaction submitted: {:?}", hash);
        Ok(hash)
    }

    async fn call(&self, tx: TypedTransaction) -> Result<Bytes> {
        self.inner
            .call(&tx, None)
            .await
            .map_err(GovernanceError::provider)
    }

    async fn transaction_receipt(
        &self,
        hash: TransactionHash,
    ) -> Result<Option<TransactionReceipt>> {
        self.inner
            .get_transaction_receipt(hash)
            .await
            .map_err(GovernanceError::provider)
    }
}
