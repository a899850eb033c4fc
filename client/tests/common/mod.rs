//! Shared fixtures for the integration tests

#![allow(dead_code)]

use async_trait::async_trait;
use ethers::types::transaction::eip2718::TypedTransaction;
use ethers::types::{Address, Bytes, TransactionReceipt, H256};
use governance_tx_client::{
    AuthenticatorKind, GovernanceError, NetworkConfig, Result, StrategyKind, TransactionHash,
    TransactionSigner,
};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

pub const VOTER: &str = "0x0538d033b879ac94c709c1e408cc081345427379";
pub const METADATA_URI: &str = "ipfs://QmNrm6xKuib1THtWkiN5CKtBEerQCDpUtmgDqiaU2xDmca";

pub fn voter() -> Address {
    VOTER.parse().unwrap()
}

pub fn space() -> Address {
    Address::repeat_byte(0x51)
}

pub fn vanilla_authenticator() -> Address {
    Address::repeat_byte(0xa1)
}

pub fn eth_sig_authenticator() -> Address {
    Address::repeat_byte(0xa2)
}

pub fn eth_tx_authenticator() -> Address {
    Address::repeat_byte(0xa3)
}

pub fn vanilla_strategy() -> Address {
    Address::repeat_byte(0xb1)
}

pub fn comp_strategy() -> Address {
    Address::repeat_byte(0xb2)
}

pub fn proxy_factory() -> Address {
    Address::repeat_byte(0xf1)
}

pub fn master_space() -> Address {
    Address::repeat_byte(0xf2)
}

/// Local network with one of each authenticator and strategy
pub fn test_config() -> Arc<NetworkConfig> {
    Arc::new(
        NetworkConfig::custom(
            31337,
            "http://127.0.0.1:8545".to_string(),
            proxy_factory(),
            master_space(),
        )
        .unwrap()
        .with_tx_config(10, 1)
        .with_authenticator(vanilla_authenticator(), AuthenticatorKind::Vanilla)
        .with_authenticator(eth_sig_authenticator(), AuthenticatorKind::EthSig)
        .with_authenticator(eth_tx_authenticator(), AuthenticatorKind::EthTx)
        .with_strategy(vanilla_strategy(), StrategyKind::Vanilla)
        .with_strategy(comp_strategy(), StrategyKind::Comp),
    )
}

/// Signer that records every request and answers from canned responses
#[derive(Default)]
pub struct RecordingSigner {
    pub address: Address,
    pub sent: Mutex<Vec<TypedTransaction>>,
    pub calls: Mutex<Vec<TypedTransaction>>,
    pub call_responses: Mutex<VecDeque<Bytes>>,
    pub receipts: Mutex<VecDeque<Option<TransactionReceipt>>>,
    pub address_requests: AtomicUsize,
    pub receipt_requests: AtomicUsize,
}

impl RecordingSigner {
    pub fn new(address: Address) -> Self {
        Self {
            address,
            ..Default::default()
        }
    }

    pub fn push_call_response(&self, data: Bytes) {
        self.call_responses.lock().unwrap().push_back(data);
    }

    pub fn push_receipt(&self, receipt: Option<TransactionReceipt>) {
        self.receipts.lock().unwrap().push_back(receipt);
    }

    pub fn sent(&self) -> Vec<TypedTransaction> {
        self.sent.lock().unwrap().clone()
    }

    pub fn calls(&self) -> Vec<TypedTransaction> {
        self.calls.lock().unwrap().clone()
    }

    /// Number of requests that would have reached the network
    pub fn network_requests(&self) -> usize {
        self.address_requests.load(Ordering::SeqCst)
            + self.receipt_requests.load(Ordering::SeqCst)
            + self.sent.lock().unwrap().len()
            + self.calls.lock().unwrap().len()
    }
}

#[async_trait]
impl TransactionSigner for RecordingSigner {
    async fn address(&self) -> Result<Address> {
        self.address_requests.fetch_add(1, Ordering::SeqCst);
        Ok(self.address)
    }

    async fn send_transaction(&self, tx: TypedTransaction) -> Result<TransactionHash> {
        let mut sent = self.sent.lock().unwrap();
        sent.push(tx);
        Ok(H256::from_low_u64_be(sent.len() as u64))
    }

    async fn call(&self, tx: TypedTransaction) -> Result<Bytes> {
        self.calls.lock().unwrap().push(tx);
        self.call_responses
            .lock()
            .unwrap()
            .pop_front()
            .ok_or_else(|| GovernanceError::InvalidResponse("no canned call response".into()))
    }

    async fn transaction_receipt(
        &self,
        _hash: TransactionHash,
    ) -> Result<Option<TransactionReceipt>> {
        self.receipt_requests.fetch_add(1, Ordering::SeqCst);
        Ok(self.receipts.lock().unwrap().pop_front().flatten())
    }
}

/// Data of a recorded transaction
pub fn tx_data(tx: &TypedTransaction) -> Vec<u8> {
    tx.data().map(|data| data.to_vec()).unwrap_or_default()
}
