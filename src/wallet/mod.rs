//! Wallet signing contract and its implementations.
//!
//! Transaction-submission code depends only on [`WalletSigner`]. Concrete
//! wallets own their connection state:
//! - [`Wallet`]: `Connected` with a local key, or `Disconnected`
//! - [`MockWallet`]: permanently disconnected with a throwaway identity

pub mod mock;
pub mod state;

use alloy::primitives::{Address, Bytes, Signature};
use alloy::signers::local::PrivateKeySigner;
use async_trait::async_trait;

use crate::error::WalletError;

pub use mock::MockWallet;
pub use state::{Wallet, WalletState};

/// Capabilities every wallet provides.
#[async_trait]
pub trait WalletSigner: Send + Sync {
    /// Key identity, fixed for the lifetime of the wallet.
    fn public_key(&self) -> Address;

    /// Sign one transaction or fail. Never returns an unsigned transaction.
    async fn sign_transaction(
        &self,
        transaction: &UnsignedTransaction,
    ) -> Result<SignedTransaction, WalletError>;

    /// Sign a batch. Fails as a whole if any transaction cannot be signed.
    async fn sign_all_transactions(
        &self,
        transactions: &[UnsignedTransaction],
    ) -> Result<Vec<SignedTransaction>, WalletError>;
}

/// Serialized transaction awaiting a signature.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UnsignedTransaction {
    /// Opaque encoded transaction bytes.
    pub payload: Bytes,
}

impl UnsignedTransaction {
    /// Wrap encoded transaction bytes.
    pub fn new(payload: impl Into<Bytes>) -> Self {
        Self {
            payload: payload.into(),
        }
    }
}

/// A transaction together with the signature over its payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedTransaction {
    /// The signed bytes.
    pub payload: Bytes,
    /// Signature over the payload.
    pub signature: Signature,
    /// Address of the key that signed.
    pub signer: Address,
}

impl SignedTransaction {
    /// Recover the signing address from the signature.
    pub fn recover_signer(&self) -> Result<Address, WalletError> {
        self.signature
            .recover_address_from_msg(&self.payload)
            .map_err(|e| WalletError::SigningFailed(format!("signature recovery failed: {}", e)))
    }

    /// Whether the signature recovers to the recorded signer.
    pub fn verify(&self) -> bool {
        self.recover_signer().is_ok_and(|address| address == self.signer)
    }

    /// Signature as 0x-prefixed hex.
    pub fn signature_hex(&self) -> String {
        format!("0x{}", hex::encode(self.signature.as_bytes()))
    }
}

/// Parse a hex-encoded private key (with or without "0x") into a signer.
pub fn parse_private_key(private_key: &str) -> Result<PrivateKeySigner, WalletError> {
    let key = private_key.strip_prefix("0x").unwrap_or(private_key);
    let bytes = hex::decode(key)
        .map_err(|e| WalletError::InvalidKey(format!("invalid hex: {}", e)))?;

    if bytes.len() != 32 {
        return Err(WalletError::InvalidKey(format!(
            "expected 32 bytes, got {}",
            bytes.len()
        )));
    }

    let mut key_bytes = [0u8; 32];
    key_bytes.copy_from_slice(&bytes);

    PrivateKeySigner::from_bytes(&key_bytes.into())
        .map_err(|e| WalletError::InvalidKey(e.to_string()))
}
