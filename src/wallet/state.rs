//! Concrete wallet over an explicit connection state.

use std::fmt;

use alloy::primitives::Address;
use alloy::signers::local::PrivateKeySigner;
use alloy::signers::Signer;
use async_trait::async_trait;
use tracing::{debug, info};

use crate::config::Config;
use crate::error::WalletError;
use crate::metrics;

use super::{parse_private_key, SignedTransaction, UnsignedTransaction, WalletSigner};

/// Connection state of a wallet.
///
/// `Disconnected` carries only the public identity, so no signer is reachable
/// from it.
#[derive(Clone)]
pub enum WalletState {
    /// No usable signing capability.
    Disconnected {
        /// Public key identity.
        identity: Address,
    },
    /// Local key available for signing.
    Connected(PrivateKeySigner),
}

impl fmt::Debug for WalletState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WalletState::Disconnected { identity } => f
                .debug_struct("Disconnected")
                .field("identity", identity)
                .finish(),
            WalletState::Connected(signer) => f
                .debug_struct("Connected")
                .field("address", &signer.address())
                .finish(),
        }
    }
}

/// Wallet implementing [`WalletSigner`] according to its [`WalletState`].
#[derive(Debug, Clone)]
pub struct Wallet {
    state: WalletState,
}

impl Wallet {
    /// Connect with a hex-encoded private key.
    pub fn connect(private_key: &str) -> Result<Self, WalletError> {
        let signer = parse_private_key(private_key)?;
        info!(address = %signer.address(), "Wallet connected");
        Ok(Self::from_signer(signer))
    }

    /// Connect with an existing signer.
    pub fn from_signer(signer: PrivateKeySigner) -> Self {
        Self {
            state: WalletState::Connected(signer),
        }
    }

    /// A disconnected wallet presenting `identity`.
    pub fn disconnected(identity: Address) -> Self {
        Self {
            state: WalletState::Disconnected { identity },
        }
    }

    /// Connected wallet when a key is configured, mock wallet otherwise.
    pub fn from_config(config: &Config) -> Result<Self, WalletError> {
        match &config.wallet_private_key {
            Some(key) => Self::connect(key),
            None => Ok(super::MockWallet::new().into_wallet()),
        }
    }

    /// Drop the signer, keeping the public identity.
    pub fn disconnect(self) -> Self {
        Self::disconnected(self.public_key())
    }

    /// Whether signing can succeed.
    pub fn is_connected(&self) -> bool {
        matches!(self.state, WalletState::Connected(_))
    }

    /// Current state.
    pub fn state(&self) -> &WalletState {
        &self.state
    }

    fn reject(&self) -> WalletError {
        debug!(identity = %self.public_key(), "Signing rejected: wallet not connected");
        metrics::record_signing_rejection();
        WalletError::NotConnected
    }
}

async fn sign_with(
    signer: &PrivateKeySigner,
    transaction: &UnsignedTransaction,
) -> Result<SignedTransaction, WalletError> {
    let signature = signer
        .sign_message(&transaction.payload)
        .await
        .map_err(|e| WalletError::SigningFailed(e.to_string()))?;

    Ok(SignedTransaction {
        payload: transaction.payload.clone(),
        signature,
        signer: signer.address(),
    })
}

#[async_trait]
impl WalletSigner for Wallet {
    fn public_key(&self) -> Address {
        match &self.state {
            WalletState::Disconnected { identity } => *identity,
            WalletState::Connected(signer) => signer.address(),
        }
    }

    async fn sign_transaction(
        &self,
        transaction: &UnsignedTransaction,
    ) -> Result<SignedTransaction, WalletError> {
        let signer = match &self.state {
            WalletState::Disconnected { .. } => return Err(self.reject()),
            WalletState::Connected(signer) => signer,
        };

        let signed = sign_with(signer, transaction).await?;
        metrics::record_signatures_produced(1);
        Ok(signed)
    }

    async fn sign_all_transactions(
        &self,
        transactions: &[UnsignedTransaction],
    ) -> Result<Vec<SignedTransaction>, WalletError> {
        let signer = match &self.state {
            WalletState::Disconnected { .. } => return Err(self.reject()),
            WalletState::Connected(signer) => signer,
        };

        let mut signed = Vec::with_capacity(transactions.len());
        for transaction in transactions {
            signed.push(sign_with(signer, transaction).await?);
        }

        metrics::record_signatures_produced(signed.len());
        Ok(signed)
    }
}
