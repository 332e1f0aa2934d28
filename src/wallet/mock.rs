//! Mock wallet for contexts with no connected wallet.
//!
//! Every instance presents a freshly generated identity and refuses to sign.

use alloy::primitives::Address;
use alloy::signers::local::PrivateKeySigner;
use async_trait::async_trait;

use crate::error::WalletError;

use super::{SignedTransaction, UnsignedTransaction, Wallet, WalletSigner};

/// Permanently disconnected wallet with a throwaway key identity.
#[derive(Debug, Clone)]
pub struct MockWallet {
    inner: Wallet,
}

impl MockWallet {
    /// Generate a fresh identity. The secret key is discarded immediately.
    pub fn new() -> Self {
        let identity = PrivateKeySigner::random().address();
        Self {
            inner: Wallet::disconnected(identity),
        }
    }

    /// The underlying disconnected wallet.
    pub fn into_wallet(self) -> Wallet {
        self.inner
    }
}

impl Default for MockWallet {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl WalletSigner for MockWallet {
    fn public_key(&self) -> Address {
        self.inner.public_key()
    }

    async fn sign_transaction(
        &self,
        transaction: &UnsignedTransaction,
    ) -> Result<SignedTransaction, WalletError> {
        self.inner.sign_transaction(transaction).await
    }

    async fn sign_all_transactions(
        &self,
        transactions: &[UnsignedTransaction],
    ) -> Result<Vec<SignedTransaction>, WalletError> {
        self.inner.sign_all_transactions(transactions).await
    }
}
