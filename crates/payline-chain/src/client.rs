use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::ChainResult;
use crate::receipt::TransferReceipt;

/// Result of broadcasting a transfer.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferSubmission {
    pub transaction_hash: String,
}

/// Interface to an external wallet / chain client.
///
/// Implementations own key management, ABI encoding of the token's
/// `transfer(recipient, amount)` call, and broadcast.
#[async_trait]
pub trait WalletClient: Send + Sync {
    /// Connect and list the wallet's accounts. The first one sends.
    async fn request_accounts(&self) -> ChainResult<Vec<String>>;

    /// Broadcast `token.transfer(recipient, amount)` from `from`.
    async fn submit_transfer(
        &self,
        token: &str,
        from: &str,
        recipient: &str,
        amount: u128,
    ) -> ChainResult<TransferSubmission>;

    /// Fetch the receipt of a broadcast transaction, if one exists yet.
    async fn get_transaction_receipt(
        &self,
        transaction_hash: &str,
    ) -> ChainResult<Option<TransferReceipt>>;
}
