use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use async_trait::async_trait;
use payline_crypto::ContentHasher;

use crate::client::{TransferSubmission, WalletClient};
use crate::error::{ChainError, ChainResult};
use crate::receipt::{ReceiptLog, TransferReceipt};

/// `keccak256("Transfer(address,address,uint256)")`, topic 0 of ERC-20 transfers.
pub const TRANSFER_EVENT_TOPIC: &str =
    "0xddf252ad1be2c89b69c2b068fc378daa952ba7f163c4a11628f55a4df523b3ef";

/// A transfer accepted by [`InMemoryWallet`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SubmittedTransfer {
    pub token: String,
    pub from: String,
    pub recipient: String,
    pub amount: u128,
    pub transaction_hash: String,
}

/// In-memory wallet client for tests, local demos, and embedding.
///
/// Every accepted transfer immediately gets a successful receipt carrying an
/// ERC-20 style `Transfer` log. Failures can be injected per recipient.
pub struct InMemoryWallet {
    accounts: Vec<String>,
    inner: Mutex<WalletState>,
}

#[derive(Default)]
struct WalletState {
    transfers: Vec<SubmittedTransfer>,
    receipts: HashMap<String, TransferReceipt>,
    rejected_recipients: HashSet<String>,
    reverted_recipients: HashSet<String>,
    withhold_receipts: bool,
}

impl InMemoryWallet {
    pub fn new(accounts: Vec<String>) -> Self {
        Self {
            accounts,
            inner: Mutex::new(WalletState::default()),
        }
    }

    /// A wallet with a single sending account.
    pub fn with_account(account: impl Into<String>) -> Self {
        Self::new(vec![account.into()])
    }

    /// Refuse to broadcast transfers to `recipient`.
    pub fn reject_recipient(&self, recipient: impl Into<String>) {
        self.lock().rejected_recipients.insert(recipient.into());
    }

    /// Broadcast transfers to `recipient` but report them as reverted.
    pub fn revert_recipient(&self, recipient: impl Into<String>) {
        self.lock().reverted_recipients.insert(recipient.into());
    }

    /// Never return receipts, as if transactions were still pending.
    pub fn withhold_receipts(&self) {
        self.lock().withhold_receipts = true;
    }

    /// Transfers broadcast so far, in order.
    pub fn transfers(&self) -> Vec<SubmittedTransfer> {
        self.lock().transfers.clone()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, WalletState> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[async_trait]
impl WalletClient for InMemoryWallet {
    async fn request_accounts(&self) -> ChainResult<Vec<String>> {
        Ok(self.accounts.clone())
    }

    async fn submit_transfer(
        &self,
        token: &str,
        from: &str,
        recipient: &str,
        amount: u128,
    ) -> ChainResult<TransferSubmission> {
        let mut state = self.lock();
        if state.rejected_recipients.contains(recipient) {
            return Err(ChainError::Client(format!(
                "transfer to {recipient} rejected by wallet"
            )));
        }

        let nonce = state.transfers.len();
        let transaction_hash = format!(
            "0x{}",
            ContentHasher::digest_str(&format!("{token}:{from}:{recipient}:{amount}:{nonce}"))
        );
        let receipt = if state.reverted_recipients.contains(recipient) {
            TransferReceipt::failed()
        } else {
            TransferReceipt {
                status: true,
                logs: vec![ReceiptLog {
                    topics: vec![
                        TRANSFER_EVENT_TOPIC.to_string(),
                        address_topic(from),
                        address_topic(recipient),
                    ],
                    data: format!("0x{amount:064x}"),
                }],
            }
        };
        state.receipts.insert(transaction_hash.clone(), receipt);
        state.transfers.push(SubmittedTransfer {
            token: token.to_string(),
            from: from.to_string(),
            recipient: recipient.to_string(),
            amount,
            transaction_hash: transaction_hash.clone(),
        });
        Ok(TransferSubmission { transaction_hash })
    }

    async fn get_transaction_receipt(
        &self,
        transaction_hash: &str,
    ) -> ChainResult<Option<TransferReceipt>> {
        let state = self.lock();
        if state.withhold_receipts {
            return Ok(None);
        }
        Ok(state.receipts.get(transaction_hash).cloned())
    }
}

/// Left-pad an address to a 32-byte topic, lowercased like node output.
fn address_topic(address: &str) -> String {
    let bare = address.strip_prefix("0x").unwrap_or(address);
    format!("0x{:0>64}", bare.to_ascii_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn accepted_transfer_has_transfer_log() {
        let wallet = InMemoryWallet::with_account("0xaaaa");
        let submission = wallet
            .submit_transfer("0xtoken", "0xaaaa", "0xBBBB", 10_000)
            .await
            .unwrap();
        assert!(submission.transaction_hash.starts_with("0x"));
        assert_eq!(submission.transaction_hash.len(), 66);

        let receipt = wallet
            .get_transaction_receipt(&submission.transaction_hash)
            .await
            .unwrap()
            .unwrap();
        assert!(receipt.status);
        let log = &receipt.logs[0];
        assert_eq!(log.topics[0], TRANSFER_EVENT_TOPIC);
        assert!(log.topics[2].ends_with("bbbb"));
        assert!(log.data.ends_with("2710"));
        assert_eq!(wallet.transfers().len(), 1);
    }

    #[tokio::test]
    async fn identical_transfers_get_distinct_hashes() {
        let wallet = InMemoryWallet::with_account("0xaaaa");
        let a = wallet.submit_transfer("0xt", "0xaaaa", "0xb", 1).await.unwrap();
        let b = wallet.submit_transfer("0xt", "0xaaaa", "0xb", 1).await.unwrap();
        assert_ne!(a.transaction_hash, b.transaction_hash);
    }

    #[tokio::test]
    async fn rejected_recipient_errors() {
        let wallet = InMemoryWallet::with_account("0xaaaa");
        wallet.reject_recipient("0xb");
        assert!(matches!(
            wallet.submit_transfer("0xt", "0xaaaa", "0xb", 1).await,
            Err(ChainError::Client(_))
        ));
        assert!(wallet.transfers().is_empty());
    }

    #[tokio::test]
    async fn reverted_and_withheld_receipts() {
        let wallet = InMemoryWallet::with_account("0xaaaa");
        wallet.revert_recipient("0xb");
        let tx = wallet.submit_transfer("0xt", "0xaaaa", "0xb", 1).await.unwrap();
        let receipt = wallet.get_transaction_receipt(&tx.transaction_hash).await.unwrap();
        assert_eq!(receipt, Some(TransferReceipt::failed()));

        wallet.withhold_receipts();
        assert_eq!(wallet.get_transaction_receipt(&tx.transaction_hash).await.unwrap(), None);
    }

    #[tokio::test]
    async fn unknown_hash_has_no_receipt() {
        let wallet = InMemoryWallet::new(vec![]);
        assert!(wallet.request_accounts().await.unwrap().is_empty());
        assert_eq!(wallet.get_transaction_receipt("0xdead").await.unwrap(), None);
    }

    #[test]
    fn address_topic_pads_and_lowercases() {
        let topic = address_topic("0xABCD");
        assert_eq!(topic.len(), 66);
        assert!(topic.ends_with("000abcd"));
    }
}
