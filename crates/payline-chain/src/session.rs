use std::future::Future;

use payline_ledger::{Ledger, LedgerEntry};
use serde::Serialize;
use tracing::{info, warn};

use crate::client::WalletClient;
use crate::config::ChainConfig;
use crate::error::{ChainError, ChainResult};
use crate::verifier::TransactionVerifier;

/// Result of paying out one ledger entry.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransferOutcome {
    pub recipient: String,
    pub cents: i64,
    pub amount_base_units: u128,
    /// `None` if the transfer was never broadcast.
    pub transaction_hash: Option<String>,
    pub verified: bool,
    /// Why the transfer is not verified, if it is not.
    pub warning: Option<String>,
}

impl TransferOutcome {
    fn unsent(entry: &LedgerEntry, amount_base_units: u128, warning: String) -> Self {
        Self {
            recipient: entry.address.clone(),
            cents: entry.cents,
            amount_base_units,
            transaction_hash: None,
            verified: false,
            warning: Some(warning),
        }
    }
}

/// Connection context for paying out ledgers through a wallet client.
///
/// Holds the client, the sending account chosen at connect time, and the
/// chain configuration. Allocation and auditing never need one.
pub struct TransferSession<C: WalletClient> {
    client: C,
    from: String,
    config: ChainConfig,
    verifier: TransactionVerifier,
}

impl<C: WalletClient> TransferSession<C> {
    /// Request the wallet's accounts and send from the first one.
    pub async fn connect(client: C, config: ChainConfig) -> ChainResult<Self> {
        if config.decimals < 2 {
            return Err(ChainError::UnsupportedDecimals(config.decimals));
        }
        let accounts = bounded(&config, "request_accounts", client.request_accounts()).await?;
        let from = accounts.into_iter().next().ok_or(ChainError::NoAccounts)?;
        info!(%from, token = %config.token_address, "wallet connected");
        Ok(Self {
            client,
            from,
            verifier: TransactionVerifier::new(config.decimals),
            config,
        })
    }

    /// The sending account.
    pub fn from(&self) -> &str {
        &self.from
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    /// Transfer every entry, one after another, verifying each receipt.
    ///
    /// Client failures and unverified receipts are reported on the entry's
    /// outcome and the payout continues with the next entry. Nothing is
    /// retried.
    pub async fn execute(&self, ledger: &Ledger) -> Vec<TransferOutcome> {
        let mut outcomes = Vec::with_capacity(ledger.entries.len());
        for entry in &ledger.entries {
            let outcome = self.transfer_entry(entry).await;
            if let Some(warning) = &outcome.warning {
                warn!(
                    recipient = %outcome.recipient,
                    tx = outcome.transaction_hash.as_deref().unwrap_or("-"),
                    "{warning}"
                );
            }
            outcomes.push(outcome);
        }
        info!(
            transfers = outcomes.len(),
            verified = outcomes.iter().filter(|o| o.verified).count(),
            "ledger payout finished"
        );
        outcomes
    }

    async fn transfer_entry(&self, entry: &LedgerEntry) -> TransferOutcome {
        let amount = match self.config.base_units(entry.cents) {
            Ok(amount) => amount,
            Err(e) => return TransferOutcome::unsent(entry, 0, e.to_string()),
        };

        let submission = bounded(
            &self.config,
            "submit_transfer",
            self.client.submit_transfer(
                &self.config.token_address,
                &self.from,
                &entry.address,
                amount,
            ),
        )
        .await;
        let tx_hash = match submission {
            Ok(s) => s.transaction_hash,
            Err(e) => return TransferOutcome::unsent(entry, amount, e.to_string()),
        };

        let receipt = bounded(
            &self.config,
            "get_transaction_receipt",
            self.client.get_transaction_receipt(&tx_hash),
        )
        .await;
        let (verified, warning) = match receipt {
            Ok(receipt) => {
                let verified = self
                    .verifier
                    .verify(receipt.as_ref(), &entry.address, entry.cents);
                let warning = match (&receipt, verified) {
                    (_, true) => None,
                    (None, false) => Some("no receipt available; transfer unverified".to_string()),
                    (Some(_), false) => {
                        Some("receipt does not match expected transfer; unverified".to_string())
                    }
                };
                (verified, warning)
            }
            Err(e) => (false, Some(format!("receipt fetch failed: {e}"))),
        };

        TransferOutcome {
            recipient: entry.address.clone(),
            cents: entry.cents,
            amount_base_units: amount,
            transaction_hash: Some(tx_hash),
            verified,
            warning,
        }
    }
}

async fn bounded<T>(
    config: &ChainConfig,
    operation: &'static str,
    call: impl Future<Output = ChainResult<T>>,
) -> ChainResult<T> {
    tokio::time::timeout(config.call_timeout(), call)
        .await
        .map_err(|_| ChainError::Timeout {
            operation,
            secs: config.call_timeout_secs,
        })?
}
