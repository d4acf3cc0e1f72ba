use crate::config::base_units;
use crate::receipt::TransferReceipt;

/// Best-effort check that a receipt reflects an expected transfer.
///
/// This is a substring heuristic over the receipt logs, not a proof of
/// payment. A `false` result means "unverified"; it does not mean the
/// transfer did not happen.
///
/// A receipt passes when it exists, succeeded, has at least one log, and
/// some log either has a topic containing the recipient address without its
/// two-character prefix, or has data containing the lowercase hex of
/// `expected_cents * 10^(decimals - 2)`. Matching is case-sensitive.
#[derive(Clone, Copy, Debug)]
pub struct TransactionVerifier {
    decimals: u32,
}

impl TransactionVerifier {
    pub fn new(decimals: u32) -> Self {
        Self { decimals }
    }

    pub fn verify(
        &self,
        receipt: Option<&TransferReceipt>,
        expected_recipient: &str,
        expected_cents: i64,
    ) -> bool {
        let Some(receipt) = receipt else {
            return false;
        };
        if !receipt.status || receipt.logs.is_empty() {
            return false;
        }

        let address_needle = expected_recipient.get(2..).filter(|s| !s.is_empty());
        let amount_needle = base_units(expected_cents, self.decimals)
            .ok()
            .map(|units| format!("{units:x}"));

        receipt.logs.iter().any(|log| {
            let topic_hit = address_needle
                .map_or(false, |needle| log.topics.iter().any(|t| t.contains(needle)));
            let data_hit = amount_needle
                .as_deref()
                .map_or(false, |needle| log.data.contains(needle));
            topic_hit || data_hit
        })
    }
}
