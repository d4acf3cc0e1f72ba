use serde::{Deserialize, Serialize};

/// Receipt of a submitted transfer, as reported by the wallet client.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferReceipt {
    /// `true` if the transaction executed successfully.
    pub status: bool,
    pub logs: Vec<ReceiptLog>,
}

/// One event log emitted by the transaction.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReceiptLog {
    /// Hex-encoded topics, `0x`-prefixed.
    pub topics: Vec<String>,
    /// Hex-encoded log payload, `0x`-prefixed.
    pub data: String,
}

impl TransferReceipt {
    pub fn failed() -> Self {
        Self {
            status: false,
            logs: vec![],
        }
    }
}
