pub mod client;

use async_trait::async_trait;
use serde_json::json;

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("request error: {0:?}")]
    Http(#[from] reqwest::Error),

    #[error("json deserialization error: {0:?}")]
    Json(#[from] serde_json::Error),

    #[error("xumm client error: status={status}, code={code}, reference={reference}")]
    ClientError {
        status: reqwest::StatusCode,
        code: i64,
        reference: String,
    },
}

/// A ledger operation a wallet holder is asked to approve out of band.
#[derive(Clone, Debug, PartialEq)]
pub enum TransactionIntent {
    /// XRP payment to a destination account; amount in drops.
    Payment { destination: String, drops: i64 },
    /// Wallet sign-in; carries no ledger effect.
    SignIn,
}

impl TransactionIntent {
    pub fn to_txjson(&self) -> serde_json::Value {
        match self {
            TransactionIntent::Payment { destination, drops } => json!({
                "TransactionType": "Payment",
                "Destination": destination,
                "Amount": drops.to_string(),
            }),
            TransactionIntent::SignIn => json!({
                "TransactionType": "SignIn",
            }),
        }
    }
}

#[derive(Clone, Debug)]
pub struct SigningOptions {
    /// Seconds until the request expires on the wallet side.
    pub expire_seconds: u32,
    /// Where the wallet redirects after resolution. UX only, not used for
    /// correctness.
    pub return_url: Option<String>,
}

impl Default for SigningOptions {
    fn default() -> Self {
        Self {
            expire_seconds: 300,
            return_url: None,
        }
    }
}

/// A created signing request, ready to be surfaced as a QR code or a deep
/// link.
#[derive(Clone, Debug, PartialEq)]
pub struct SigningRequest {
    pub uuid: String,
    pub qr_png_url: String,
    pub sign_link: String,
}

/// Resolution state of a signing request.
#[derive(Clone, Debug, PartialEq)]
pub enum SigningStatus {
    Pending,
    Signed {
        tx_hash: Option<String>,
        account: Option<String>,
    },
    Rejected,
    Expired,
}

/// Stateless facade over the out-of-band signing gateway. It does not
/// understand donation semantics, and repeated status queries for the same
/// uuid are side-effect free.
#[async_trait]
pub trait SigningBroker: Send + Sync {
    async fn create_signing_request(
        &self,
        intent: TransactionIntent,
        options: SigningOptions,
    ) -> Result<SigningRequest, Error>;

    async fn signing_request_status(&self, uuid: String) -> Result<SigningStatus, Error>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    pub fn payment_intent_serializes_drops_as_string() {
        let intent = TransactionIntent::Payment {
            destination: "rORGANIZATIONxxxxxxxxxxxxxxxxxxxxx".to_string(),
            drops: 9_500_000,
        };
        assert_eq!(
            intent.to_txjson(),
            serde_json::json!({
                "TransactionType": "Payment",
                "Destination": "rORGANIZATIONxxxxxxxxxxxxxxxxxxxxx",
                "Amount": "9500000",
            })
        );
    }
}
