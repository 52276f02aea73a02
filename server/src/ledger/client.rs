use super::{AccountNfToken, Error, FinalizedTransaction, LedgerGateway, TransactionMeta};
use async_trait::async_trait;
use serde::{de::DeserializeOwned, Deserialize};
use serde_json::json;
use std::time::Duration;

/// JSON-RPC client for an XRPL node. Transactions are signed gateway-side
/// from the configured account secret (the `submit` method's
/// sign-and-submit mode), then polled via `tx` until validated.
pub struct XrplClient {
    http: reqwest::Client,
    json_rpc_url: String,
    secret: String,
    poll_interval: Duration,
    max_poll_attempts: u32,
}

#[derive(Deserialize)]
struct RpcEnvelope {
    result: serde_json::Value,
}

#[derive(Deserialize)]
struct SubmitResult {
    engine_result: String,
    tx_json: SubmittedTx,
}

#[derive(Deserialize)]
struct SubmittedTx {
    hash: String,
}

#[derive(Deserialize)]
struct TxResult {
    #[serde(default)]
    validated: bool,
    hash: String,
    meta: Option<TransactionMeta>,
}

#[derive(Deserialize)]
struct AccountNftsResult {
    account_nfts: Vec<AccountNfToken>,
}

impl XrplClient {
    pub fn new(json_rpc_url: String, secret: String) -> Self {
        Self {
            http: reqwest::Client::new(),
            json_rpc_url,
            secret,
            poll_interval: Duration::from_secs(1),
            max_poll_attempts: 20,
        }
    }

    async fn call<T: DeserializeOwned>(
        &self,
        method: &str,
        params: serde_json::Value,
    ) -> Result<T, Error> {
        let body = json!({
            "method": method,
            "params": [params],
        });
        let response = self.http.post(&self.json_rpc_url).json(&body).send().await?;
        let envelope = response.json::<RpcEnvelope>().await?;
        if envelope.result.get("status").and_then(|status| status.as_str()) == Some("error") {
            return Err(Error::Rpc {
                error: envelope
                    .result
                    .get("error")
                    .and_then(|error| error.as_str())
                    .unwrap_or("unknown")
                    .to_string(),
                message: envelope
                    .result
                    .get("error_message")
                    .and_then(|message| message.as_str())
                    .unwrap_or_default()
                    .to_string(),
            });
        }
        Ok(serde_json::from_value(envelope.result)?)
    }
}

#[async_trait]
impl LedgerGateway for XrplClient {
    async fn submit_and_wait(
        &self,
        tx_json: serde_json::Value,
    ) -> Result<FinalizedTransaction, Error> {
        let submit: SubmitResult = self
            .call(
                "submit",
                json!({
                    "secret": self.secret,
                    "tx_json": tx_json,
                }),
            )
            .await?;
        let hash = submit.tx_json.hash;
        // The engine result is preliminary; the terminal result is read from
        // the validated transaction's meta.
        log::debug!("submitted {} ({})", hash, submit.engine_result);

        for _ in 0..self.max_poll_attempts {
            tokio::time::sleep(self.poll_interval).await;
            match self
                .call::<TxResult>(
                    "tx",
                    json!({
                        "transaction": hash,
                        "binary": false,
                    }),
                )
                .await
            {
                Ok(tx) if tx.validated => {
                    if let Some(meta) = tx.meta {
                        return Ok(FinalizedTransaction { hash: tx.hash, meta });
                    }
                }
                // Not yet in a validated ledger, or the gateway does not
                // know the transaction yet (txnNotFound).
                Ok(_) | Err(Error::Rpc { .. }) => continue,
                Err(err) => return Err(err),
            }
        }
        Err(Error::FinalityTimeout {
            hash,
            attempts: self.max_poll_attempts,
        })
    }

    async fn account_nftokens(&self, account: String) -> Result<Vec<AccountNfToken>, Error> {
        let result: AccountNftsResult = self
            .call(
                "account_nfts",
                json!({
                    "account": account,
                }),
            )
            .await?;
        Ok(result.account_nfts)
    }
}
