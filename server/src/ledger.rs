pub mod client;
pub mod nftoken;

use async_trait::async_trait;
use serde::Deserialize;

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("request error: {0:?}")]
    Http(#[from] reqwest::Error),

    #[error("json deserialization error: {0:?}")]
    Json(#[from] serde_json::Error),

    #[error("ledger rpc error: {error}: {message}")]
    Rpc { error: String, message: String },

    #[error("transaction {hash} not validated after {attempts} attempts")]
    FinalityTimeout { hash: String, attempts: u32 },
}

/// Final state of a submitted transaction, as reported by the ledger once
/// the transaction is validated.
#[derive(Clone, Debug, Deserialize)]
pub struct FinalizedTransaction {
    pub hash: String,
    pub meta: TransactionMeta,
}

/// The `meta` object the ledger attaches to a validated transaction.
#[derive(Clone, Debug, Deserialize)]
pub struct TransactionMeta {
    #[serde(rename = "TransactionResult")]
    pub transaction_result: String,
    #[serde(rename = "AffectedNodes", default)]
    pub affected_nodes: Vec<AffectedNode>,
}

impl TransactionMeta {
    pub fn is_success(&self) -> bool {
        self.transaction_result == "tesSUCCESS"
    }
}

/// One entry of the ledger's affected-node list. Each entry is an object
/// with a single key naming the mutation kind.
#[derive(Clone, Debug, Deserialize)]
pub enum AffectedNode {
    #[serde(rename = "CreatedNode")]
    Created(CreatedNode),
    #[serde(rename = "ModifiedNode")]
    Modified(ModifiedNode),
    #[serde(rename = "DeletedNode")]
    Deleted(serde_json::Value),
}

#[derive(Clone, Debug, Deserialize)]
pub struct CreatedNode {
    #[serde(rename = "LedgerEntryType")]
    pub ledger_entry_type: String,
    #[serde(rename = "LedgerIndex")]
    pub ledger_index: String,
    #[serde(rename = "NewFields", default)]
    pub new_fields: NodeFields,
}

#[derive(Clone, Debug, Deserialize)]
pub struct ModifiedNode {
    #[serde(rename = "LedgerEntryType")]
    pub ledger_entry_type: String,
    #[serde(rename = "FinalFields", default)]
    pub final_fields: NodeFields,
    #[serde(rename = "PreviousFields", default)]
    pub previous_fields: NodeFields,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct NodeFields {
    #[serde(rename = "NFTokens", default)]
    pub nftokens: Vec<NfTokenEntry>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct NfTokenEntry {
    #[serde(rename = "NFToken")]
    pub nftoken: NfToken,
}

#[derive(Clone, Debug, Deserialize)]
pub struct NfToken {
    #[serde(rename = "NFTokenID")]
    pub nftoken_id: String,
    #[serde(rename = "URI", default)]
    pub uri: Option<String>,
}

/// An NFT held by an account, from the `account_nfts` method.
#[derive(Clone, Debug, Deserialize)]
pub struct AccountNfToken {
    #[serde(rename = "NFTokenID")]
    pub nftoken_id: String,
    pub nft_serial: u32,
}

/// Gateway to the distributed ledger: submits transactions, awaits
/// finality, and answers account queries.
#[async_trait]
pub trait LedgerGateway: Send + Sync {
    /// Signs and submits the given transaction from the platform account
    /// and waits until the ledger reports it validated.
    async fn submit_and_wait(
        &self,
        tx_json: serde_json::Value,
    ) -> Result<FinalizedTransaction, Error>;

    /// Lists the NFTs currently held by an account.
    async fn account_nftokens(&self, account: String) -> Result<Vec<AccountNfToken>, Error>;
}
