use super::{AffectedNode, Error as LedgerError, LedgerGateway, TransactionMeta};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::{collections::HashSet, sync::Arc};

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("ledger gateway failed: {0}")]
    Gateway(#[from] LedgerError),

    #[error("mint transaction failed: {result}")]
    Mint { result: String },

    #[error("offer transaction failed: {result}")]
    Offer { result: String },

    #[error("minted token id not found in transaction metadata")]
    TokenIdNotFound,

    #[error("offer id not found in transaction metadata")]
    OfferIdNotFound,
}

/// Metadata embedded in the minted token's on-chain URI payload.
#[derive(Clone, Debug, Serialize)]
pub struct NftMetadata {
    pub name: String,
    pub description: String,
    pub image: String,
    pub achievement_key: String,
    pub claimed_at: DateTime<Utc>,
}

/// Result of a completed mint-and-offer workflow.
#[derive(Clone, Debug, PartialEq)]
pub struct MintedNft {
    pub nftoken_id: String,
    pub offer_id: String,
    pub mint_tx_hash: String,
    pub offer_tx_hash: String,
}

/// Metadata-based strategies for locating the newly minted token id, tried
/// in order. The account-query fallback lives on the orchestrator because
/// it needs the gateway.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum TokenIdStrategy {
    /// First token entry of a freshly created token page.
    CreatedPage,
    /// A token present in a modified page's final fields but absent from
    /// its previous fields. Covers mints appended to an existing page,
    /// which produce no created node at all.
    ModifiedPageDiff,
}

pub const META_STRATEGIES: &[TokenIdStrategy] =
    &[TokenIdStrategy::CreatedPage, TokenIdStrategy::ModifiedPageDiff];

impl TokenIdStrategy {
    pub fn extract(&self, meta: &TransactionMeta) -> Option<String> {
        match self {
            TokenIdStrategy::CreatedPage => created_page_token(meta),
            TokenIdStrategy::ModifiedPageDiff => modified_page_diff_token(meta),
        }
    }
}

fn created_page_token(meta: &TransactionMeta) -> Option<String> {
    for node in &meta.affected_nodes {
        if let AffectedNode::Created(created) = node {
            if created.ledger_entry_type != "NFTokenPage" {
                continue;
            }
            if let Some(entry) = created.new_fields.nftokens.first() {
                return Some(entry.nftoken.nftoken_id.clone());
            }
        }
    }
    None
}

fn modified_page_diff_token(meta: &TransactionMeta) -> Option<String> {
    for node in &meta.affected_nodes {
        if let AffectedNode::Modified(modified) = node {
            if modified.ledger_entry_type != "NFTokenPage" {
                continue;
            }
            let previous: HashSet<&str> = modified
                .previous_fields
                .nftokens
                .iter()
                .map(|entry| entry.nftoken.nftoken_id.as_str())
                .collect();
            for entry in &modified.final_fields.nftokens {
                if !previous.contains(entry.nftoken.nftoken_id.as_str()) {
                    return Some(entry.nftoken.nftoken_id.clone());
                }
            }
        }
    }
    None
}

/// Runs the metadata strategies in order and returns the first match.
pub fn extract_minted_token_id(meta: &TransactionMeta) -> Option<String> {
    META_STRATEGIES
        .iter()
        .find_map(|strategy| strategy.extract(meta))
}

/// The offer id is the ledger index of the first created offer entry.
pub fn extract_created_offer_id(meta: &TransactionMeta) -> Option<String> {
    for node in &meta.affected_nodes {
        if let AffectedNode::Created(created) = node {
            if created.ledger_entry_type == "NFTokenOffer" {
                return Some(created.ledger_index.clone());
            }
        }
    }
    None
}

/// Two-phase achievement NFT workflow: mint from the platform account,
/// then open a zero-price transfer offer to the receiver. Not resumable
/// between phases; when the offer fails the minted token stays with the
/// platform account and the error carries the ledger result for support.
pub struct NftMinter {
    ledger: Arc<dyn LedgerGateway>,
    minter_address: String,
}

impl NftMinter {
    pub fn new(ledger: Arc<dyn LedgerGateway>, minter_address: String) -> Self {
        Self {
            ledger,
            minter_address,
        }
    }

    pub async fn mint_and_offer(
        &self,
        receiver_address: String,
        metadata: &NftMetadata,
    ) -> Result<MintedNft, Error> {
        let uri = hex::encode_upper(serde_json::to_vec(metadata).map_err(LedgerError::Json)?);

        let mint = self
            .ledger
            .submit_and_wait(serde_json::json!({
                "TransactionType": "NFTokenMint",
                "Account": self.minter_address,
                "URI": uri,
                // Transferable; the taxon carries no meaning here.
                "Flags": 8,
                "NFTokenTaxon": 0,
            }))
            .await?;
        if !mint.meta.is_success() {
            return Err(Error::Mint {
                result: mint.meta.transaction_result,
            });
        }

        let nftoken_id = match extract_minted_token_id(&mint.meta) {
            Some(nftoken_id) => nftoken_id,
            None => self
                .latest_account_token()
                .await?
                .ok_or(Error::TokenIdNotFound)?,
        };
        log::info!("minted nftoken {} in tx {}", nftoken_id, mint.hash);

        let offer = self
            .ledger
            .submit_and_wait(serde_json::json!({
                "TransactionType": "NFTokenCreateOffer",
                "Account": self.minter_address,
                "NFTokenID": nftoken_id,
                // Zero-price sell offer, claimable only by the receiver.
                "Amount": "0",
                "Destination": receiver_address,
                "Flags": 1,
            }))
            .await?;
        if !offer.meta.is_success() {
            return Err(Error::Offer {
                result: offer.meta.transaction_result,
            });
        }

        let offer_id = extract_created_offer_id(&offer.meta).ok_or(Error::OfferIdNotFound)?;

        Ok(MintedNft {
            nftoken_id,
            offer_id,
            mint_tx_hash: mint.hash,
            offer_tx_hash: offer.hash,
        })
    }

    // Last-resort fallback: query the minting account's current token list
    // and take the most recently numbered entry.
    async fn latest_account_token(&self) -> Result<Option<String>, Error> {
        let mut nftokens = self
            .ledger
            .account_nftokens(self.minter_address.clone())
            .await?;
        nftokens.sort_by(|a, b| b.nft_serial.cmp(&a.nft_serial));
        Ok(nftokens.first().map(|nftoken| nftoken.nftoken_id.clone()))
    }
}
