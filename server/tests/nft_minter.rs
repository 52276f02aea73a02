use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use mockall::Sequence;
use std::sync::Arc;
use xrpact_server::ledger::{
    nftoken::{Error as MintError, NftMetadata, NftMinter},
    AccountNfToken, Error as LedgerError, FinalizedTransaction, LedgerGateway, TransactionMeta,
};

mockall::mock! {
    Ledger {}

    #[async_trait]
    impl LedgerGateway for Ledger {
        async fn submit_and_wait(
            &self,
            tx_json: serde_json::Value,
        ) -> Result<FinalizedTransaction, LedgerError>;

        async fn account_nftokens(
            &self,
            account: String,
        ) -> Result<Vec<AccountNfToken>, LedgerError>;
    }
}

const MINTER: &str = "rMINTERxxxxxxxxxxxxxxxxxxxxxxxxxxx";
const RECEIVER: &str = "rDONATORxxxxxxxxxxxxxxxxxxxxxxxxxx";
const TOKEN_ID: &str = "000800006203F49C00000000000000000000000000000000000000000000001A";
const OFFER_ID: &str = "0102030405060708010203040506070801020304050607080102030405060708";

fn metadata() -> NftMetadata {
    NftMetadata {
        name: "First Donation - Achievement NFT".to_string(),
        description: "Made your first donation on XRPact".to_string(),
        image: "/achievements/first_donation.png".to_string(),
        achievement_key: "first_donation".to_string(),
        claimed_at: Utc.timestamp_opt(1000, 0).unwrap(),
    }
}

fn meta(value: serde_json::Value) -> TransactionMeta {
    serde_json::from_value(value).expect("fixture meta should deserialize")
}

fn created_page_mint_meta() -> TransactionMeta {
    meta(serde_json::json!({
        "TransactionResult": "tesSUCCESS",
        "AffectedNodes": [
            {
                "CreatedNode": {
                    "LedgerEntryType": "NFTokenPage",
                    "LedgerIndex": "AB12CD34EF56AB12CD34EF56AB12CD34EF56AB12CD34EF56AB12CD34EF56AB12",
                    "NewFields": {
                        "NFTokens": [ { "NFToken": { "NFTokenID": TOKEN_ID } } ]
                    }
                }
            }
        ]
    }))
}

fn opaque_mint_meta() -> TransactionMeta {
    // Success, but no token page information at all; forces the account
    // query fallback.
    meta(serde_json::json!({
        "TransactionResult": "tesSUCCESS",
        "AffectedNodes": [
            {
                "ModifiedNode": {
                    "LedgerEntryType": "AccountRoot",
                    "FinalFields": { "Sequence": 8 },
                    "PreviousFields": { "Sequence": 7 }
                }
            }
        ]
    }))
}

fn offer_meta(result: &str) -> TransactionMeta {
    meta(serde_json::json!({
        "TransactionResult": result,
        "AffectedNodes": [
            {
                "CreatedNode": {
                    "LedgerEntryType": "NFTokenOffer",
                    "LedgerIndex": OFFER_ID,
                    "NewFields": { "Amount": "0" }
                }
            }
        ]
    }))
}

#[tokio::test]
async fn mints_and_offers() -> Result<(), anyhow::Error> {
    let mut ledger = MockLedger::new();
    let mut seq = Sequence::new();
    ledger
        .expect_submit_and_wait()
        .withf(|tx_json| {
            tx_json["TransactionType"] == "NFTokenMint"
                && tx_json["Account"] == MINTER
                && tx_json["Flags"] == 8
                && tx_json["URI"].as_str().is_some_and(|uri| !uri.is_empty())
        })
        .times(1)
        .in_sequence(&mut seq)
        .return_once(|_| {
            Ok(FinalizedTransaction {
                hash: "MINTHASH".to_string(),
                meta: created_page_mint_meta(),
            })
        });
    ledger
        .expect_submit_and_wait()
        .withf(|tx_json| {
            tx_json["TransactionType"] == "NFTokenCreateOffer"
                && tx_json["NFTokenID"] == TOKEN_ID
                && tx_json["Amount"] == "0"
                && tx_json["Destination"] == RECEIVER
                && tx_json["Flags"] == 1
        })
        .times(1)
        .in_sequence(&mut seq)
        .return_once(|_| {
            Ok(FinalizedTransaction {
                hash: "OFFERHASH".to_string(),
                meta: offer_meta("tesSUCCESS"),
            })
        });

    let minter = NftMinter::new(Arc::new(ledger), MINTER.to_string());
    let minted = minter
        .mint_and_offer(RECEIVER.to_string(), &metadata())
        .await?;

    assert_eq!(minted.nftoken_id, TOKEN_ID);
    assert_eq!(minted.offer_id, OFFER_ID);
    assert_eq!(minted.mint_tx_hash, "MINTHASH");
    assert_eq!(minted.offer_tx_hash, "OFFERHASH");
    Ok(())
}

#[tokio::test]
async fn falls_back_to_account_query_for_token_id() -> Result<(), anyhow::Error> {
    let mut ledger = MockLedger::new();
    let mut seq = Sequence::new();
    ledger
        .expect_submit_and_wait()
        .times(1)
        .in_sequence(&mut seq)
        .return_once(|_| {
            Ok(FinalizedTransaction {
                hash: "MINTHASH".to_string(),
                meta: opaque_mint_meta(),
            })
        });
    // Highest serial wins: the most recent mint.
    ledger
        .expect_account_nftokens()
        .withf(|account| account == MINTER)
        .times(1)
        .in_sequence(&mut seq)
        .return_once(|_| {
            Ok(vec![
                AccountNfToken {
                    nftoken_id: "OLDER".to_string(),
                    nft_serial: 3,
                },
                AccountNfToken {
                    nftoken_id: TOKEN_ID.to_string(),
                    nft_serial: 7,
                },
            ])
        });
    ledger
        .expect_submit_and_wait()
        .withf(|tx_json| tx_json["NFTokenID"] == TOKEN_ID)
        .times(1)
        .in_sequence(&mut seq)
        .return_once(|_| {
            Ok(FinalizedTransaction {
                hash: "OFFERHASH".to_string(),
                meta: offer_meta("tesSUCCESS"),
            })
        });

    let minter = NftMinter::new(Arc::new(ledger), MINTER.to_string());
    let minted = minter
        .mint_and_offer(RECEIVER.to_string(), &metadata())
        .await?;

    assert_eq!(minted.nftoken_id, TOKEN_ID);
    Ok(())
}

#[tokio::test]
async fn empty_account_list_is_a_hard_failure() -> Result<(), anyhow::Error> {
    let mut ledger = MockLedger::new();
    let mut seq = Sequence::new();
    ledger
        .expect_submit_and_wait()
        .times(1)
        .in_sequence(&mut seq)
        .return_once(|_| {
            Ok(FinalizedTransaction {
                hash: "MINTHASH".to_string(),
                meta: opaque_mint_meta(),
            })
        });
    ledger
        .expect_account_nftokens()
        .times(1)
        .in_sequence(&mut seq)
        .return_once(|_| Ok(vec![]));

    let minter = NftMinter::new(Arc::new(ledger), MINTER.to_string());
    let error = minter
        .mint_and_offer(RECEIVER.to_string(), &metadata())
        .await
        .expect_err("all strategies exhausted");

    assert!(matches!(error, MintError::TokenIdNotFound));
    Ok(())
}

#[tokio::test]
async fn failed_mint_result_is_surfaced() -> Result<(), anyhow::Error> {
    let mut ledger = MockLedger::new();
    ledger.expect_submit_and_wait().times(1).return_once(|_| {
        Ok(FinalizedTransaction {
            hash: "MINTHASH".to_string(),
            meta: meta(serde_json::json!({
                "TransactionResult": "tecINSUFFICIENT_RESERVE",
                "AffectedNodes": []
            })),
        })
    });

    let minter = NftMinter::new(Arc::new(ledger), MINTER.to_string());
    let error = minter
        .mint_and_offer(RECEIVER.to_string(), &metadata())
        .await
        .expect_err("mint failure must surface");

    match error {
        MintError::Mint { result } => assert_eq!(result, "tecINSUFFICIENT_RESERVE"),
        other => panic!("expected mint error, got {:?}", other),
    }
    Ok(())
}

#[tokio::test]
async fn failed_offer_result_is_surfaced_after_successful_mint() -> Result<(), anyhow::Error> {
    let mut ledger = MockLedger::new();
    let mut seq = Sequence::new();
    ledger
        .expect_submit_and_wait()
        .times(1)
        .in_sequence(&mut seq)
        .return_once(|_| {
            Ok(FinalizedTransaction {
                hash: "MINTHASH".to_string(),
                meta: created_page_mint_meta(),
            })
        });
    ledger
        .expect_submit_and_wait()
        .times(1)
        .in_sequence(&mut seq)
        .return_once(|_| {
            Ok(FinalizedTransaction {
                hash: "OFFERHASH".to_string(),
                meta: meta(serde_json::json!({
                    "TransactionResult": "tecNO_PERMISSION",
                    "AffectedNodes": []
                })),
            })
        });

    let minter = NftMinter::new(Arc::new(ledger), MINTER.to_string());
    let error = minter
        .mint_and_offer(RECEIVER.to_string(), &metadata())
        .await
        .expect_err("offer failure must surface, the token already exists");

    match error {
        MintError::Offer { result } => assert_eq!(result, "tecNO_PERMISSION"),
        other => panic!("expected offer error, got {:?}", other),
    }
    Ok(())
}
