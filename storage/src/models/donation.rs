use crate::page_token::PageTokenable;
use chrono::{serde::ts_nanoseconds, DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Lifecycle of a donation. A donation leaves `Pending` exactly once and
/// never transitions out of a terminal status.
#[derive(Clone, Copy, Debug, Eq, PartialEq, sqlx::Type)]
#[sqlx(type_name = "donation_status", rename_all = "lowercase")]
pub enum DonationStatus {
    Pending,
    Completed,
    Failed,
    Expired,
}

#[derive(Clone, Debug, FromRow, PartialEq)]
pub struct DonationRow {
    pub donation_id: Uuid,
    pub create_time: DateTime<Utc>,
    pub update_time: DateTime<Utc>,
    pub user_id: Uuid,
    pub org_id: Uuid,
    pub amount: Decimal,
    pub platform_fee: Decimal,
    pub payload_uuid: String,
    pub tx_hash: Option<String>,
    pub nftoken_id: Option<String>,
    pub status: DonationStatus,
}

impl DonationRow {
    pub fn is_terminal(&self) -> bool {
        self.status != DonationStatus::Pending
    }
}

pub struct NewDonationRow {
    pub create_time: DateTime<Utc>,
    pub update_time: DateTime<Utc>,
    pub user_id: Uuid,
    pub org_id: Uuid,
    pub amount: Decimal,
    pub platform_fee: Decimal,
    pub payload_uuid: String,
}

#[derive(Serialize, Deserialize)]
pub struct DonationPageToken {
    #[serde(with = "ts_nanoseconds")]
    pub create_time: DateTime<Utc>,
}

impl PageTokenable<DonationPageToken> for DonationRow {
    fn page_token(&self) -> DonationPageToken {
        DonationPageToken {
            create_time: self.create_time,
        }
    }
}
