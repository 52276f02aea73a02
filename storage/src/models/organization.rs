use crate::page_token::PageTokenable;
use chrono::{serde::ts_nanoseconds, DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Clone, Debug, FromRow, PartialEq)]
pub struct OrganizationRow {
    pub org_id: Uuid,
    pub create_time: DateTime<Utc>,
    pub update_time: DateTime<Utc>,
    pub name: String,
    pub description: String,
    pub full_description: Option<String>,
    pub wallet_address: String,
    pub logo_url: Option<String>,
    pub banner_url: Option<String>,
    pub website: Option<String>,
    pub total_received: Decimal,
}

pub struct NewOrganizationRow {
    pub create_time: DateTime<Utc>,
    pub update_time: DateTime<Utc>,
    pub name: String,
    pub description: String,
    pub full_description: Option<String>,
    pub wallet_address: String,
    pub logo_url: Option<String>,
    pub banner_url: Option<String>,
    pub website: Option<String>,
}

#[derive(Serialize, Deserialize)]
pub struct OrganizationPageToken {
    #[serde(with = "ts_nanoseconds")]
    pub create_time: DateTime<Utc>,
}

impl PageTokenable<OrganizationPageToken> for OrganizationRow {
    fn page_token(&self) -> OrganizationPageToken {
        OrganizationPageToken {
            create_time: self.create_time,
        }
    }
}
