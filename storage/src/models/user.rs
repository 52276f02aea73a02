use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

// Re-exported so row literals can be built without a direct sqlx
// dependency (mocks, service tests).
pub use sqlx::types::Json;

/// One reward NFT minted for a claimed achievement, kept in the user's
/// `achievement_nfts` jsonb column.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct AchievementNftRecord {
    pub achievement_key: String,
    pub nftoken_id: String,
}

#[derive(Clone, Debug, FromRow, PartialEq)]
pub struct UserRow {
    pub user_id: Uuid,
    pub create_time: DateTime<Utc>,
    pub update_time: DateTime<Utc>,
    pub wallet_address: String,
    pub username: String,
    pub pic_url: Option<String>,
    pub total_donated: Decimal,
    pub donation_count: i64,
    pub xp: i64,
    pub last_donation: Option<DateTime<Utc>>,
    pub claimed_achievements: Vec<String>,
    pub achievement_nfts: Json<Vec<AchievementNftRecord>>,
}

impl UserRow {
    pub fn has_claimed(&self, achievement_key: &str) -> bool {
        self.claimed_achievements
            .iter()
            .any(|claimed| claimed == achievement_key)
    }
}

pub struct NewUserRow {
    pub create_time: DateTime<Utc>,
    pub update_time: DateTime<Utc>,
    pub wallet_address: String,
    pub username: String,
    pub pic_url: Option<String>,
}
