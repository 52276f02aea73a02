use crate::{
    models::user::{AchievementNftRecord, NewUserRow, UserRow},
    pg::store::{PgOnDemandStore, PgTransactionalStore},
    Error,
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::{types::Json, Executor, Postgres};
use uuid::Uuid;

#[async_trait]
pub trait UserStore: Sync + Send {
    async fn add_user(&self, new_row: NewUserRow) -> Result<UserRow, Error>;

    async fn find_user_by_id(&self, user_id: Uuid) -> Result<Option<UserRow>, Error>;

    async fn find_user_by_wallet_address(
        &self,
        wallet_address: String,
    ) -> Result<Option<UserRow>, Error>;

    /// Applies the aggregate effect of one completed donation in a single
    /// statement, so concurrent completions never lose an increment.
    async fn apply_donation_stats(
        &self,
        user_id: Uuid,
        amount: Decimal,
        xp: i64,
        now: DateTime<Utc>,
    ) -> Result<UserRow, Error>;

    /// Appends a claimed achievement and its minted token to the user's
    /// bookkeeping columns.
    async fn append_achievement_nft(
        &self,
        user_id: Uuid,
        achievement_key: String,
        nftoken_id: String,
        now: DateTime<Utc>,
    ) -> Result<UserRow, Error>;
}

#[async_trait]
impl UserStore for PgOnDemandStore {
    async fn add_user(&self, new_row: NewUserRow) -> Result<UserRow, Error> {
        add_user(&*self.pool, new_row).await
    }

    async fn find_user_by_id(&self, user_id: Uuid) -> Result<Option<UserRow>, Error> {
        find_user_by_id(&*self.pool, user_id).await
    }

    async fn find_user_by_wallet_address(
        &self,
        wallet_address: String,
    ) -> Result<Option<UserRow>, Error> {
        find_user_by_wallet_address(&*self.pool, wallet_address).await
    }

    async fn apply_donation_stats(
        &self,
        user_id: Uuid,
        amount: Decimal,
        xp: i64,
        now: DateTime<Utc>,
    ) -> Result<UserRow, Error> {
        apply_donation_stats(&*self.pool, user_id, amount, xp, now).await
    }

    async fn append_achievement_nft(
        &self,
        user_id: Uuid,
        achievement_key: String,
        nftoken_id: String,
        now: DateTime<Utc>,
    ) -> Result<UserRow, Error> {
        append_achievement_nft(&*self.pool, user_id, achievement_key, nftoken_id, now).await
    }
}

#[async_trait]
impl<'a> UserStore for PgTransactionalStore<'a> {
    async fn add_user(&self, new_row: NewUserRow) -> Result<UserRow, Error> {
        let mut lock = self.txn.lock().await;
        add_user(&mut **lock, new_row).await
    }

    async fn find_user_by_id(&self, user_id: Uuid) -> Result<Option<UserRow>, Error> {
        let mut lock = self.txn.lock().await;
        find_user_by_id(&mut **lock, user_id).await
    }

    async fn find_user_by_wallet_address(
        &self,
        wallet_address: String,
    ) -> Result<Option<UserRow>, Error> {
        let mut lock = self.txn.lock().await;
        find_user_by_wallet_address(&mut **lock, wallet_address).await
    }

    async fn apply_donation_stats(
        &self,
        user_id: Uuid,
        amount: Decimal,
        xp: i64,
        now: DateTime<Utc>,
    ) -> Result<UserRow, Error> {
        let mut lock = self.txn.lock().await;
        apply_donation_stats(&mut **lock, user_id, amount, xp, now).await
    }

    async fn append_achievement_nft(
        &self,
        user_id: Uuid,
        achievement_key: String,
        nftoken_id: String,
        now: DateTime<Utc>,
    ) -> Result<UserRow, Error> {
        let mut lock = self.txn.lock().await;
        append_achievement_nft(&mut **lock, user_id, achievement_key, nftoken_id, now).await
    }
}

async fn add_user<'a, E>(executor: E, new_row: NewUserRow) -> Result<UserRow, Error>
where
    E: Executor<'a, Database = Postgres>,
{
    sqlx::query_as(
        r#"
        INSERT INTO users (
            create_time,
            update_time,
            wallet_address,
            username,
            pic_url
        )
        VALUES ($1, $2, $3, $4, $5)
        RETURNING *"#,
    )
    .bind(new_row.create_time)
    .bind(new_row.update_time)
    .bind(&new_row.wallet_address)
    .bind(&new_row.username)
    .bind(&new_row.pic_url)
    .fetch_one(executor)
    .await
    .map_err(|e| Error::or_conflict(e, "user with this wallet address already exists"))
}

async fn find_user_by_id<'a, E>(executor: E, user_id: Uuid) -> Result<Option<UserRow>, Error>
where
    E: Executor<'a, Database = Postgres>,
{
    Ok(sqlx::query_as(
        "SELECT * \
        FROM users \
        WHERE user_id = $1",
    )
    .bind(user_id)
    .fetch_optional(executor)
    .await?)
}

async fn find_user_by_wallet_address<'a, E>(
    executor: E,
    wallet_address: String,
) -> Result<Option<UserRow>, Error>
where
    E: Executor<'a, Database = Postgres>,
{
    Ok(sqlx::query_as(
        "SELECT * \
        FROM users \
        WHERE wallet_address = $1",
    )
    .bind(wallet_address)
    .fetch_optional(executor)
    .await?)
}

async fn apply_donation_stats<'a, E>(
    executor: E,
    user_id: Uuid,
    amount: Decimal,
    xp: i64,
    now: DateTime<Utc>,
) -> Result<UserRow, Error>
where
    E: Executor<'a, Database = Postgres>,
{
    Ok(sqlx::query_as(
        "UPDATE users \
        SET donation_count = donation_count + 1, \
            total_donated = total_donated + $2, \
            xp = xp + $3, \
            last_donation = $4, \
            update_time = $4 \
        WHERE user_id = $1 \
        RETURNING *",
    )
    .bind(user_id)
    .bind(amount)
    .bind(xp)
    .bind(now)
    .fetch_one(executor)
    .await?)
}

async fn append_achievement_nft<'a, E>(
    executor: E,
    user_id: Uuid,
    achievement_key: String,
    nftoken_id: String,
    now: DateTime<Utc>,
) -> Result<UserRow, Error>
where
    E: Executor<'a, Database = Postgres>,
{
    let record = AchievementNftRecord {
        achievement_key: achievement_key.clone(),
        nftoken_id,
    };
    Ok(sqlx::query_as(
        "UPDATE users \
        SET claimed_achievements = array_append(claimed_achievements, $2), \
            achievement_nfts = achievement_nfts || $3, \
            update_time = $4 \
        WHERE user_id = $1 \
        RETURNING *",
    )
    .bind(user_id)
    .bind(achievement_key)
    .bind(Json(record))
    .bind(now)
    .fetch_one(executor)
    .await?)
}
