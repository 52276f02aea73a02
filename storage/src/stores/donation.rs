use crate::{
    models::donation::{DonationPageToken, DonationRow, NewDonationRow},
    pg::store::{PgOnDemandStore, PgTransactionalStore},
    Error,
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{Executor, Postgres, Row};
use uuid::Uuid;

#[async_trait]
pub trait DonationStore: Sync + Send {
    /// Adds a donation in `pending` state.
    async fn add_donation(&self, new_row: NewDonationRow) -> Result<DonationRow, Error>;

    async fn find_donation_by_id(&self, donation_id: Uuid)
        -> Result<Option<DonationRow>, Error>;

    async fn find_donation_by_tx_hash(
        &self,
        tx_hash: String,
    ) -> Result<Option<DonationRow>, Error>;

    /// Transitions a pending donation to `expired`. Returns None when the
    /// donation is not pending anymore.
    async fn mark_donation_expired(
        &self,
        donation_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<Option<DonationRow>, Error>;

    /// Transitions a pending donation to `failed`. Returns None when the
    /// donation is not pending anymore.
    async fn mark_donation_failed(
        &self,
        donation_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<Option<DonationRow>, Error>;

    /// Transitions a pending donation to `completed`, recording the ledger
    /// transaction hash. Returns None when the donation is not pending
    /// anymore, and a conflict when the hash is already recorded against a
    /// different donation. The tx_hash uniqueness constraint is the
    /// serialization point for concurrent resolution polls.
    async fn complete_donation(
        &self,
        donation_id: Uuid,
        tx_hash: String,
        now: DateTime<Utc>,
    ) -> Result<Option<DonationRow>, Error>;

    async fn list_and_count_donations_for_user(
        &self,
        page_size: i64,
        page_token: Option<DonationPageToken>,
        user_id: Uuid,
    ) -> Result<(Vec<DonationRow>, i64), Error>;
}

#[async_trait]
impl DonationStore for PgOnDemandStore {
    async fn add_donation(&self, new_row: NewDonationRow) -> Result<DonationRow, Error> {
        add_donation(&*self.pool, new_row).await
    }

    async fn find_donation_by_id(
        &self,
        donation_id: Uuid,
    ) -> Result<Option<DonationRow>, Error> {
        find_donation_by_id(&*self.pool, donation_id).await
    }

    async fn find_donation_by_tx_hash(
        &self,
        tx_hash: String,
    ) -> Result<Option<DonationRow>, Error> {
        find_donation_by_tx_hash(&*self.pool, tx_hash).await
    }

    async fn mark_donation_expired(
        &self,
        donation_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<Option<DonationRow>, Error> {
        mark_donation(&*self.pool, donation_id, "expired", now).await
    }

    async fn mark_donation_failed(
        &self,
        donation_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<Option<DonationRow>, Error> {
        mark_donation(&*self.pool, donation_id, "failed", now).await
    }

    async fn complete_donation(
        &self,
        donation_id: Uuid,
        tx_hash: String,
        now: DateTime<Utc>,
    ) -> Result<Option<DonationRow>, Error> {
        complete_donation(&*self.pool, donation_id, tx_hash, now).await
    }

    async fn list_and_count_donations_for_user(
        &self,
        page_size: i64,
        page_token: Option<DonationPageToken>,
        user_id: Uuid,
    ) -> Result<(Vec<DonationRow>, i64), Error> {
        let list_fut = list_donations_for_user(&*self.pool, page_size, page_token, user_id);
        let count_fut = count_donations_for_user(&*self.pool, user_id);
        futures::try_join!(list_fut, count_fut)
    }
}

#[async_trait]
impl<'a> DonationStore for PgTransactionalStore<'a> {
    async fn add_donation(&self, new_row: NewDonationRow) -> Result<DonationRow, Error> {
        let mut lock = self.txn.lock().await;
        add_donation(&mut **lock, new_row).await
    }

    async fn find_donation_by_id(
        &self,
        donation_id: Uuid,
    ) -> Result<Option<DonationRow>, Error> {
        let mut lock = self.txn.lock().await;
        find_donation_by_id(&mut **lock, donation_id).await
    }

    async fn find_donation_by_tx_hash(
        &self,
        tx_hash: String,
    ) -> Result<Option<DonationRow>, Error> {
        let mut lock = self.txn.lock().await;
        find_donation_by_tx_hash(&mut **lock, tx_hash).await
    }

    async fn mark_donation_expired(
        &self,
        donation_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<Option<DonationRow>, Error> {
        let mut lock = self.txn.lock().await;
        mark_donation(&mut **lock, donation_id, "expired", now).await
    }

    async fn mark_donation_failed(
        &self,
        donation_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<Option<DonationRow>, Error> {
        let mut lock = self.txn.lock().await;
        mark_donation(&mut **lock, donation_id, "failed", now).await
    }

    async fn complete_donation(
        &self,
        donation_id: Uuid,
        tx_hash: String,
        now: DateTime<Utc>,
    ) -> Result<Option<DonationRow>, Error> {
        let mut lock = self.txn.lock().await;
        complete_donation(&mut **lock, donation_id, tx_hash, now).await
    }

    async fn list_and_count_donations_for_user(
        &self,
        page_size: i64,
        page_token: Option<DonationPageToken>,
        user_id: Uuid,
    ) -> Result<(Vec<DonationRow>, i64), Error> {
        // One connection; run the queries sequentially.
        let mut lock = self.txn.lock().await;
        let rows = list_donations_for_user(&mut **lock, page_size, page_token, user_id).await?;
        let count = count_donations_for_user(&mut **lock, user_id).await?;
        Ok((rows, count))
    }
}

async fn add_donation<'a, E>(executor: E, new_row: NewDonationRow) -> Result<DonationRow, Error>
where
    E: Executor<'a, Database = Postgres>,
{
    Ok(sqlx::query_as(
        r#"
        INSERT INTO donations (
            create_time,
            update_time,
            user_id,
            org_id,
            amount,
            platform_fee,
            payload_uuid
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7)
        RETURNING *"#,
    )
    .bind(new_row.create_time)
    .bind(new_row.update_time)
    .bind(new_row.user_id)
    .bind(new_row.org_id)
    .bind(new_row.amount)
    .bind(new_row.platform_fee)
    .bind(&new_row.payload_uuid)
    .fetch_one(executor)
    .await?)
}

async fn find_donation_by_id<'a, E>(
    executor: E,
    donation_id: Uuid,
) -> Result<Option<DonationRow>, Error>
where
    E: Executor<'a, Database = Postgres>,
{
    Ok(sqlx::query_as(
        "SELECT * \
        FROM donations \
        WHERE donation_id = $1",
    )
    .bind(donation_id)
    .fetch_optional(executor)
    .await?)
}

async fn find_donation_by_tx_hash<'a, E>(
    executor: E,
    tx_hash: String,
) -> Result<Option<DonationRow>, Error>
where
    E: Executor<'a, Database = Postgres>,
{
    Ok(sqlx::query_as(
        "SELECT * \
        FROM donations \
        WHERE tx_hash = $1",
    )
    .bind(tx_hash)
    .fetch_optional(executor)
    .await?)
}

async fn mark_donation<'a, E>(
    executor: E,
    donation_id: Uuid,
    status: &str,
    now: DateTime<Utc>,
) -> Result<Option<DonationRow>, Error>
where
    E: Executor<'a, Database = Postgres>,
{
    Ok(sqlx::query_as(
        "UPDATE donations \
        SET status = ($2::donation_status), \
            update_time = $3 \
        WHERE donation_id = $1 AND status = 'pending' \
        RETURNING *",
    )
    .bind(donation_id)
    .bind(status)
    .bind(now)
    .fetch_optional(executor)
    .await?)
}

async fn complete_donation<'a, E>(
    executor: E,
    donation_id: Uuid,
    tx_hash: String,
    now: DateTime<Utc>,
) -> Result<Option<DonationRow>, Error>
where
    E: Executor<'a, Database = Postgres>,
{
    sqlx::query_as(
        "UPDATE donations \
        SET status = 'completed', \
            tx_hash = $2, \
            update_time = $3 \
        WHERE donation_id = $1 AND status = 'pending' \
        RETURNING *",
    )
    .bind(donation_id)
    .bind(tx_hash)
    .bind(now)
    .fetch_optional(executor)
    .await
    .map_err(|e| Error::or_conflict(e, "donation with this tx_hash already exists"))
}

async fn list_donations_for_user<'a, E>(
    executor: E,
    page_size: i64,
    page_token: Option<DonationPageToken>,
    user_id: Uuid,
) -> Result<Vec<DonationRow>, Error>
where
    E: Executor<'a, Database = Postgres>,
{
    match page_token {
        Some(page_token) => Ok(sqlx::query_as(
            "SELECT * \
            FROM donations \
            WHERE user_id = $1 AND (create_time) <= ($2) \
            ORDER BY create_time DESC \
            LIMIT $3",
        )
        .bind(user_id)
        .bind(page_token.create_time)
        .bind(page_size)
        .fetch_all(executor)
        .await?),
        None => Ok(sqlx::query_as(
            "SELECT * \
            FROM donations \
            WHERE user_id = $1 \
            ORDER BY create_time DESC \
            LIMIT $2",
        )
        .bind(user_id)
        .bind(page_size)
        .fetch_all(executor)
        .await?),
    }
}

async fn count_donations_for_user<'a, E>(executor: E, user_id: Uuid) -> Result<i64, Error>
where
    E: Executor<'a, Database = Postgres>,
{
    Ok(sqlx::query(
        "SELECT COUNT(*) \
        FROM donations \
        WHERE user_id = $1",
    )
    .bind(user_id)
    .fetch_one(executor)
    .await?
    .try_get(0)?)
}
