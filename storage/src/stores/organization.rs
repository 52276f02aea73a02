use crate::{
    models::organization::{NewOrganizationRow, OrganizationPageToken, OrganizationRow},
    pg::store::{PgOnDemandStore, PgTransactionalStore},
    Error,
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::{Executor, Postgres, Row};
use uuid::Uuid;

#[async_trait]
pub trait OrganizationStore: Sync + Send {
    /// Adds an organization. The wallet address is unique across
    /// organizations; a duplicate is rejected with a conflict.
    async fn add_organization(
        &self,
        new_row: NewOrganizationRow,
    ) -> Result<OrganizationRow, Error>;

    async fn find_organization_by_id(
        &self,
        org_id: Uuid,
    ) -> Result<Option<OrganizationRow>, Error>;

    async fn find_organization_by_wallet_address(
        &self,
        wallet_address: String,
    ) -> Result<Option<OrganizationRow>, Error>;

    /// Adds the net amount of a completed donation to the organization's
    /// running total.
    async fn add_organization_received(
        &self,
        org_id: Uuid,
        amount: Decimal,
        now: DateTime<Utc>,
    ) -> Result<OrganizationRow, Error>;

    async fn list_and_count_organizations(
        &self,
        page_size: i64,
        page_token: Option<OrganizationPageToken>,
    ) -> Result<(Vec<OrganizationRow>, i64), Error>;
}

#[async_trait]
impl OrganizationStore for PgOnDemandStore {
    async fn add_organization(
        &self,
        new_row: NewOrganizationRow,
    ) -> Result<OrganizationRow, Error> {
        add_organization(&*self.pool, new_row).await
    }

    async fn find_organization_by_id(
        &self,
        org_id: Uuid,
    ) -> Result<Option<OrganizationRow>, Error> {
        find_organization_by_id(&*self.pool, org_id).await
    }

    async fn find_organization_by_wallet_address(
        &self,
        wallet_address: String,
    ) -> Result<Option<OrganizationRow>, Error> {
        find_organization_by_wallet_address(&*self.pool, wallet_address).await
    }

    async fn add_organization_received(
        &self,
        org_id: Uuid,
        amount: Decimal,
        now: DateTime<Utc>,
    ) -> Result<OrganizationRow, Error> {
        add_organization_received(&*self.pool, org_id, amount, now).await
    }

    async fn list_and_count_organizations(
        &self,
        page_size: i64,
        page_token: Option<OrganizationPageToken>,
    ) -> Result<(Vec<OrganizationRow>, i64), Error> {
        let list_fut = list_organizations(&*self.pool, page_size, page_token);
        let count_fut = count_organizations(&*self.pool);
        futures::try_join!(list_fut, count_fut)
    }
}

#[async_trait]
impl<'a> OrganizationStore for PgTransactionalStore<'a> {
    async fn add_organization(
        &self,
        new_row: NewOrganizationRow,
    ) -> Result<OrganizationRow, Error> {
        let mut lock = self.txn.lock().await;
        add_organization(&mut **lock, new_row).await
    }

    async fn find_organization_by_id(
        &self,
        org_id: Uuid,
    ) -> Result<Option<OrganizationRow>, Error> {
        let mut lock = self.txn.lock().await;
        find_organization_by_id(&mut **lock, org_id).await
    }

    async fn find_organization_by_wallet_address(
        &self,
        wallet_address: String,
    ) -> Result<Option<OrganizationRow>, Error> {
        let mut lock = self.txn.lock().await;
        find_organization_by_wallet_address(&mut **lock, wallet_address).await
    }

    async fn add_organization_received(
        &self,
        org_id: Uuid,
        amount: Decimal,
        now: DateTime<Utc>,
    ) -> Result<OrganizationRow, Error> {
        let mut lock = self.txn.lock().await;
        add_organization_received(&mut **lock, org_id, amount, now).await
    }

    async fn list_and_count_organizations(
        &self,
        page_size: i64,
        page_token: Option<OrganizationPageToken>,
    ) -> Result<(Vec<OrganizationRow>, i64), Error> {
        // One connection; run the queries sequentially.
        let mut lock = self.txn.lock().await;
        let rows = list_organizations(&mut **lock, page_size, page_token).await?;
        let count = count_organizations(&mut **lock).await?;
        Ok((rows, count))
    }
}

async fn add_organization<'a, E>(
    executor: E,
    new_row: NewOrganizationRow,
) -> Result<OrganizationRow, Error>
where
    E: Executor<'a, Database = Postgres>,
{
    sqlx::query_as(
        r#"
        INSERT INTO organizations (
            create_time,
            update_time,
            name,
            description,
            full_description,
            wallet_address,
            logo_url,
            banner_url,
            website
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
        RETURNING *"#,
    )
    .bind(new_row.create_time)
    .bind(new_row.update_time)
    .bind(&new_row.name)
    .bind(&new_row.description)
    .bind(&new_row.full_description)
    .bind(&new_row.wallet_address)
    .bind(&new_row.logo_url)
    .bind(&new_row.banner_url)
    .bind(&new_row.website)
    .fetch_one(executor)
    .await
    .map_err(|e| Error::or_conflict(e, "organization with this wallet address already exists"))
}

async fn find_organization_by_id<'a, E>(
    executor: E,
    org_id: Uuid,
) -> Result<Option<OrganizationRow>, Error>
where
    E: Executor<'a, Database = Postgres>,
{
    Ok(sqlx::query_as(
        "SELECT * \
        FROM organizations \
        WHERE org_id = $1",
    )
    .bind(org_id)
    .fetch_optional(executor)
    .await?)
}

async fn find_organization_by_wallet_address<'a, E>(
    executor: E,
    wallet_address: String,
) -> Result<Option<OrganizationRow>, Error>
where
    E: Executor<'a, Database = Postgres>,
{
    Ok(sqlx::query_as(
        "SELECT * \
        FROM organizations \
        WHERE wallet_address = $1",
    )
    .bind(wallet_address)
    .fetch_optional(executor)
    .await?)
}

async fn add_organization_received<'a, E>(
    executor: E,
    org_id: Uuid,
    amount: Decimal,
    now: DateTime<Utc>,
) -> Result<OrganizationRow, Error>
where
    E: Executor<'a, Database = Postgres>,
{
    Ok(sqlx::query_as(
        "UPDATE organizations \
        SET total_received = total_received + $2, \
            update_time = $3 \
        WHERE org_id = $1 \
        RETURNING *",
    )
    .bind(org_id)
    .bind(amount)
    .bind(now)
    .fetch_one(executor)
    .await?)
}

async fn list_organizations<'a, E>(
    executor: E,
    page_size: i64,
    page_token: Option<OrganizationPageToken>,
) -> Result<Vec<OrganizationRow>, Error>
where
    E: Executor<'a, Database = Postgres>,
{
    match page_token {
        Some(page_token) => Ok(sqlx::query_as(
            "SELECT * \
            FROM organizations \
            WHERE (create_time) >= ($1) \
            ORDER BY create_time ASC \
            LIMIT $2",
        )
        .bind(page_token.create_time)
        .bind(page_size)
        .fetch_all(executor)
        .await?),
        None => Ok(sqlx::query_as(
            "SELECT * \
            FROM organizations \
            ORDER BY create_time ASC \
            LIMIT $1",
        )
        .bind(page_size)
        .fetch_all(executor)
        .await?),
    }
}

async fn count_organizations<'a, E>(executor: E) -> Result<i64, Error>
where
    E: Executor<'a, Database = Postgres>,
{
    Ok(sqlx::query(
        "SELECT COUNT(*) \
        FROM organizations",
    )
    .fetch_one(executor)
    .await?
    .try_get(0)?)
}
