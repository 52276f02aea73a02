use async_trait::async_trait;
use chrono::{DateTime, Utc};
use mockall::mock;
use rust_decimal::Decimal;
use uuid::Uuid;
use xrpact_storage::{
    database::{
        client::DatabaseClient,
        store::{OnDemandStore, TransactionalStore},
    },
    models::{donation::*, organization::*, user::*},
    stores::{donation::DonationStore, organization::OrganizationStore, user::UserStore},
    Error,
};

mock! {
  pub DatabaseClient {}

  #[async_trait]
  impl DatabaseClient<MockStore, MockStore> for DatabaseClient {
      fn on_demand(&self) -> MockStore;

      async fn begin(&self) -> Result<MockStore, Error>;
  }
}

mock! {
  pub Store {}

  #[async_trait]
  impl DonationStore for Store {
      async fn add_donation(&self, new_row: NewDonationRow) -> Result<DonationRow, Error>;

      async fn find_donation_by_id(&self, donation_id: Uuid)
          -> Result<Option<DonationRow>, Error>;

      async fn find_donation_by_tx_hash(
          &self,
          tx_hash: String,
      ) -> Result<Option<DonationRow>, Error>;

      async fn mark_donation_expired(
          &self,
          donation_id: Uuid,
          now: DateTime<Utc>,
      ) -> Result<Option<DonationRow>, Error>;

      async fn mark_donation_failed(
          &self,
          donation_id: Uuid,
          now: DateTime<Utc>,
      ) -> Result<Option<DonationRow>, Error>;

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
  impl OrganizationStore for Store {
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
  impl UserStore for Store {
      async fn add_user(&self, new_row: NewUserRow) -> Result<UserRow, Error>;

      async fn find_user_by_id(&self, user_id: Uuid) -> Result<Option<UserRow>, Error>;

      async fn find_user_by_wallet_address(
          &self,
          wallet_address: String,
      ) -> Result<Option<UserRow>, Error>;

      async fn apply_donation_stats(
          &self,
          user_id: Uuid,
          amount: Decimal,
          xp: i64,
          now: DateTime<Utc>,
      ) -> Result<UserRow, Error>;

      async fn append_achievement_nft(
          &self,
          user_id: Uuid,
          achievement_key: String,
          nftoken_id: String,
          now: DateTime<Utc>,
      ) -> Result<UserRow, Error>;
  }

  #[async_trait]
  impl OnDemandStore for Store {
  }

  #[async_trait]
  impl TransactionalStore for Store {
      async fn commit(self) -> Result<(), Error>;

      async fn rollback(self) -> Result<(), Error>;
  }
}
