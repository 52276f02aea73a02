use crate::{
    money,
    protobuf::into::IntoProto,
    xumm::{SigningBroker, SigningOptions, SigningStatus, TransactionIntent},
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use std::{
    cmp::{max, min},
    marker::PhantomData,
    str::FromStr,
    sync::Arc,
};
use tonic::{Request, Response, Status};
use uuid::Uuid;
use xrpact_api::xrpact::{
    donation_service_server::DonationService, Donation, DonationStatus as DonationStatusProto,
    ListDonationsRequest, ListDonationsResponse, PollDonationRequest, PollDonationResponse,
    StartDonationRequest, StartDonationResponse,
};
use xrpact_status::{invalid_argument, not_found, unavailable};
use xrpact_storage::{
    database::{
        client::DatabaseClient,
        store::{OnDemandStore, TransactionalStore},
    },
    models::donation::{DonationPageToken, DonationRow, NewDonationRow},
    page_token::{PageToken, PageTokenable},
    stores::{donation::DonationStore, organization::OrganizationStore, user::UserStore},
};

/// Drives a donation through its lifecycle: validate, split the fee,
/// request an out-of-band signature, persist the pending record, and
/// resolve it on caller-driven polls. The service owns no timers; polling
/// cadence and cancellation belong to the caller.
pub struct DonationServiceImpl<Db, Store, TStore> {
    database: Arc<Db>,
    broker: Arc<dyn SigningBroker>,
    _marker: PhantomData<fn() -> (Store, TStore)>,
}

impl<Db, Store, TStore> DonationServiceImpl<Db, Store, TStore> {
    pub fn new(database: Arc<Db>, broker: Arc<dyn SigningBroker>) -> Self {
        Self {
            database,
            broker,
            _marker: PhantomData,
        }
    }
}

impl<Db, Store, TStore> DonationServiceImpl<Db, Store, TStore>
where
    Db: DatabaseClient<Store, TStore> + 'static,
    Store: DonationStore + OrganizationStore + UserStore + OnDemandStore + 'static,
    TStore: DonationStore + OrganizationStore + UserStore + TransactionalStore + 'static,
{
    async fn reload_donation(&self, donation_id: Uuid) -> Result<DonationRow, Status> {
        self.database
            .on_demand()
            .find_donation_by_id(donation_id)
            .await?
            .ok_or(not_found!("donation not found"))
    }

    /// Terminal transition for a signed resolution. The conditional
    /// pending-to-completed update plus the tx_hash uniqueness constraint
    /// serialize concurrent polls; the winner applies the user stats in the
    /// same transaction, exactly once.
    async fn finalize_donation(
        &self,
        donation: &DonationRow,
        tx_hash: String,
        now: DateTime<Utc>,
    ) -> Result<DonationRow, Status> {
        let txn = self.database.begin().await?;
        let completed = match txn
            .complete_donation(donation.donation_id, tx_hash.clone(), now)
            .await
        {
            Ok(completed) => completed,
            Err(err) => {
                // A duplicate hash must leave this row untouched.
                if let Err(rollback_err) = txn.rollback().await {
                    log::warn!("rollback after failed completion: {:?}", rollback_err);
                }
                return Err(err.into());
            }
        };
        let completed = match completed {
            Some(completed) => completed,
            None => {
                // Another poll finalized it first; answer from the stored
                // state.
                txn.rollback().await?;
                return self.reload_donation(donation.donation_id).await;
            }
        };

        let xp = money::xp_for_amount(completed.amount);
        txn.apply_donation_stats(completed.user_id, completed.amount, xp, now)
            .await?;
        txn.add_organization_received(
            completed.org_id,
            completed.amount - completed.platform_fee,
            now,
        )
        .await?;
        txn.commit().await?;

        log::info!(
            "donation {} completed with tx {}",
            completed.donation_id,
            tx_hash
        );
        Ok(completed)
    }
}

#[async_trait]
impl<Db, Store, TStore> DonationService for DonationServiceImpl<Db, Store, TStore>
where
    Db: DatabaseClient<Store, TStore> + 'static,
    Store: DonationStore + OrganizationStore + UserStore + OnDemandStore + 'static,
    TStore: DonationStore + OrganizationStore + UserStore + TransactionalStore + 'static,
    Self: Sync + Send,
{
    async fn start_donation(
        &self,
        request: Request<StartDonationRequest>,
    ) -> Result<Response<StartDonationResponse>, Status> {
        let message = request.into_inner();

        let user_id = message
            .user_id
            .parse::<Uuid>()
            .map_err(|e| invalid_argument!("'user_id' is invalid: {:?}", e))?;
        let org_id = message
            .org_id
            .parse::<Uuid>()
            .map_err(|e| invalid_argument!("'org_id' is invalid: {:?}", e))?;
        let amount = Decimal::from_str(&message.amount)
            .map_err(|e| invalid_argument!("'amount' is invalid: {:?}", e))?;
        if amount < Decimal::from(money::MIN_DONATION_XRP) {
            return Err(invalid_argument!(
                "'amount' must be at least {} XRP",
                money::MIN_DONATION_XRP
            ));
        }

        let store = self.database.on_demand();
        let user = store
            .find_user_by_id(user_id)
            .await?
            .ok_or(not_found!("user not found"))?;
        let organization = store
            .find_organization_by_id(org_id)
            .await?
            .ok_or(not_found!("organization not found"))?;

        let split = money::split_donation(amount);
        let drops = money::xrp_to_drops(split.net_amount)
            .ok_or(invalid_argument!("'amount' exceeds ledger precision"))?;

        let signing_request = self
            .broker
            .create_signing_request(
                TransactionIntent::Payment {
                    destination: organization.wallet_address.clone(),
                    drops,
                },
                SigningOptions {
                    return_url: Some(message.callback_url).filter(|url| !url.is_empty()),
                    ..SigningOptions::default()
                },
            )
            .await
            .map_err(|e| unavailable!("signing request creation failed: {:?}", e))?;

        // The pending row must be durable before the signing request is
        // handed out; a signed-but-unrecorded payment must not be possible.
        let now = Utc::now();
        let donation = store
            .add_donation(NewDonationRow {
                create_time: now,
                update_time: now,
                user_id: user.user_id,
                org_id: organization.org_id,
                amount: split.amount,
                platform_fee: split.platform_fee,
                payload_uuid: signing_request.uuid.clone(),
            })
            .await?;

        log::info!(
            "donation {} pending on payload {}",
            donation.donation_id,
            signing_request.uuid
        );

        Ok(Response::new(StartDonationResponse {
            donation_id: donation.donation_id.to_string(),
            signing_request_uuid: signing_request.uuid,
            qr_png_url: signing_request.qr_png_url,
            sign_link: signing_request.sign_link,
        }))
    }

    async fn poll_donation(
        &self,
        request: Request<PollDonationRequest>,
    ) -> Result<Response<PollDonationResponse>, Status> {
        let message = request.into_inner();

        let donation_id = message
            .donation_id
            .parse::<Uuid>()
            .map_err(|e| invalid_argument!("'donation_id' is invalid: {:?}", e))?;

        let donation = self.reload_donation(donation_id).await?;
        if !message.signing_request_uuid.is_empty()
            && message.signing_request_uuid != donation.payload_uuid
        {
            return Err(invalid_argument!(
                "'signing_request_uuid' does not match the donation"
            ));
        }

        // Terminal donations answer from the datastore alone; the broker is
        // not consulted and stats are never re-applied.
        if donation.is_terminal() {
            return Ok(Response::new(poll_response(&donation)?));
        }

        let status = self
            .broker
            .signing_request_status(donation.payload_uuid.clone())
            .await
            .map_err(|e| unavailable!("signing request status failed: {:?}", e))?;

        let now = Utc::now();
        let donation = match status {
            SigningStatus::Pending => donation,
            SigningStatus::Expired => {
                match self
                    .database
                    .on_demand()
                    .mark_donation_expired(donation.donation_id, now)
                    .await?
                {
                    Some(expired) => expired,
                    None => self.reload_donation(donation.donation_id).await?,
                }
            }
            SigningStatus::Rejected => {
                match self
                    .database
                    .on_demand()
                    .mark_donation_failed(donation.donation_id, now)
                    .await?
                {
                    Some(failed) => failed,
                    None => self.reload_donation(donation.donation_id).await?,
                }
            }
            SigningStatus::Signed { tx_hash, .. } => {
                let tx_hash =
                    tx_hash.ok_or(unavailable!("signed payload carried no transaction hash"))?;
                self.finalize_donation(&donation, tx_hash, now).await?
            }
        };

        Ok(Response::new(poll_response(&donation)?))
    }

    async fn list_donations(
        &self,
        request: Request<ListDonationsRequest>,
    ) -> Result<Response<ListDonationsResponse>, Status> {
        let message = request.into_inner();

        let page_size = min(max(message.page_size, 1), 100);
        let page_token = DonationPageToken::deserialize_page_token(&message.page_token)
            .map_err(|e| invalid_argument!("'page_token' is invalid: {:?}", e))?;
        let user_id = Some(message.user_id)
            .filter(|s| !s.is_empty())
            .ok_or(Status::invalid_argument("'user_id' must be specified"))?
            .parse::<Uuid>()
            .map_err(|e| invalid_argument!("'user_id' is invalid: {:?}", e))?;

        let (rows_plus_one, total_count) = self
            .database
            .on_demand()
            .list_and_count_donations_for_user((page_size + 1).into(), page_token, user_id)
            .await?;

        let (page_rows, next_page_rows) =
            rows_plus_one.split_at(min(rows_plus_one.len(), page_size as usize));

        // Map rows to protos and serialize page token.
        let mut donations: Vec<Donation> = Vec::new();
        for row in page_rows {
            donations.push(row.clone().into_proto()?);
        }

        // Next page token or empty string.
        let next_page_token = next_page_rows
            .first()
            .map(|next_row| next_row.page_token().serialize_page_token())
            .unwrap_or(Ok("".to_string()))?;

        Ok(Response::new(ListDonationsResponse {
            donations,
            next_page_token,
            total_count,
        }))
    }
}

fn poll_response(donation: &DonationRow) -> Result<PollDonationResponse, Status> {
    let status: DonationStatusProto = donation.status.into_proto()?;
    Ok(PollDonationResponse {
        status: status.into(),
        tx_hash: donation.tx_hash.clone().unwrap_or_default(),
    })
}
