use crate::protobuf::into::IntoProto;
use async_trait::async_trait;
use chrono::Utc;
use std::{
    cmp::{max, min},
    marker::PhantomData,
    sync::Arc,
};
use tonic::{Request, Response, Status};
use uuid::Uuid;
use xrpact_api::xrpact::{
    organization_service_server::OrganizationService, CreateOrganizationRequest,
    GetOrganizationRequest, ListOrganizationsRequest, ListOrganizationsResponse, Organization,
};
use xrpact_status::{already_exists, invalid_argument, not_found, well_known::missing_required_field};
use xrpact_storage::{
    database::{
        client::DatabaseClient,
        store::{OnDemandStore, TransactionalStore},
    },
    models::organization::{NewOrganizationRow, OrganizationPageToken},
    page_token::{PageToken, PageTokenable},
    stores::organization::OrganizationStore,
};

pub struct OrganizationServiceImpl<Db, Store, TStore> {
    database: Arc<Db>,
    _marker: PhantomData<fn() -> (Store, TStore)>,
}

impl<Db, Store, TStore> OrganizationServiceImpl<Db, Store, TStore> {
    pub fn new(database: Arc<Db>) -> Self {
        Self {
            database,
            _marker: PhantomData,
        }
    }
}

fn none_if_empty(value: String) -> Option<String> {
    Some(value).filter(|s| !s.is_empty())
}

#[async_trait]
impl<Db, Store, TStore> OrganizationService for OrganizationServiceImpl<Db, Store, TStore>
where
    Db: DatabaseClient<Store, TStore> + 'static,
    Store: OrganizationStore + OnDemandStore + 'static,
    TStore: OrganizationStore + TransactionalStore + 'static,
    Self: Sync + Send,
{
    async fn create_organization(
        &self,
        request: Request<CreateOrganizationRequest>,
    ) -> Result<Response<Organization>, Status> {
        let message = request.into_inner();

        let name = none_if_empty(message.name).ok_or(missing_required_field("name"))?;
        let wallet_address = none_if_empty(message.wallet_address)
            .ok_or(missing_required_field("wallet_address"))?;

        // The wallet address is immutable once the organization exists, so
        // the uniqueness check happens here; the constraint backs it up
        // against races.
        let store = self.database.on_demand();
        if store
            .find_organization_by_wallet_address(wallet_address.clone())
            .await?
            .is_some()
        {
            return Err(already_exists!(
                "organization with this wallet address already exists"
            ));
        }

        let now = Utc::now();
        let organization = store
            .add_organization(NewOrganizationRow {
                create_time: now,
                update_time: now,
                name,
                description: message.description,
                full_description: none_if_empty(message.full_description),
                wallet_address,
                logo_url: none_if_empty(message.logo_url),
                banner_url: none_if_empty(message.banner_url),
                website: none_if_empty(message.website),
            })
            .await?;

        Ok(Response::new(organization.into_proto()?))
    }

    async fn get_organization(
        &self,
        request: Request<GetOrganizationRequest>,
    ) -> Result<Response<Organization>, Status> {
        let message = request.into_inner();

        let org_id = message
            .org_id
            .parse::<Uuid>()
            .map_err(|e| invalid_argument!("'org_id' is invalid: {:?}", e))?;

        let organization = self
            .database
            .on_demand()
            .find_organization_by_id(org_id)
            .await?
            .ok_or(not_found!("organization not found"))?;

        Ok(Response::new(organization.into_proto()?))
    }

    async fn list_organizations(
        &self,
        request: Request<ListOrganizationsRequest>,
    ) -> Result<Response<ListOrganizationsResponse>, Status> {
        let message = request.into_inner();

        let page_size = min(max(message.page_size, 10), 100);
        let limit: i64 = (page_size + 1).into();
        let page_token = OrganizationPageToken::deserialize_page_token(&message.page_token)
            .map_err(|e| invalid_argument!("'page_token' is invalid: {:?}", e))?;

        let (rows_plus_one, total_count) = self
            .database
            .on_demand()
            .list_and_count_organizations(limit, page_token)
            .await?;

        let (page_rows, next_page_rows) =
            rows_plus_one.split_at(min(rows_plus_one.len(), page_size as usize));

        // Map rows to protos and serialize page token.
        let mut organizations: Vec<Organization> = Vec::new();
        for row in page_rows {
            organizations.push(row.clone().into_proto()?);
        }

        // Next page token or empty string.
        let next_page_token = next_page_rows
            .first()
            .map(|next_row| next_row.page_token().serialize_page_token())
            .unwrap_or(Ok("".to_string()))?;

        Ok(Response::new(ListOrganizationsResponse {
            organizations,
            next_page_token,
            total_count,
        }))
    }
}
