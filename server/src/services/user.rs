use crate::{
    protobuf::into::IntoProto,
    xumm::{SigningBroker, SigningOptions, SigningStatus, TransactionIntent},
};
use async_trait::async_trait;
use chrono::Utc;
use std::{marker::PhantomData, sync::Arc};
use tonic::{Request, Response, Status};
use uuid::Uuid;
use xrpact_api::xrpact::{
    get_user_request::Identifier, user_service_server::UserService, CheckWalletSignInRequest,
    CheckWalletSignInResponse, CreateUserRequest, CreateWalletSignInRequest,
    CreateWalletSignInResponse, GetUserRequest, User,
};
use xrpact_status::{
    already_exists, invalid_argument, not_found, unavailable,
    well_known::missing_required_field,
};
use xrpact_storage::{
    database::{
        client::DatabaseClient,
        store::{OnDemandStore, TransactionalStore},
    },
    models::user::NewUserRow,
    stores::user::UserStore,
};

pub struct UserServiceImpl<Db, Store, TStore> {
    database: Arc<Db>,
    broker: Arc<dyn SigningBroker>,
    _marker: PhantomData<fn() -> (Store, TStore)>,
}

impl<Db, Store, TStore> UserServiceImpl<Db, Store, TStore> {
    pub fn new(database: Arc<Db>, broker: Arc<dyn SigningBroker>) -> Self {
        Self {
            database,
            broker,
            _marker: PhantomData,
        }
    }
}

#[async_trait]
impl<Db, Store, TStore> UserService for UserServiceImpl<Db, Store, TStore>
where
    Db: DatabaseClient<Store, TStore> + 'static,
    Store: UserStore + OnDemandStore + 'static,
    TStore: UserStore + TransactionalStore + 'static,
    Self: Sync + Send,
{
    async fn create_wallet_sign_in(
        &self,
        request: Request<CreateWalletSignInRequest>,
    ) -> Result<Response<CreateWalletSignInResponse>, Status> {
        let message = request.into_inner();

        let signing_request = self
            .broker
            .create_signing_request(
                TransactionIntent::SignIn,
                SigningOptions {
                    return_url: Some(message.callback_url).filter(|url| !url.is_empty()),
                    ..SigningOptions::default()
                },
            )
            .await
            .map_err(|e| unavailable!("sign-in request creation failed: {:?}", e))?;

        Ok(Response::new(CreateWalletSignInResponse {
            signing_request_uuid: signing_request.uuid,
            qr_png_url: signing_request.qr_png_url,
            sign_link: signing_request.sign_link,
        }))
    }

    async fn check_wallet_sign_in(
        &self,
        request: Request<CheckWalletSignInRequest>,
    ) -> Result<Response<CheckWalletSignInResponse>, Status> {
        let message = request.into_inner();

        let uuid = Some(message.signing_request_uuid)
            .filter(|uuid| !uuid.is_empty())
            .ok_or(missing_required_field("signing_request_uuid"))?;

        let status = self
            .broker
            .signing_request_status(uuid)
            .await
            .map_err(|e| unavailable!("sign-in check failed: {:?}", e))?;

        let response = match status {
            SigningStatus::Signed { account, .. } => CheckWalletSignInResponse {
                signed: true,
                wallet_address: account.unwrap_or_default(),
            },
            _ => CheckWalletSignInResponse {
                signed: false,
                wallet_address: "".to_string(),
            },
        };
        Ok(Response::new(response))
    }

    async fn create_user(
        &self,
        request: Request<CreateUserRequest>,
    ) -> Result<Response<User>, Status> {
        let message = request.into_inner();

        let wallet_address = Some(message.wallet_address)
            .filter(|address| !address.is_empty())
            .ok_or(missing_required_field("wallet_address"))?;

        let store = self.database.on_demand();
        if store
            .find_user_by_wallet_address(wallet_address.clone())
            .await?
            .is_some()
        {
            return Err(already_exists!(
                "user with this wallet address already exists"
            ));
        }

        // Default username derived from the wallet address.
        let username = Some(message.username)
            .filter(|username| !username.is_empty())
            .unwrap_or_else(|| format!("User-{}", &wallet_address[..wallet_address.len().min(8)]));

        let now = Utc::now();
        let user = store
            .add_user(NewUserRow {
                create_time: now,
                update_time: now,
                wallet_address,
                username,
                pic_url: Some(message.pic_url).filter(|url| !url.is_empty()),
            })
            .await?;

        Ok(Response::new(user.into_proto()?))
    }

    async fn get_user(&self, request: Request<GetUserRequest>) -> Result<Response<User>, Status> {
        let message = request.into_inner();

        let store = self.database.on_demand();
        let user = match message.identifier {
            Some(Identifier::UserId(user_id)) => {
                let user_id = user_id
                    .parse::<Uuid>()
                    .map_err(|e| invalid_argument!("'user_id' is invalid: {:?}", e))?;
                store.find_user_by_id(user_id).await?
            }
            Some(Identifier::WalletAddress(wallet_address)) => {
                store.find_user_by_wallet_address(wallet_address).await?
            }
            None => return Err(invalid_argument!("must specify identifier")),
        }
        .ok_or(not_found!("user not found"))?;

        Ok(Response::new(user.into_proto()?))
    }
}
