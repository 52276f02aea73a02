use log::info;
use std::{sync::Arc, time::Duration};
use tonic::transport::Server;
use tower::ServiceBuilder;
use xrpact_api::xrpact::{
    achievement_service_server::AchievementServiceServer,
    donation_service_server::DonationServiceServer,
    organization_service_server::OrganizationServiceServer,
    user_service_server::UserServiceServer,
};
use xrpact_server::{
    config::ServerConfig,
    ledger::{client::XrplClient, nftoken::NftMinter},
    services::{
        achievement::AchievementServiceImpl, donation::DonationServiceImpl,
        organization::OrganizationServiceImpl, user::UserServiceImpl,
    },
    xumm::client::XummClient,
};
use xrpact_storage::pg::{
    client::PgDatabaseClient,
    store::{PgOnDemandStore, PgTransactionalStore},
};

fn load_config() -> Result<ServerConfig, Box<dyn std::error::Error>> {
    let config_path = std::env::var("CONFIG_PATH").ok();
    let config = std::env::var("CONFIG").ok();

    let config_str = match (config_path, config) {
        (None, Some(config)) => config,
        (Some(config_path), None) => std::fs::read_to_string(config_path)?,
        (Some(_), Some(_)) => {
            panic!("Only one of CONFIG and CONFIG_PATH environment variables should be specified")
        }
        (None, None) => {
            panic!("Either CONFIG or CONFIG_PATH environment variables should be specified")
        }
    };

    Ok(toml::from_str::<ServerConfig>(&config_str)?)
}

type Db = PgDatabaseClient;
type Store = PgOnDemandStore;
type TStore = PgTransactionalStore<'static>;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    info!("Loading config");
    let config = load_config()?;

    // Database connection:
    info!("Connecting to database");
    let database = Arc::new(PgDatabaseClient::connect(config.postgres.uri).await?);

    info!("Running migrations (if any)");
    database.run_migrations().await?;

    // Dependencies:
    let broker = Arc::new(XummClient::new(
        config.xumm.base_url,
        config.xumm.api_key,
        config.xumm.api_secret,
    ));
    let ledger = Arc::new(XrplClient::new(
        config.xrpl.json_rpc_url,
        config.xrpl.minter_seed,
    ));
    let minter = Arc::new(NftMinter::new(ledger, config.xrpl.minter_address));

    // Middleware:
    let middleware = ServiceBuilder::new()
        .timeout(Duration::from_secs(30))
        .into_inner();

    // Services:
    let reflection_service = tonic_reflection::server::Builder::configure()
        .register_encoded_file_descriptor_set(xrpact_api::FILE_DESCRIPTOR_SET)
        .build()?;
    let donation_service: DonationServiceImpl<Db, Store, TStore> =
        DonationServiceImpl::new(database.clone(), broker.clone());
    let achievement_service: AchievementServiceImpl<Db, Store, TStore> =
        AchievementServiceImpl::new(database.clone(), minter);
    let organization_service: OrganizationServiceImpl<Db, Store, TStore> =
        OrganizationServiceImpl::new(database.clone());
    let user_service: UserServiceImpl<Db, Store, TStore> =
        UserServiceImpl::new(database.clone(), broker);

    let addr = format!("0.0.0.0:{0}", config.port).parse()?;
    info!("Starting server: {:?}", addr);
    Server::builder()
        .layer(middleware)
        .add_service(reflection_service)
        .add_service(DonationServiceServer::new(donation_service))
        .add_service(AchievementServiceServer::new(achievement_service))
        .add_service(OrganizationServiceServer::new(organization_service))
        .add_service(UserServiceServer::new(user_service))
        .serve(addr)
        .await?;

    Ok(())
}
