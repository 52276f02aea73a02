use chrono::{TimeZone, Utc};
use rust_decimal_macros::dec;
use testcontainers::clients::Cli;
use xrpact_storage::{
    database::client::DatabaseClient,
    models::organization::NewOrganizationRow,
    stores::organization::OrganizationStore,
    Error,
};

mod common;

fn new_organization(wallet_address: &str, at: chrono::DateTime<Utc>) -> NewOrganizationRow {
    NewOrganizationRow {
        create_time: at,
        update_time: at,
        name: "Clean Water".to_string(),
        description: "Wells everywhere".to_string(),
        full_description: Some("Long form mission statement".to_string()),
        wallet_address: wallet_address.to_string(),
        logo_url: Some("https://cdn.example.org/logo.png".to_string()),
        banner_url: None,
        website: Some("https://cleanwater.example.org".to_string()),
    }
}

#[tokio::test]
async fn duplicate_wallet_address_is_a_conflict() -> Result<(), Box<dyn std::error::Error>> {
    let docker_cli = Cli::default();
    let pg_container = common::setup_pg_container(&docker_cli).await?;
    let store = pg_container.client.on_demand();

    let at = Utc.timestamp_opt(500, 0).unwrap();
    let org = store
        .add_organization(new_organization("rORGANIZATIONxxxxxxxxxxxxxxxxxxxxx", at))
        .await?;
    assert_eq!(org.total_received, dec!(0));

    let duplicate = store
        .add_organization(new_organization("rORGANIZATIONxxxxxxxxxxxxxxxxxxxxx", at))
        .await;
    assert!(matches!(duplicate, Err(Error::Conflict(_))));

    Ok(())
}

#[tokio::test]
async fn received_total_accumulates() -> Result<(), Box<dyn std::error::Error>> {
    let docker_cli = Cli::default();
    let pg_container = common::setup_pg_container(&docker_cli).await?;
    let store = pg_container.client.on_demand();

    let at = Utc.timestamp_opt(500, 0).unwrap();
    let org = store
        .add_organization(new_organization("rORGANIZATIONxxxxxxxxxxxxxxxxxxxxx", at))
        .await?;

    let later = Utc.timestamp_opt(1000, 0).unwrap();
    let updated = store
        .add_organization_received(org.org_id, dec!(9.5), later)
        .await?;
    assert_eq!(updated.total_received, dec!(9.5));
    let updated = store
        .add_organization_received(org.org_id, dec!(0.95), later)
        .await?;
    assert_eq!(updated.total_received, dec!(10.45));

    Ok(())
}

#[tokio::test]
async fn list_pages_through_organizations() -> Result<(), Box<dyn std::error::Error>> {
    let docker_cli = Cli::default();
    let pg_container = common::setup_pg_container(&docker_cli).await?;
    let store = pg_container.client.on_demand();

    for sequence in 0..3 {
        let at = Utc.timestamp_opt(500 + sequence, 0).unwrap();
        store
            .add_organization(new_organization(
                &format!("rORGANIZATION{}xxxxxxxxxxxxxxxxxxxx", sequence),
                at,
            ))
            .await?;
    }

    let (rows, total_count) = store.list_and_count_organizations(2, None).await?;
    assert_eq!(total_count, 3);
    assert_eq!(rows.len(), 2);
    assert!(rows[0].create_time < rows[1].create_time);

    let (found, _) = store
        .list_and_count_organizations(
            10,
            Some(xrpact_storage::models::organization::OrganizationPageToken {
                create_time: rows[1].create_time,
            }),
        )
        .await?;
    assert_eq!(found.first().map(|row| row.org_id), Some(rows[1].org_id));

    Ok(())
}
