use chrono::{TimeZone, Utc};
use rust_decimal_macros::dec;
use testcontainers::clients::Cli;
use xrpact_storage::{
    database::client::DatabaseClient,
    models::{
        donation::{DonationStatus, NewDonationRow},
        organization::NewOrganizationRow,
        user::NewUserRow,
    },
    stores::{donation::DonationStore, organization::OrganizationStore, user::UserStore},
    Error,
};

mod common;

async fn seed(
    store: &xrpact_storage::pg::store::PgOnDemandStore,
) -> Result<(uuid::Uuid, uuid::Uuid), Box<dyn std::error::Error>> {
    let now = Utc.timestamp_opt(1000, 0).unwrap();
    let user = store
        .add_user(NewUserRow {
            create_time: now,
            update_time: now,
            wallet_address: "rDONATORxxxxxxxxxxxxxxxxxxxxxxxxxx".to_string(),
            username: "donator".to_string(),
            pic_url: None,
        })
        .await?;
    let org = store
        .add_organization(NewOrganizationRow {
            create_time: now,
            update_time: now,
            name: "Clean Water".to_string(),
            description: "Wells everywhere".to_string(),
            full_description: None,
            wallet_address: "rORGANIZATIONxxxxxxxxxxxxxxxxxxxxx".to_string(),
            logo_url: None,
            banner_url: None,
            website: None,
        })
        .await?;
    Ok((user.user_id, org.org_id))
}

#[tokio::test]
async fn complete_donation_records_tx_hash_exactly_once(
) -> Result<(), Box<dyn std::error::Error>> {
    let docker_cli = Cli::default();
    let pg_container = common::setup_pg_container(&docker_cli).await?;
    let store = pg_container.client.on_demand();
    let (user_id, org_id) = seed(&store).await?;

    let now = Utc.timestamp_opt(2000, 0).unwrap();
    let new_donation = |payload_uuid: &str| NewDonationRow {
        create_time: now,
        update_time: now,
        user_id,
        org_id,
        amount: dec!(10),
        platform_fee: dec!(0.5),
        payload_uuid: payload_uuid.to_string(),
    };
    let first = store.add_donation(new_donation("payload-1")).await?;
    let second = store.add_donation(new_donation("payload-2")).await?;
    assert_eq!(first.status, DonationStatus::Pending);
    assert_eq!(first.tx_hash, None);

    // First resolution wins.
    let completed = store
        .complete_donation(first.donation_id, "ABC123".to_string(), now)
        .await?
        .expect("donation should transition to completed");
    assert_eq!(completed.status, DonationStatus::Completed);
    assert_eq!(completed.tx_hash.as_deref(), Some("ABC123"));

    // The same hash on a different donation is a conflict, and the second
    // donation stays pending.
    let conflict = store
        .complete_donation(second.donation_id, "ABC123".to_string(), now)
        .await;
    assert!(matches!(conflict, Err(Error::Conflict(_))));
    let second = store
        .find_donation_by_id(second.donation_id)
        .await?
        .expect("second donation should still exist");
    assert_eq!(second.status, DonationStatus::Pending);

    // A donation never transitions out of a terminal state.
    let repeat = store
        .complete_donation(first.donation_id, "DEF456".to_string(), now)
        .await?;
    assert_eq!(repeat, None);
    let reread = store
        .find_donation_by_tx_hash("ABC123".to_string())
        .await?
        .expect("completed donation should be findable by hash");
    assert_eq!(reread.donation_id, first.donation_id);

    Ok(())
}

#[tokio::test]
async fn mark_donation_only_transitions_pending_rows() -> Result<(), Box<dyn std::error::Error>>
{
    let docker_cli = Cli::default();
    let pg_container = common::setup_pg_container(&docker_cli).await?;
    let store = pg_container.client.on_demand();
    let (user_id, org_id) = seed(&store).await?;

    let now = Utc.timestamp_opt(2000, 0).unwrap();
    let donation = store
        .add_donation(NewDonationRow {
            create_time: now,
            update_time: now,
            user_id,
            org_id,
            amount: dec!(2),
            platform_fee: dec!(0.1),
            payload_uuid: "payload-3".to_string(),
        })
        .await?;

    let expired = store
        .mark_donation_expired(donation.donation_id, now)
        .await?
        .expect("pending donation should expire");
    assert_eq!(expired.status, DonationStatus::Expired);

    // Already terminal; a late rejection must not overwrite it.
    let failed = store.mark_donation_failed(donation.donation_id, now).await?;
    assert_eq!(failed, None);

    Ok(())
}

#[tokio::test]
async fn list_donations_newest_first() -> Result<(), Box<dyn std::error::Error>> {
    let docker_cli = Cli::default();
    let pg_container = common::setup_pg_container(&docker_cli).await?;
    let store = pg_container.client.on_demand();
    let (user_id, org_id) = seed(&store).await?;

    for sequence in 0..3 {
        let at = Utc.timestamp_opt(3000 + sequence, 0).unwrap();
        store
            .add_donation(NewDonationRow {
                create_time: at,
                update_time: at,
                user_id,
                org_id,
                amount: dec!(1),
                platform_fee: dec!(0.05),
                payload_uuid: format!("payload-{}", sequence),
            })
            .await?;
    }

    let (rows, total_count) = store
        .list_and_count_donations_for_user(10, None, user_id)
        .await?;
    assert_eq!(total_count, 3);
    assert_eq!(rows.len(), 3);
    assert!(rows[0].create_time > rows[1].create_time);
    assert!(rows[1].create_time > rows[2].create_time);

    Ok(())
}
