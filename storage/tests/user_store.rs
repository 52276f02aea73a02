use chrono::{TimeZone, Utc};
use rust_decimal_macros::dec;
use testcontainers::clients::Cli;
use xrpact_storage::{
    database::client::DatabaseClient,
    models::user::{AchievementNftRecord, NewUserRow},
    stores::user::UserStore,
    Error,
};

mod common;

#[tokio::test]
async fn donation_stats_accumulate() -> Result<(), Box<dyn std::error::Error>> {
    let docker_cli = Cli::default();
    let pg_container = common::setup_pg_container(&docker_cli).await?;
    let store = pg_container.client.on_demand();

    let created = Utc.timestamp_opt(500, 0).unwrap();
    let user = store
        .add_user(NewUserRow {
            create_time: created,
            update_time: created,
            wallet_address: "rDONATORxxxxxxxxxxxxxxxxxxxxxxxxxx".to_string(),
            username: "donator".to_string(),
            pic_url: None,
        })
        .await?;
    assert_eq!(user.donation_count, 0);
    assert_eq!(user.total_donated, dec!(0));
    assert_eq!(user.xp, 0);
    assert_eq!(user.last_donation, None);

    let first = Utc.timestamp_opt(1000, 0).unwrap();
    let updated = store
        .apply_donation_stats(user.user_id, dec!(10), 100, first)
        .await?;
    assert_eq!(updated.donation_count, 1);
    assert_eq!(updated.total_donated, dec!(10));
    assert_eq!(updated.xp, 100);
    assert_eq!(updated.last_donation, Some(first));

    let second = Utc.timestamp_opt(2000, 0).unwrap();
    let updated = store
        .apply_donation_stats(user.user_id, dec!(2.5), 25, second)
        .await?;
    assert_eq!(updated.donation_count, 2);
    assert_eq!(updated.total_donated, dec!(12.5));
    assert_eq!(updated.xp, 125);
    assert_eq!(updated.last_donation, Some(second));

    Ok(())
}

#[tokio::test]
async fn append_achievement_nft_extends_bookkeeping() -> Result<(), Box<dyn std::error::Error>>
{
    let docker_cli = Cli::default();
    let pg_container = common::setup_pg_container(&docker_cli).await?;
    let store = pg_container.client.on_demand();

    let created = Utc.timestamp_opt(500, 0).unwrap();
    let user = store
        .add_user(NewUserRow {
            create_time: created,
            update_time: created,
            wallet_address: "rDONATORxxxxxxxxxxxxxxxxxxxxxxxxxx".to_string(),
            username: "donator".to_string(),
            pic_url: None,
        })
        .await?;
    assert!(user.claimed_achievements.is_empty());

    let claimed_at = Utc.timestamp_opt(1000, 0).unwrap();
    let updated = store
        .append_achievement_nft(
            user.user_id,
            "first_donation".to_string(),
            "000800006203F49C".to_string(),
            claimed_at,
        )
        .await?;
    assert!(updated.has_claimed("first_donation"));
    assert_eq!(
        updated.achievement_nfts.0,
        vec![AchievementNftRecord {
            achievement_key: "first_donation".to_string(),
            nftoken_id: "000800006203F49C".to_string(),
        }]
    );

    Ok(())
}

#[tokio::test]
async fn duplicate_wallet_address_is_a_conflict() -> Result<(), Box<dyn std::error::Error>> {
    let docker_cli = Cli::default();
    let pg_container = common::setup_pg_container(&docker_cli).await?;
    let store = pg_container.client.on_demand();

    let created = Utc.timestamp_opt(500, 0).unwrap();
    let new_user = || NewUserRow {
        create_time: created,
        update_time: created,
        wallet_address: "rDONATORxxxxxxxxxxxxxxxxxxxxxxxxxx".to_string(),
        username: "donator".to_string(),
        pic_url: None,
    };
    store.add_user(new_user()).await?;

    let duplicate = store.add_user(new_user()).await;
    assert!(matches!(duplicate, Err(Error::Conflict(_))));

    let found = store
        .find_user_by_wallet_address("rDONATORxxxxxxxxxxxxxxxxxxxxxxxxxx".to_string())
        .await?;
    assert!(found.is_some());

    Ok(())
}
