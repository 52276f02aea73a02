use crate::protobuf::{from::ProtoFrom, into::IntoProto};
use tonic::Status;
use xrpact_api::xrpact::{AchievementNft, User};
use xrpact_storage::models::user::UserRow;

impl ProtoFrom<UserRow> for User {
    fn proto_from(value: UserRow) -> Result<Self, Status> {
        Ok(User {
            user_id: value.user_id.to_string(),
            create_time: Some(value.create_time.into_proto()?),
            update_time: Some(value.update_time.into_proto()?),
            wallet_address: value.wallet_address,
            username: value.username,
            pic_url: value.pic_url.unwrap_or_default(),
            total_donated: value.total_donated.to_string(),
            donation_count: value.donation_count,
            xp: value.xp,
            last_donation: value
                .last_donation
                .map(|last_donation| last_donation.into_proto())
                .transpose()?,
            claimed_achievements: value.claimed_achievements,
            achievement_nfts: value
                .achievement_nfts
                .0
                .into_iter()
                .map(|record| AchievementNft {
                    achievement_key: record.achievement_key,
                    nftoken_id: record.nftoken_id,
                })
                .collect(),
        })
    }
}
