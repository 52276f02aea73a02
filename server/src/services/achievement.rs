use crate::{
    achievements,
    ledger::nftoken::{NftMetadata, NftMinter},
};
use async_trait::async_trait;
use chrono::Utc;
use std::{marker::PhantomData, sync::Arc};
use tonic::{Request, Response, Status};
use uuid::Uuid;
use xrpact_api::xrpact::{
    achievement_service_server::AchievementService, ClaimAchievementRequest,
    ClaimAchievementResponse, MintAchievementNftRequest, MintAchievementNftResponse,
};
use xrpact_status::{
    already_exists, failed_precondition, invalid_argument, not_found, unavailable,
    well_known::missing_required_field,
};
use xrpact_storage::{
    database::{
        client::DatabaseClient,
        store::{OnDemandStore, TransactionalStore},
    },
    stores::user::UserStore,
};

/// Claims achievements by minting a reward NFT and offering it to the
/// user's wallet. The mint itself is a two-phase ledger workflow owned by
/// [`NftMinter`]; this service adds threshold checks and user bookkeeping.
pub struct AchievementServiceImpl<Db, Store, TStore> {
    database: Arc<Db>,
    minter: Arc<NftMinter>,
    _marker: PhantomData<fn() -> (Store, TStore)>,
}

impl<Db, Store, TStore> AchievementServiceImpl<Db, Store, TStore> {
    pub fn new(database: Arc<Db>, minter: Arc<NftMinter>) -> Self {
        Self {
            database,
            minter,
            _marker: PhantomData,
        }
    }
}

#[async_trait]
impl<Db, Store, TStore> AchievementService for AchievementServiceImpl<Db, Store, TStore>
where
    Db: DatabaseClient<Store, TStore> + 'static,
    Store: UserStore + OnDemandStore + 'static,
    TStore: UserStore + TransactionalStore + 'static,
    Self: Sync + Send,
{
    async fn claim_achievement(
        &self,
        request: Request<ClaimAchievementRequest>,
    ) -> Result<Response<ClaimAchievementResponse>, Status> {
        let message = request.into_inner();

        let achievement = achievements::find(&message.achievement_key).ok_or(
            invalid_argument!("unknown achievement: '{}'", message.achievement_key),
        )?;
        let user_id = message
            .user_id
            .parse::<Uuid>()
            .map_err(|e| invalid_argument!("'user_id' is invalid: {:?}", e))?;
        let user = self
            .database
            .on_demand()
            .find_user_by_id(user_id)
            .await?
            .ok_or(not_found!("user not found"))?;

        if user.has_claimed(achievement.key) {
            return Err(already_exists!(
                "achievement '{}' already claimed",
                achievement.key
            ));
        }
        if !achievement.requirement.met_by(&user) {
            return Err(failed_precondition!(
                "achievement '{}' requirements not met",
                achievement.key
            ));
        }

        let metadata = NftMetadata {
            name: format!("{} - Achievement NFT", achievement.title),
            description: achievement.description.to_string(),
            image: achievement.image.to_string(),
            achievement_key: achievement.key.to_string(),
            claimed_at: Utc::now(),
        };
        let minted = self
            .minter
            .mint_and_offer(user.wallet_address.clone(), &metadata)
            .await
            .map_err(|e| unavailable!("achievement mint failed: {:?}", e))?;

        // Bookkeeping is best-effort: the token is already minted and the
        // offer is live, so a failure here must not unwind the claim. It is
        // logged and surfaced as a warning next to the successful result.
        let bookkeeping_warning = match self
            .database
            .on_demand()
            .append_achievement_nft(
                user.user_id,
                achievement.key.to_string(),
                minted.nftoken_id.clone(),
                Utc::now(),
            )
            .await
        {
            Ok(_) => String::new(),
            Err(err) => {
                log::warn!(
                    "achievement bookkeeping failed for user {}: {:?}",
                    user.user_id,
                    err
                );
                format!("nft minted and offered, but bookkeeping failed: {:?}", err)
            }
        };

        Ok(Response::new(ClaimAchievementResponse {
            achievement_key: achievement.key.to_string(),
            achievement_title: achievement.title.to_string(),
            nft: Some(MintAchievementNftResponse {
                nftoken_id: minted.nftoken_id,
                offer_id: minted.offer_id,
                mint_tx_hash: minted.mint_tx_hash,
                offer_tx_hash: minted.offer_tx_hash,
            }),
            bookkeeping_warning,
        }))
    }

    async fn mint_achievement_nft(
        &self,
        request: Request<MintAchievementNftRequest>,
    ) -> Result<Response<MintAchievementNftResponse>, Status> {
        let message = request.into_inner();

        let receiver_address = Some(message.receiver_address)
            .filter(|address| !address.is_empty())
            .ok_or(missing_required_field("receiver_address"))?;
        let metadata = message
            .metadata
            .ok_or(missing_required_field("metadata"))?;

        let minted = self
            .minter
            .mint_and_offer(
                receiver_address,
                &NftMetadata {
                    name: metadata.title,
                    description: metadata.description,
                    image: metadata.image,
                    achievement_key: metadata.achievement_key,
                    claimed_at: Utc::now(),
                },
            )
            .await
            .map_err(|e| unavailable!("achievement mint failed: {:?}", e))?;

        Ok(Response::new(MintAchievementNftResponse {
            nftoken_id: minted.nftoken_id,
            offer_id: minted.offer_id,
            mint_tx_hash: minted.mint_tx_hash,
            offer_tx_hash: minted.offer_tx_hash,
        }))
    }
}
