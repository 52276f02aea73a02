use crate::protobuf::{from::ProtoFrom, into::IntoProto};
use tonic::Status;
use xrpact_api::xrpact::{Donation, DonationStatus};
use xrpact_storage::models::donation::{DonationRow, DonationStatus as DonationStatusRow};

impl ProtoFrom<DonationStatusRow> for DonationStatus {
    fn proto_from(value: DonationStatusRow) -> Result<Self, Status> {
        Ok(match value {
            DonationStatusRow::Pending => DonationStatus::Pending,
            DonationStatusRow::Completed => DonationStatus::Completed,
            DonationStatusRow::Failed => DonationStatus::Failed,
            DonationStatusRow::Expired => DonationStatus::Expired,
        })
    }
}

impl ProtoFrom<DonationRow> for Donation {
    fn proto_from(value: DonationRow) -> Result<Self, Status> {
        let status: DonationStatus = value.status.into_proto()?;
        Ok(Donation {
            donation_id: value.donation_id.to_string(),
            create_time: Some(value.create_time.into_proto()?),
            update_time: Some(value.update_time.into_proto()?),
            user_id: value.user_id.to_string(),
            org_id: value.org_id.to_string(),
            amount: value.amount.to_string(),
            platform_fee: value.platform_fee.to_string(),
            payload_uuid: value.payload_uuid,
            tx_hash: value.tx_hash.unwrap_or_default(),
            nftoken_id: value.nftoken_id.unwrap_or_default(),
            status: status.into(),
        })
    }
}
