use crate::protobuf::{from::ProtoFrom, into::IntoProto};
use tonic::Status;
use xrpact_api::xrpact::Organization;
use xrpact_storage::models::organization::OrganizationRow;

impl ProtoFrom<OrganizationRow> for Organization {
    fn proto_from(value: OrganizationRow) -> Result<Self, Status> {
        Ok(Organization {
            org_id: value.org_id.to_string(),
            create_time: Some(value.create_time.into_proto()?),
            update_time: Some(value.update_time.into_proto()?),
            name: value.name,
            description: value.description,
            full_description: value.full_description.unwrap_or_default(),
            wallet_address: value.wallet_address,
            logo_url: value.logo_url.unwrap_or_default(),
            banner_url: value.banner_url.unwrap_or_default(),
            website: value.website.unwrap_or_default(),
            total_received: value.total_received.to_string(),
        })
    }
}
