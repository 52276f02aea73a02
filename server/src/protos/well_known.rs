use crate::protobuf::from::{FromProto, ProtoFrom};
use chrono::{DateTime, TimeZone, Utc};
use prost_types::Timestamp;
use rust_decimal::Decimal;
use std::str::FromStr;
use tonic::Status;
use uuid::Uuid;
use xrpact_status::invalid_argument;

impl FromProto<String> for Uuid {
    fn from_proto(proto: String) -> Result<Self, Status> {
        Uuid::parse_str(&proto).map_err(|e| invalid_argument!("could not parse uuid: {:?}", e))
    }
}

impl ProtoFrom<Uuid> for String {
    fn proto_from(value: Uuid) -> Result<Self, Status> {
        Ok(value.to_string())
    }
}

/// google.protobuf.Timestamp -> DateTime<Utc>
impl FromProto<Timestamp> for DateTime<Utc> {
    fn from_proto(proto: Timestamp) -> Result<Self, Status> {
        let nanos = proto
            .nanos
            .try_into()
            .map_err(|e| invalid_argument!("invalid nanos: {:?}", e))?;
        Utc.timestamp_opt(proto.seconds, nanos)
            .single()
            .ok_or_else(|| invalid_argument!("timestamp out of range"))
    }
}

/// DateTime<Utc> -> google.protobuf.Timestamp
impl ProtoFrom<DateTime<Utc>> for Timestamp {
    fn proto_from(value: DateTime<Utc>) -> Result<Self, Status> {
        Ok(Timestamp {
            seconds: value.timestamp(),
            nanos: value
                .timestamp_subsec_nanos()
                .try_into()
                .map_err(|e| invalid_argument!("invalid nanos: {:?}", e))?,
        })
    }
}

/// Decimal XRP amounts travel as strings on the wire.
impl FromProto<String> for Decimal {
    fn from_proto(proto: String) -> Result<Self, Status> {
        Decimal::from_str(&proto).map_err(|e| invalid_argument!("could not parse amount: {:?}", e))
    }
}

impl ProtoFrom<Decimal> for String {
    fn proto_from(value: Decimal) -> Result<Self, Status> {
        Ok(value.to_string())
    }
}
