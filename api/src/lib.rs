pub mod xrpact {
    tonic::include_proto!("xrpact");
}

/// Encoded file descriptor set, registered with the gRPC reflection service.
pub const FILE_DESCRIPTOR_SET: &[u8] = tonic::include_file_descriptor_set!("xrpact_descriptor");
