pub mod achievements;
pub mod config;
pub mod ledger;
pub mod money;
pub mod protobuf;
pub mod protos;
pub mod services;
pub mod xumm;
