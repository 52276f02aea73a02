pub mod achievement;
pub mod donation;
pub mod organization;
pub mod user;
