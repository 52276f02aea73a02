use xrpact_status::Status;

pub mod database;
pub mod models;
pub mod page_token;
pub mod pg;
pub mod stores;

#[derive(thiserror::Error, Debug)]
pub enum Error {
    // Error occurred when executing some SQL operation.
    #[error("sql failed: {0:?}")]
    Sql(#[from] sqlx::Error),

    // Error occurred when running migrations.
    #[error("migration failed: {0:?}")]
    Migrate(#[from] sqlx::migrate::MigrateError),

    // A uniqueness constraint rejected the write.
    #[error("conflict: {0}")]
    Conflict(String),

    // Page token serialization/deserialization failed.
    #[error(transparent)]
    PageToken(anyhow::Error),

    // Some other/unexpected error occurred.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl Error {
    // Turns a unique violation into Conflict so callers can tell duplicate
    // writes apart from plain sql failures.
    pub(crate) fn or_conflict(err: sqlx::Error, conflict: &str) -> Self {
        match &err {
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                Error::Conflict(conflict.to_string())
            }
            _ => Error::Sql(err),
        }
    }
}

impl From<Error> for Status {
    fn from(error: Error) -> Self {
        match error {
            Error::Conflict(message) => Status::already_exists(message),
            error => Status::internal(format!("storage error: {:?}", error)),
        }
    }
}
