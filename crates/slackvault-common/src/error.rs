use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("connection error: {0}")]
    Connection(String),

    #[error("database error: {0}")]
    Database(String),

    /// A unique constraint rejected the write. For snapshot tables this
    /// means the row is already current, not that something went wrong.
    #[error("row already exists")]
    AlreadyExists,

    #[error("migration load error: {0}")]
    MigrationLoad(String),

    /// An applied migration follows a pending one in timestamp order.
    /// The history is inconsistent and nothing may be executed.
    #[error("migration gap: {applied} is recorded as applied but {pending} before it is not")]
    MigrationGap { pending: String, applied: String },

    #[error("export source error: {0}")]
    Source(String),

    #[error("upload error: {0}")]
    Upload(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl Error {
    /// True when a write was rejected because the row is already current.
    /// Callers treat this as a skip, never as a failure.
    pub fn is_already_exists(&self) -> bool {
        matches!(self, Error::AlreadyExists)
    }
}
