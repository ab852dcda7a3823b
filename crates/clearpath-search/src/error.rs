use clearpath_core::SourceId;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SearchError {
    #[error("invalid search request: {reason}")]
    InvalidRequest { reason: String },

    #[error("unknown source '{source_id}'")]
    UnknownSource { source_id: String },

    #[error("source {source_id} is not registered")]
    NotRegistered { source_id: SourceId },

    #[error("store error: {0}")]
    Store(#[from] clearpath_db::DatabaseError),
}

pub type Result<T> = std::result::Result<T, SearchError>;
