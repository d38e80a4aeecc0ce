use thiserror::Error;

use crate::dao::DaoError;
use crate::events::BusError;
use crate::whiteboard::WhiteboardError;

/// Errors surfaced by live-room operations.
#[derive(Debug, Error)]
pub enum RoomError {
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Invalid transition: {0}")]
    InvalidTransition(String),
    #[error("Unauthorized: {0}")]
    Unauthorized(String),
    #[error("Validation: {0}")]
    Validation(String),
    #[error("Already exists: {0}")]
    AlreadyExists(String),
    #[error("No rows updated")]
    NoRowsUpdated,
    #[error("Dependency failure: {0}")]
    Dependency(String),
}

pub type RoomResult<T> = Result<T, RoomError>;

impl From<DaoError> for RoomError {
    fn from(err: DaoError) -> Self {
        match err {
            DaoError::NotFound => RoomError::NotFound("Resource not found".to_string()),
            DaoError::DuplicateKey(msg) => RoomError::AlreadyExists(msg),
            DaoError::NoRowsUpdated => RoomError::NoRowsUpdated,
            DaoError::Mongo(e) => RoomError::Dependency(e.to_string()),
            DaoError::BsonSer(e) => RoomError::Dependency(e.to_string()),
            DaoError::BsonDe(e) => RoomError::Dependency(e.to_string()),
        }
    }
}

impl From<BusError> for RoomError {
    fn from(err: BusError) -> Self {
        RoomError::Dependency(err.to_string())
    }
}

impl From<WhiteboardError> for RoomError {
    fn from(err: WhiteboardError) -> Self {
        RoomError::Dependency(err.to_string())
    }
}
