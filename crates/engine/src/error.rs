//! The module contains the error the engine can throw.
//!
//! Every failure surfaced by the engine belongs to one [`ErrorKind`]:
//!
//! - [`InvalidInput`] malformed or out-of-range values, rejected before any
//!   write happens.
//! - [`NotFound`] the target does not exist *for the caller*. Records owned by
//!   another user are reported the same way, so their existence never leaks.
//! - [`Conflict`] the operation would break a referential rule.
//! - [`Database`] the store failed; the unit of work was rolled back.
//!
//!  [`InvalidInput`]: EngineError::InvalidInput
//!  [`NotFound`]: EngineError::NotFound
//!  [`Conflict`]: EngineError::Conflict
//!  [`Database`]: EngineError::Database
use sea_orm::DbErr;
use thiserror::Error;

/// Engine custom errors.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error("{0} not found")]
    NotFound(String),
    #[error("Conflict: {0}")]
    Conflict(String),
    #[error(transparent)]
    Database(#[from] DbErr),
}

/// Coarse error classification shared with the transport layer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    InvalidInput,
    Unauthorized,
    NotFound,
    Conflict,
    Internal,
}

impl ErrorKind {
    /// HTTP-like status code for this kind.
    #[must_use]
    pub const fn status_code(self) -> u16 {
        match self {
            Self::InvalidInput => 400,
            Self::Unauthorized => 401,
            Self::NotFound => 404,
            Self::Conflict => 409,
            Self::Internal => 500,
        }
    }
}

impl EngineError {
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidInput(_) => ErrorKind::InvalidInput,
            Self::NotFound(_) => ErrorKind::NotFound,
            Self::Conflict(_) => ErrorKind::Conflict,
            Self::Database(_) => ErrorKind::Internal,
        }
    }
}

impl PartialEq for EngineError {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::InvalidInput(a), Self::InvalidInput(b)) => a == b,
            (Self::NotFound(a), Self::NotFound(b)) => a == b,
            (Self::Conflict(a), Self::Conflict(b)) => a == b,
            (Self::Database(a), Self::Database(b)) => a.to_string() == b.to_string(),
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kinds_map_to_status_codes() {
        assert_eq!(
            EngineError::InvalidInput("x".to_string()).kind().status_code(),
            400
        );
        assert_eq!(EngineError::NotFound("account".to_string()).kind().status_code(), 404);
        assert_eq!(EngineError::Conflict("x".to_string()).kind().status_code(), 409);
        assert_eq!(
            EngineError::Database(DbErr::Custom("boom".to_string()))
                .kind()
                .status_code(),
            500
        );
        assert_eq!(ErrorKind::Unauthorized.status_code(), 401);
    }

    #[test]
    fn not_found_message_names_the_target() {
        let err = EngineError::NotFound("account".to_string());
        assert_eq!(err.to_string(), "account not found");
    }
}
