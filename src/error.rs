use jsonwebtoken::errors::Error as JwtError;
use mongodb::{bson::ser::Error as BsonSerError, error::Error as DbError};
use rocket::{
    http::{Status, StatusClass},
    response::{self, Responder},
    serde::json::Json,
    Request,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::logging::RequestId;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Db(#[from] DbError),
    #[error(transparent)]
    BsonSer(#[from] BsonSerError),
    #[error(transparent)]
    Jwt(#[from] JwtError),
    #[error("{0} not found")]
    NotFound(String),
    #[error("{0}")]
    Conflict(String),
    #[error("{0}")]
    MissingReference(String),
    #[error("{0}")]
    Unauthorized(String),
    #[error("{0}")]
    Internal(String),
}

impl Error {
    /// Convenience constructor for [`Error::NotFound`].
    pub fn not_found(what: impl Into<String>) -> Self {
        Self::NotFound(what.into())
    }

    /// The HTTP status this error is reported with.
    pub fn status(&self) -> Status {
        match self {
            Self::Db(_) | Self::BsonSer(_) | Self::Jwt(_) | Self::Internal(_) => {
                Status::InternalServerError
            }
            Self::NotFound(_) => Status::NotFound,
            Self::Conflict(_) => Status::Conflict,
            Self::MissingReference(_) => Status::BadRequest,
            Self::Unauthorized(_) => Status::Unauthorized,
        }
    }
}

/// The JSON body of every error response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub detail: String,
}

impl<'r, 'o: 'r> Responder<'r, 'o> for Error {
    fn respond_to(self, req: &'r Request<'_>) -> response::Result<'o> {
        let id = req.local_cache(RequestId::next);
        let status = self.status();
        // Internal details stay in the log.
        let detail = if status.class() == StatusClass::ServerError {
            error!("req{id} failed: {self}");
            "Internal server error".to_string()
        } else {
            debug!("req{id} rejected: {self}");
            self.to_string()
        };
        (status, Json(ErrorBody { detail })).respond_to(req)
    }
}
