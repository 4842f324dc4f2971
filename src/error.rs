use jsonwebtoken::errors::Error as JwtError;
use rocket::{http::Status, response::Responder, Request};
use thiserror::Error;

use crate::model::{election::ElectionError, oracle::OracleError};

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Election(#[from] ElectionError),
    #[error(transparent)]
    Jwt(#[from] JwtError),
    #[error("Balance oracle unavailable: {0}")]
    Oracle(#[from] OracleError),
    #[error("{1}")]
    Status(Status, String),
}

impl Error {
    /// The HTTP status this error is reported with.
    pub fn status(&self) -> Status {
        match self {
            Self::Election(err) => match err {
                ElectionError::Validation(_) | ElectionError::Integrity(_) => Status::BadRequest,
                ElectionError::Authorization(_) => Status::Forbidden,
                ElectionError::NotFound(_) => Status::NotFound,
                ElectionError::AlreadyDone(_) => Status::Conflict,
                ElectionError::State(_) => Status::UnprocessableEntity,
            },
            Self::Jwt(_) => Status::Unauthorized,
            Self::Oracle(_) => Status::ServiceUnavailable,
            Self::Status(status, _) => *status,
        }
    }
}

impl<'r, 'o: 'r> Responder<'r, 'o> for Error {
    fn respond_to(self, req: &'r Request<'_>) -> rocket::response::Result<'o> {
        let status = self.status();
        match self {
            Self::Oracle(_) => error!("{self}"),
            _ => debug!("Rejected {} {}: {self}", req.method(), req.uri()),
        }
        (status, self.to_string()).respond_to(req)
    }
}
