use thiserror::Error;

use crate::{
    entities::{proposal::TimelineCouplingViolation, status::ProposalStatus},
    repositories,
    temporal::TemporalConsistencyError,
};

#[derive(Debug, Error)]
pub enum Error {
    #[error("The requested object could not be found")]
    NotFound,
    #[error("Illegal status transition: {from} -> {to}")]
    IllegalTransition {
        from: ProposalStatus,
        to: ProposalStatus,
    },
    #[error("This is not allowed")]
    Forbidden,
    #[error("This is not allowed without auth")]
    Unauthorized,
    #[error("Invariant violation: {0}")]
    InvariantViolation(String),
    #[error(transparent)]
    Temporal(#[from] TemporalConsistencyError),
    #[error("Invalid payload: {0}")]
    Validation(String),
    #[error("External collaborator failed: {0}")]
    External(String),
    #[error(transparent)]
    Repo(#[from] repositories::Error),
}

impl From<TimelineCouplingViolation> for Error {
    fn from(err: TimelineCouplingViolation) -> Self {
        Self::InvariantViolation(err.to_string())
    }
}

impl From<crate::authorization::user::Error> for Error {
    fn from(_: crate::authorization::user::Error) -> Self {
        Self::Unauthorized
    }
}
