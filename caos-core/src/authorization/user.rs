use std::result::Result as StdResult;

use thiserror::Error;

use crate::entities::user::{Rank, User};

#[derive(Debug, Error)]
pub enum Error {
    #[error("unauthorized rank")]
    UnauthorizedRank,
}

pub type Result<T> = StdResult<T, Error>;

pub fn authorize_rank(user: &User, min_required_rank: Rank) -> Result<()> {
    if user.is_global_admin() {
        return Ok(());
    }
    if user.rank < min_required_rank {
        return Err(Error::UnauthorizedRank);
    }
    Ok(())
}
