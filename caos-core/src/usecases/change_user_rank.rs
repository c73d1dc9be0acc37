use super::prelude::*;
use crate::authorization::user::authorize_rank;

/// Changes another user's rank. The actor needs ADMIN, may only manage
/// users below their own rank and cannot promote anyone to or above it;
/// global admins are exempt from both bounds.
pub fn change_user_rank<R>(
    repo: &R,
    actor: &User,
    target: &UserName,
    new_rank: Rank,
) -> Result<User>
where
    R: UserRepo + EventLogRepo,
{
    authorize_rank(actor, Rank::Admin)?;
    let mut user = repo.get_user(target)?;
    if !actor.is_global_admin() {
        if user.rank >= actor.rank || new_rank >= actor.rank {
            return Err(Error::Forbidden);
        }
    }
    let old_rank = user.rank;
    user.rank = new_rank;
    repo.update_user(&user)?;
    repo.log_event(EventLogEntry::new(
        Some(actor.name.clone()),
        "CHANGE_USER_RANK",
        Some(target.to_string()),
        format!("{old_rank:?} -> {new_rank:?}"),
    ))?;
    Ok(user)
}
