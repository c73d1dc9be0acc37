use crate::{entities::user::*, mem, usecases, Result};

pub fn change_user_rank(
    connections: &mem::Connections,
    actor: &User,
    target: &UserName,
    new_rank: Rank,
) -> Result<User> {
    let mut conn = connections.exclusive()?;
    Ok(conn.transaction(|db| usecases::change_user_rank(db, actor, target, new_rank))?)
}

pub fn delete_user(
    connections: &mem::Connections,
    actor: &User,
    target: &UserName,
) -> Result<()> {
    let mut conn = connections.exclusive()?;
    Ok(conn.transaction(|db| usecases::delete_user(db, actor, target))?)
}
