use crate::{
    entities::{id::PublicId, user::*, world::World},
    mem, usecases, Result,
};

/// The ordered list of representatives for the public index: visibility
/// filter first, then ghost collapse and aggressive indexing.
pub fn home_index(
    connections: &mem::Connections,
    user: Option<&User>,
    pinned_roots: &[PublicId],
) -> Result<Vec<World>> {
    let conn = connections.shared()?;
    let visible = usecases::visible_worlds(&*conn, user)?;
    Ok(usecases::home_index(visible, pinned_roots))
}

/// Everything attributable to a user, for the profile view.
pub fn discover_user_content(
    connections: &mem::Connections,
    target: &UserName,
    include_proposals: bool,
) -> Result<usecases::UserContent> {
    let conn = connections.shared()?;
    Ok(usecases::discover_user_content(
        &*conn,
        target,
        include_proposals,
    )?)
}
