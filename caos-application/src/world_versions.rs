use crate::{entities::proposal::*, entities::user::*, mem, usecases, Result};

/// Creates a brand-new world together with its initial CREATE proposal.
pub fn create_world(
    connections: &mem::Connections,
    author: &User,
    new_world: usecases::NewWorld,
) -> Result<WorldProposal> {
    let mut conn = connections.exclusive()?;
    Ok(conn.transaction(|db| usecases::create_world(db, author, new_world))?)
}

/// Files an UPDATE proposal against a world's LIVE track.
pub fn propose_world_change(
    connections: &mem::Connections,
    author: &User,
    change: usecases::NewWorldChange,
) -> Result<WorldProposal> {
    let mut conn = connections.exclusive()?;
    Ok(conn.transaction(|db| usecases::propose_world_change(db, author, change))?)
}

/// Files a TIMELINE snapshot proposal.
pub fn propose_timeline_snapshot(
    connections: &mem::Connections,
    author: &User,
    new: usecases::NewTimelineSnapshot,
) -> Result<WorldProposal> {
    let mut conn = connections.exclusive()?;
    Ok(conn.transaction(|db| usecases::propose_timeline_snapshot(db, author, new))?)
}

pub fn propose_world_delete(
    connections: &mem::Connections,
    author: &User,
    world: &crate::entities::jid::JId,
    reason: String,
) -> Result<WorldProposal> {
    let mut conn = connections.exclusive()?;
    Ok(conn.transaction(|db| usecases::propose_world_delete(db, author, world, reason))?)
}

pub fn propose_set_cover(
    connections: &mem::Connections,
    author: &User,
    world: &crate::entities::jid::JId,
    cover_image: String,
) -> Result<WorldProposal> {
    let mut conn = connections.exclusive()?;
    Ok(conn.transaction(|db| usecases::propose_set_cover(db, author, world, cover_image))?)
}

pub fn propose_visibility(
    connections: &mem::Connections,
    author: &User,
    world: &crate::entities::jid::JId,
    target_visibility: bool,
) -> Result<WorldProposal> {
    let mut conn = connections.exclusive()?;
    Ok(conn.transaction(|db| {
        usecases::propose_visibility(db, author, world, target_visibility)
    })?)
}

pub fn approve_world_version(
    connections: &mem::Connections,
    reviewer: &User,
    proposal_id: ProposalId,
) -> Result<WorldProposal> {
    let mut conn = connections.exclusive()?;
    Ok(conn.transaction(|db| usecases::approve_world_version(db, reviewer, proposal_id))?)
}

pub fn reject_world_version(
    connections: &mem::Connections,
    reviewer: &User,
    proposal_id: ProposalId,
    feedback: Option<String>,
) -> Result<WorldProposal> {
    let mut conn = connections.exclusive()?;
    Ok(conn.transaction(|db| {
        usecases::reject_world_version(db, reviewer, proposal_id, feedback)
    })?)
}

/// Publishes an approved proposal. The whole publish (live-record mutation,
/// demotion of the prior LIVE, archival of obsolete proposals, notification
/// and audit entry) commits or rolls back as one unit: a failed publish
/// leaves the prior LIVE untouched.
pub fn publish_world_version(
    connections: &mem::Connections,
    actor: &User,
    proposal_id: ProposalId,
) -> Result<usecases::PublishOutcome> {
    let mut conn = connections.exclusive()?;
    Ok(conn.transaction(|db| {
        usecases::publish_world_version(db, actor, proposal_id).map_err(|err| {
            warn!("Failed to publish world version {proposal_id}: {err}");
            err
        })
    })?)
}

pub fn archive_world_version(
    connections: &mem::Connections,
    actor: &User,
    proposal_id: ProposalId,
) -> Result<WorldProposal> {
    let mut conn = connections.exclusive()?;
    Ok(conn.transaction(|db| usecases::archive_world_version(db, actor, proposal_id))?)
}

/// Clone-restore: a fresh PENDING proposal payload-equal to the origin.
pub fn restore_world_version(
    connections: &mem::Connections,
    actor: &User,
    origin_id: ProposalId,
) -> Result<WorldProposal> {
    let mut conn = connections.exclusive()?;
    Ok(conn.transaction(|db| usecases::restore_world_version(db, actor, origin_id))?)
}

/// Hard delete of a trashed world. Admin only.
pub fn hard_delete_world(
    connections: &mem::Connections,
    actor: &User,
    world: &crate::entities::jid::JId,
) -> Result<()> {
    let mut conn = connections.exclusive()?;
    Ok(conn.transaction(|db| usecases::hard_delete_world(db, actor, world))?)
}

/// Retouch-restore: hands back an editable draft without transitioning the
/// archived record.
pub fn retouch_world_version(
    connections: &mem::Connections,
    origin_id: ProposalId,
) -> Result<usecases::RetouchDraft> {
    let conn = connections.shared()?;
    Ok(usecases::retouch_world_version(&*conn, origin_id)?)
}

/// Review dashboard of a user.
pub fn dashboard(
    connections: &mem::Connections,
    viewer: &User,
    filters: &usecases::DashboardFilters,
) -> Result<usecases::Dashboard> {
    let conn = connections.shared()?;
    Ok(usecases::dashboard(&*conn, viewer, filters)?)
}
