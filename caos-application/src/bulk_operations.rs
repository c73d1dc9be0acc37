use crate::{entities::proposal::*, entities::user::*, mem, usecases, Result};

/// Bulk variants run each sub-operation as its own atomic unit; a failing
/// item is reported in the outcome instead of aborting the batch.
pub fn bulk_approve_world_versions(
    connections: &mem::Connections,
    reviewer: &User,
    ids: &[ProposalId],
) -> Result<usecases::BulkOutcome> {
    let mut conn = connections.exclusive()?;
    Ok(usecases::bulk_apply(ids, |id| {
        conn.transaction(|db| usecases::approve_world_version(db, reviewer, id))
            .map(|_| ())
    }))
}

pub fn bulk_reject_world_versions(
    connections: &mem::Connections,
    reviewer: &User,
    ids: &[ProposalId],
    feedback: Option<String>,
) -> Result<usecases::BulkOutcome> {
    let mut conn = connections.exclusive()?;
    Ok(usecases::bulk_apply(ids, |id| {
        conn.transaction(|db| {
            usecases::reject_world_version(db, reviewer, id, feedback.clone())
        })
        .map(|_| ())
    }))
}

pub fn bulk_archive_world_versions(
    connections: &mem::Connections,
    actor: &User,
    ids: &[ProposalId],
) -> Result<usecases::BulkOutcome> {
    let mut conn = connections.exclusive()?;
    Ok(usecases::bulk_apply(ids, |id| {
        conn.transaction(|db| usecases::archive_world_version(db, actor, id))
            .map(|_| ())
    }))
}

pub fn bulk_publish_world_versions(
    connections: &mem::Connections,
    actor: &User,
    ids: &[ProposalId],
) -> Result<usecases::BulkOutcome> {
    let mut conn = connections.exclusive()?;
    Ok(usecases::bulk_apply(ids, |id| {
        conn.transaction(|db| usecases::publish_world_version(db, actor, id))
            .map(|_| ())
    }))
}
