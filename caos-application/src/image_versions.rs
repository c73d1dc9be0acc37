use caos_core::gateways::images::ImageStorage;

use crate::{
    entities::{proposal::*, user::*},
    mem, usecases, Result,
};

pub fn propose_image_change(
    connections: &mem::Connections,
    author: &User,
    new: usecases::NewImageProposal,
) -> Result<ImageProposal> {
    let mut conn = connections.exclusive()?;
    Ok(conn.transaction(|db| usecases::propose_image_change(db, author, new))?)
}

pub fn approve_image_proposal(
    connections: &mem::Connections,
    reviewer: &User,
    proposal_id: ProposalId,
) -> Result<ImageProposal> {
    let mut conn = connections.exclusive()?;
    Ok(conn.transaction(|db| usecases::approve_image_proposal(db, reviewer, proposal_id))?)
}

pub fn reject_image_proposal(
    connections: &mem::Connections,
    reviewer: &User,
    proposal_id: ProposalId,
    feedback: Option<String>,
) -> Result<ImageProposal> {
    let mut conn = connections.exclusive()?;
    Ok(conn.transaction(|db| {
        usecases::reject_image_proposal(db, reviewer, proposal_id, feedback)
    })?)
}

/// Publishes an approved image proposal. The file move happens inside the
/// unit; a storage failure aborts it and leaves the store untouched.
pub fn publish_image_proposal(
    connections: &mem::Connections,
    storage: &dyn ImageStorage,
    actor: &User,
    proposal_id: ProposalId,
) -> Result<ImageProposal> {
    let mut conn = connections.exclusive()?;
    Ok(conn.transaction(|db| {
        usecases::publish_image_proposal(db, storage, actor, proposal_id).map_err(|err| {
            warn!("Failed to publish image proposal {proposal_id}: {err}");
            err
        })
    })?)
}

/// Undoes a published DELETE: the file moves back out of the trash folder.
pub fn restore_image_proposal(
    connections: &mem::Connections,
    storage: &dyn ImageStorage,
    actor: &User,
    proposal_id: ProposalId,
) -> Result<ImageProposal> {
    let mut conn = connections.exclusive()?;
    Ok(conn.transaction(|db| {
        usecases::restore_image_proposal(db, storage, actor, proposal_id)
    })?)
}
