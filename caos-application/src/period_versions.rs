use crate::{
    entities::{jid::JId, metadata::Metadata, period::*, proposal::*, user::*},
    mem, usecases, Result,
};

pub fn create_period(
    connections: &mem::Connections,
    author: &User,
    world: &JId,
    title: String,
    description: String,
    order: Option<u32>,
) -> Result<(TimelinePeriod, PeriodProposal)> {
    let mut conn = connections.exclusive()?;
    Ok(conn.transaction(|db| usecases::create_period(db, author, world, title, description, order))?)
}

#[allow(clippy::too_many_arguments)]
pub fn propose_period_edit(
    connections: &mem::Connections,
    author: &User,
    world: &JId,
    slug: &str,
    title: Option<String>,
    description: Option<String>,
    metadata: Option<Metadata>,
    change_log: String,
) -> Result<PeriodProposal> {
    let mut conn = connections.exclusive()?;
    Ok(conn.transaction(|db| {
        usecases::propose_period_edit(
            db,
            author,
            world,
            slug,
            title,
            description,
            metadata,
            change_log,
        )
    })?)
}

pub fn propose_period_delete(
    connections: &mem::Connections,
    author: &User,
    world: &JId,
    slug: &str,
    reason: String,
) -> Result<PeriodProposal> {
    let mut conn = connections.exclusive()?;
    Ok(conn.transaction(|db| usecases::propose_period_delete(db, author, world, slug, reason))?)
}

pub fn approve_period_version(
    connections: &mem::Connections,
    reviewer: &User,
    proposal_id: ProposalId,
) -> Result<PeriodProposal> {
    let mut conn = connections.exclusive()?;
    Ok(conn.transaction(|db| usecases::approve_period_version(db, reviewer, proposal_id))?)
}

pub fn reject_period_version(
    connections: &mem::Connections,
    reviewer: &User,
    proposal_id: ProposalId,
    feedback: Option<String>,
) -> Result<PeriodProposal> {
    let mut conn = connections.exclusive()?;
    Ok(conn.transaction(|db| {
        usecases::reject_period_version(db, reviewer, proposal_id, feedback)
    })?)
}

pub fn publish_period_version(
    connections: &mem::Connections,
    actor: &User,
    proposal_id: ProposalId,
) -> Result<PeriodProposal> {
    let mut conn = connections.exclusive()?;
    Ok(conn.transaction(|db| {
        usecases::publish_period_version(db, actor, proposal_id).map_err(|err| {
            warn!("Failed to publish period version {proposal_id}: {err}");
            err
        })
    })?)
}
