use crate::{
    entities::{jid::JId, narrative::*, proposal::*, user::*},
    mem, usecases, Result,
};

pub fn create_narrative(
    connections: &mem::Connections,
    author: &User,
    world: &JId,
    kind: NarrativeKind,
    titulo: String,
    contenido: String,
    timeline_period: Option<String>,
) -> Result<(Narrative, NarrativeProposal)> {
    let mut conn = connections.exclusive()?;
    Ok(conn.transaction(|db| {
        usecases::create_narrative(db, author, world, kind, titulo, contenido, timeline_period)
    })?)
}

pub fn propose_narrative_change(
    connections: &mem::Connections,
    author: &User,
    change: usecases::NewNarrativeChange,
) -> Result<NarrativeProposal> {
    let mut conn = connections.exclusive()?;
    Ok(conn.transaction(|db| usecases::propose_narrative_change(db, author, change))?)
}

pub fn approve_narrative_version(
    connections: &mem::Connections,
    reviewer: &User,
    proposal_id: ProposalId,
) -> Result<NarrativeProposal> {
    let mut conn = connections.exclusive()?;
    Ok(conn.transaction(|db| usecases::approve_narrative_version(db, reviewer, proposal_id))?)
}

pub fn reject_narrative_version(
    connections: &mem::Connections,
    reviewer: &User,
    proposal_id: ProposalId,
    feedback: Option<String>,
) -> Result<NarrativeProposal> {
    let mut conn = connections.exclusive()?;
    Ok(conn.transaction(|db| {
        usecases::reject_narrative_version(db, reviewer, proposal_id, feedback)
    })?)
}

pub fn publish_narrative_version(
    connections: &mem::Connections,
    actor: &User,
    proposal_id: ProposalId,
) -> Result<NarrativeProposal> {
    let mut conn = connections.exclusive()?;
    Ok(conn.transaction(|db| {
        usecases::publish_narrative_version(db, actor, proposal_id).map_err(|err| {
            warn!("Failed to publish narrative version {proposal_id}: {err}");
            err
        })
    })?)
}

pub fn restore_narrative_version(
    connections: &mem::Connections,
    actor: &User,
    origin_id: ProposalId,
) -> Result<NarrativeProposal> {
    let mut conn = connections.exclusive()?;
    Ok(conn.transaction(|db| usecases::restore_narrative_version(db, actor, origin_id))?)
}
