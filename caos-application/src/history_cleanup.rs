use caos_core::repositories::WorldProposalRepo;

use crate::{
    entities::{status::ProposalStatus, time::TimestampMs},
    mem, Result,
};

/// Purges archived proposal records created before the cutoff. Used by the
/// operator CLI; LIVE and HISTORY versions are never touched, so published
/// lineage stays reconstructible.
pub fn history_cleanup(
    connections: &mem::Connections,
    archived_before: TimestampMs,
) -> Result<usize> {
    let mut conn = connections.exclusive()?;
    let purged = conn.transaction::<_, _, caos_core::usecases::Error>(|db| {
        let stale: Vec<_> = db
            .query_world_proposals(&Default::default())?
            .into_iter()
            .filter(|p| p.status == ProposalStatus::Archived && p.created_at < archived_before)
            .collect();
        for proposal in &stale {
            db.delete_world_proposal(proposal.id)?;
        }
        Ok(stale.len())
    })?;
    if purged > 0 {
        info!("History cleanup purged {purged} archived proposals");
    }
    Ok(purged)
}
