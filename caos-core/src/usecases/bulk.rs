use super::prelude::*;

/// Result of a batch operation. A failing item never aborts the batch;
/// every sub-operation is its own atomic unit and failures are reported
/// per item.
#[derive(Debug, Default)]
pub struct BulkOutcome {
    pub succeeded: Vec<ProposalId>,
    pub failed: Vec<(ProposalId, Error)>,
}

impl BulkOutcome {
    pub fn is_complete_success(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Applies `op` to every id, accumulating per-item outcomes.
pub fn bulk_apply<F>(ids: &[ProposalId], mut op: F) -> BulkOutcome
where
    F: FnMut(ProposalId) -> Result<()>,
{
    let mut outcome = BulkOutcome::default();
    for &id in ids {
        match op(id) {
            Ok(()) => outcome.succeeded.push(id),
            Err(err) => {
                log::warn!("Operación en lote falló para {id}: {err}");
                outcome.failed.push((id, err));
            }
        }
    }
    outcome
}

/// Bulk approval of world proposals.
pub fn bulk_approve_world_versions<R>(
    repo: &R,
    reviewer: &User,
    ids: &[ProposalId],
) -> BulkOutcome
where
    R: WorldRepo + WorldProposalRepo + UserRepo + NotificationRepo + EventLogRepo,
{
    bulk_apply(ids, |id| {
        super::approve_world_version(repo, reviewer, id).map(|_| ())
    })
}

/// Bulk rejection; the shared feedback is applied to every item.
pub fn bulk_reject_world_versions<R>(
    repo: &R,
    reviewer: &User,
    ids: &[ProposalId],
    feedback: Option<String>,
) -> BulkOutcome
where
    R: WorldRepo + WorldProposalRepo + UserRepo + NotificationRepo + EventLogRepo,
{
    bulk_apply(ids, |id| {
        super::reject_world_version(repo, reviewer, id, feedback.clone()).map(|_| ())
    })
}

/// Bulk archive of world proposals.
pub fn bulk_archive_world_versions<R>(repo: &R, actor: &User, ids: &[ProposalId]) -> BulkOutcome
where
    R: WorldRepo + WorldProposalRepo + UserRepo + EventLogRepo,
{
    bulk_apply(ids, |id| {
        super::archive_world_version(repo, actor, id).map(|_| ())
    })
}
