use super::prelude::*;
use crate::usecases::authorize;

/// Approves a pending world proposal. Approval is an intermediate step: the
/// LIVE record stays untouched until a formal publish.
pub fn approve_world_version<R>(
    repo: &R,
    reviewer: &User,
    proposal_id: ProposalId,
) -> Result<WorldProposal>
where
    R: WorldRepo + WorldProposalRepo + UserRepo + NotificationRepo + EventLogRepo,
{
    let mut proposal = repo.get_world_proposal(proposal_id)?;
    let world = repo.get_world(&proposal.world)?;
    authorize::require_authority_over(
        repo,
        reviewer,
        &world,
        &proposal.author,
        proposal.status,
    )?;

    if !proposal.status.can_transition(ProposalStatus::Approved) {
        return Err(Error::IllegalTransition {
            from: proposal.status,
            to: ProposalStatus::Approved,
        });
    }

    proposal.status = ProposalStatus::Approved;
    proposal.reviewer = Some(reviewer.name.clone());
    repo.update_world_proposal(&proposal)?;

    repo.create_notification(Notification::new(
        proposal.author.clone(),
        "✅ Propuesta Aprobada",
        format!(
            "Tu propuesta {} para '{}' ha sido aprobada. Pendiente de paso a producción.",
            proposal.version_number, world.name
        ),
        "/dashboard/",
    ))?;
    repo.log_event(EventLogEntry::new(
        Some(reviewer.name.clone()),
        "APPROVE_WORLD_VERSION",
        Some(proposal.id.to_string()),
        "",
    ))?;

    log::info!(
        "Propuesta {} APROBADA para '{}'",
        proposal.version_number,
        world.name
    );
    Ok(proposal)
}
