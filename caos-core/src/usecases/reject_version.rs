use super::prelude::*;
use crate::usecases::authorize;

/// Rejects a pending or already-approved world proposal.
///
/// Rejections by anyone other than the proposal's author must carry a
/// reason; it is stored as `admin_feedback` and echoed to the author.
pub fn reject_world_version<R>(
    repo: &R,
    reviewer: &User,
    proposal_id: ProposalId,
    feedback: Option<String>,
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

    if !proposal.status.can_transition(ProposalStatus::Rejected) {
        return Err(Error::IllegalTransition {
            from: proposal.status,
            to: ProposalStatus::Rejected,
        });
    }

    let is_admin_rejection = reviewer.name != proposal.author;
    let feedback = feedback.filter(|f| !f.trim().is_empty());
    if is_admin_rejection && feedback.is_none() {
        return Err(Error::Validation(
            "El rechazo administrativo requiere un motivo".into(),
        ));
    }

    proposal.status = ProposalStatus::Rejected;
    proposal.reviewer = Some(reviewer.name.clone());
    proposal.admin_feedback = feedback.clone();
    repo.update_world_proposal(&proposal)?;

    let feedback_msg = feedback
        .as_deref()
        .map(|f| format!(" Motivo: {f}"))
        .unwrap_or_default();
    repo.create_notification(Notification::new(
        proposal.author.clone(),
        "❌ Propuesta Rechazada",
        format!(
            "Tu propuesta {} para '{}' ha sido rechazada.{feedback_msg}",
            proposal.version_number, world.name
        ),
        "/dashboard/",
    ))?;
    repo.log_event(EventLogEntry::new(
        Some(reviewer.name.clone()),
        "REJECT_WORLD_VERSION",
        Some(proposal.id.to_string()),
        feedback_msg,
    ))?;

    log::info!(
        "Rechazada propuesta {} para '{}'",
        proposal.version_number,
        world.name
    );
    Ok(proposal)
}
