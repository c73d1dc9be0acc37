use super::prelude::*;
use crate::usecases::authorize;

/// Parameters of a narrative proposal (ADD or EDIT).
#[derive(Debug, Clone)]
pub struct NewNarrativeChange {
    pub narrative: NId,
    pub proposed_title: String,
    pub proposed_content: String,
    pub action: NarrativeAction,
    pub change_log: String,
}

fn owning_world<R: WorldRepo>(repo: &R, nid: &NId) -> Result<World> {
    repo.try_get_world(&nid.world_jid())?.ok_or(Error::NotFound)
}

/// Creates a narrative together with its initial ADD proposal.
pub fn create_narrative<R>(
    repo: &R,
    author: &User,
    world_id: &JId,
    kind: NarrativeKind,
    titulo: String,
    contenido: String,
    timeline_period: Option<String>,
) -> Result<(Narrative, NarrativeProposal)>
where
    R: WorldRepo + NarrativeRepo + NarrativeProposalRepo + UserRepo + EventLogRepo,
{
    let world = repo
        .try_get_world(world_id)?
        .filter(|w| w.is_active)
        .ok_or(Error::NotFound)?;
    if !authorize::can_propose_on(repo, author, &world)? {
        return Err(Error::Forbidden);
    }

    let number = repo
        .narratives_of_world(world_id)?
        .iter()
        .filter(|n| n.tipo == kind)
        .count() as u8
        + 1;
    let nid = NId::compose(world_id, kind, number, None)
        .map_err(|e| Error::Validation(e.to_string()))?;

    let narrative = Narrative {
        nid: nid.clone(),
        public_id: PublicId::new(),
        world: world_id.clone(),
        titulo: titulo.clone(),
        contenido: String::new(),
        tipo: kind,
        timeline_period,
        created_by: Some(author.name.clone()),
        is_active: true,
        created_at: TimestampMs::now(),
    };
    repo.create_narrative(narrative.clone())?;

    let version_number = repo.next_narrative_version_number(&nid)?;
    let proposal = repo.create_narrative_proposal(NarrativeProposal {
        id: ProposalId::default(),
        narrative: nid.clone(),
        version_number,
        proposed_title: titulo,
        proposed_content: contenido,
        action: NarrativeAction::Add,
        change_log: "Creación inicial".into(),
        admin_feedback: None,
        status: ProposalStatus::Pending,
        author: author.name.clone(),
        reviewer: None,
        created_at: TimestampMs::now(),
    })?;

    repo.log_event(EventLogEntry::new(
        Some(author.name.clone()),
        "CREATE_NARRATIVE",
        Some(nid.to_string()),
        "",
    ))?;
    Ok((narrative, proposal))
}

pub fn propose_narrative_change<R>(
    repo: &R,
    author: &User,
    change: NewNarrativeChange,
) -> Result<NarrativeProposal>
where
    R: WorldRepo + NarrativeRepo + NarrativeProposalRepo + UserRepo + EventLogRepo,
{
    let NewNarrativeChange {
        narrative: nid,
        proposed_title,
        proposed_content,
        action,
        change_log,
    } = change;

    let narrative = repo.get_narrative(&nid)?;
    if !narrative.is_active && action != NarrativeAction::Restore {
        return Err(Error::NotFound);
    }
    let world = owning_world(repo, &nid)?;
    if !authorize::can_propose_on(repo, author, &world)? {
        return Err(Error::Forbidden);
    }

    let version_number = repo.next_narrative_version_number(&nid)?;
    let proposal = repo.create_narrative_proposal(NarrativeProposal {
        id: ProposalId::default(),
        narrative: nid.clone(),
        version_number,
        proposed_title,
        proposed_content,
        action,
        change_log,
        admin_feedback: None,
        status: ProposalStatus::Pending,
        author: author.name.clone(),
        reviewer: None,
        created_at: TimestampMs::now(),
    })?;
    repo.log_event(EventLogEntry::new(
        Some(author.name.clone()),
        "PROPOSE_NARRATIVE_CHANGE",
        Some(nid.to_string()),
        action.to_string(),
    ))?;
    Ok(proposal)
}

pub fn approve_narrative_version<R>(
    repo: &R,
    reviewer: &User,
    proposal_id: ProposalId,
) -> Result<NarrativeProposal>
where
    R: WorldRepo + NarrativeRepo + NarrativeProposalRepo + UserRepo + NotificationRepo + EventLogRepo,
{
    let mut proposal = repo.get_narrative_proposal(proposal_id)?;
    let world = owning_world(repo, &proposal.narrative)?;
    authorize::require_authority_over(repo, reviewer, &world, &proposal.author, proposal.status)?;
    if !proposal.status.can_transition(ProposalStatus::Approved) {
        return Err(Error::IllegalTransition {
            from: proposal.status,
            to: ProposalStatus::Approved,
        });
    }
    proposal.status = ProposalStatus::Approved;
    proposal.reviewer = Some(reviewer.name.clone());
    repo.update_narrative_proposal(&proposal)?;
    repo.create_notification(Notification::new(
        proposal.author.clone(),
        "✅ Propuesta Aprobada",
        format!(
            "Tu propuesta de narrativa '{}' ha sido aprobada.",
            proposal.proposed_title
        ),
        "/dashboard/?type=NARRATIVE",
    ))?;
    repo.log_event(EventLogEntry::new(
        Some(reviewer.name.clone()),
        "APPROVE_NARRATIVE_VERSION",
        Some(proposal.id.to_string()),
        "",
    ))?;
    Ok(proposal)
}

pub fn reject_narrative_version<R>(
    repo: &R,
    reviewer: &User,
    proposal_id: ProposalId,
    feedback: Option<String>,
) -> Result<NarrativeProposal>
where
    R: WorldRepo + NarrativeRepo + NarrativeProposalRepo + UserRepo + NotificationRepo + EventLogRepo,
{
    let mut proposal = repo.get_narrative_proposal(proposal_id)?;
    let world = owning_world(repo, &proposal.narrative)?;
    authorize::require_authority_over(repo, reviewer, &world, &proposal.author, proposal.status)?;
    if !proposal.status.can_transition(ProposalStatus::Rejected) {
        return Err(Error::IllegalTransition {
            from: proposal.status,
            to: ProposalStatus::Rejected,
        });
    }
    let feedback = feedback.filter(|f| !f.trim().is_empty());
    if reviewer.name != proposal.author && feedback.is_none() {
        return Err(Error::Validation(
            "El rechazo administrativo requiere un motivo".into(),
        ));
    }
    proposal.status = ProposalStatus::Rejected;
    proposal.reviewer = Some(reviewer.name.clone());
    proposal.admin_feedback = feedback.clone();
    repo.update_narrative_proposal(&proposal)?;
    let feedback_msg = feedback
        .as_deref()
        .map(|f| format!(" Motivo: {f}"))
        .unwrap_or_default();
    repo.create_notification(Notification::new(
        proposal.author.clone(),
        "❌ Propuesta Rechazada",
        format!(
            "Tu propuesta de narrativa '{}' ha sido rechazada.{feedback_msg}",
            proposal.proposed_title
        ),
        "/dashboard/?type=NARRATIVE",
    ))?;
    repo.log_event(EventLogEntry::new(
        Some(reviewer.name.clone()),
        "REJECT_NARRATIVE_VERSION",
        Some(proposal.id.to_string()),
        feedback_msg,
    ))?;
    Ok(proposal)
}

/// Publishes an approved narrative proposal: applies title/content (or the
/// delete/restore action) and supplants the previous LIVE version.
pub fn publish_narrative_version<R>(
    repo: &R,
    actor: &User,
    proposal_id: ProposalId,
) -> Result<NarrativeProposal>
where
    R: WorldRepo + NarrativeRepo + NarrativeProposalRepo + UserRepo + NotificationRepo + EventLogRepo,
{
    let mut proposal = repo.get_narrative_proposal(proposal_id)?;
    let mut narrative = repo.get_narrative(&proposal.narrative)?;
    let world = owning_world(repo, &proposal.narrative)?;
    authorize::require_authority_over(repo, actor, &world, &proposal.author, proposal.status)?;
    if !proposal.status.can_transition(ProposalStatus::Live) {
        return Err(Error::IllegalTransition {
            from: proposal.status,
            to: ProposalStatus::Live,
        });
    }

    if proposal.action == NarrativeAction::Delete {
        narrative.soft_delete();
        repo.update_narrative(&narrative)?;
        proposal.status = ProposalStatus::Archived;
        proposal.reviewer = Some(actor.name.clone());
        repo.update_narrative_proposal(&proposal)?;
        repo.log_event(EventLogEntry::new(
            Some(actor.name.clone()),
            "PUBLISH_NARRATIVE_DELETE",
            Some(narrative.nid.to_string()),
            "",
        ))?;
        return Ok(proposal);
    }

    if proposal.action == NarrativeAction::Restore {
        narrative.restore();
    }
    narrative.titulo = proposal.proposed_title.clone();
    narrative.contenido = proposal.proposed_content.clone();
    repo.update_narrative(&narrative)?;

    for mut other in repo.narrative_proposals_of(&proposal.narrative)? {
        if other.id == proposal.id {
            continue;
        }
        if other.status == ProposalStatus::Live {
            other.status = ProposalStatus::History;
            repo.update_narrative_proposal(&other)?;
        } else if other.status.is_open() && other.version_number < proposal.version_number {
            other.status = ProposalStatus::Archived;
            repo.update_narrative_proposal(&other)?;
        }
    }

    proposal.status = ProposalStatus::Live;
    proposal.reviewer = Some(actor.name.clone());
    repo.update_narrative_proposal(&proposal)?;

    repo.create_notification(Notification::new(
        proposal.author.clone(),
        "🚀 ¡Lore Publicado!",
        format!("Tu narrativa '{}' ya está en vivo.", narrative.titulo),
        format!("/narrativa/{}/", narrative.public_id),
    ))?;
    repo.log_event(EventLogEntry::new(
        Some(actor.name.clone()),
        "PUBLISH_NARRATIVE_LIVE",
        Some(proposal.id.to_string()),
        "",
    ))?;
    log::info!(
        "Lore publicado: {} de '{}'",
        proposal.version_number,
        narrative.titulo
    );
    Ok(proposal)
}

/// Clone-restore for narrative proposals.
pub fn restore_narrative_version<R>(
    repo: &R,
    actor: &User,
    origin_id: ProposalId,
) -> Result<NarrativeProposal>
where
    R: WorldRepo + NarrativeRepo + NarrativeProposalRepo + UserRepo + EventLogRepo,
{
    let origin = repo.get_narrative_proposal(origin_id)?;
    let world = owning_world(repo, &origin.narrative)?;
    let has_authority =
        authorize::has_authority_over(repo, actor, &world, &origin.author, origin.status)?;
    if actor.name != origin.author && !has_authority {
        return Err(Error::Forbidden);
    }
    let version_number = repo.next_narrative_version_number(&origin.narrative)?;
    let clone = repo.create_narrative_proposal(NarrativeProposal {
        id: ProposalId::default(),
        narrative: origin.narrative.clone(),
        version_number,
        proposed_title: origin.proposed_title.clone(),
        proposed_content: origin.proposed_content.clone(),
        action: origin.action,
        change_log: format!("Recuperar versión ({})", origin.version_number),
        admin_feedback: None,
        status: ProposalStatus::Pending,
        author: actor.name.clone(),
        reviewer: None,
        created_at: TimestampMs::now(),
    })?;
    repo.log_event(EventLogEntry::new(
        Some(actor.name.clone()),
        "RESTORE_NARRATIVE_VERSION",
        Some(origin.id.to_string()),
        "",
    ))?;
    Ok(clone)
}
