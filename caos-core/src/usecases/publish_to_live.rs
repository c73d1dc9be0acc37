use super::prelude::*;
use crate::usecases::authorize;

#[derive(Debug, Clone)]
pub struct PublishOutcome {
    pub world: World,
    pub proposal: WorldProposal,
}

/// Publishes an approved proposal to the LIVE environment.
///
/// One atomic unit (the caller wraps it in a transaction): applies the
/// payload to the live record, promotes the proposal, demotes the previous
/// LIVE version of the same track to HISTORY, archives obsolete open
/// proposals, notifies the author and appends to the event log.
pub fn publish_world_version<R>(
    repo: &R,
    actor: &User,
    proposal_id: ProposalId,
) -> Result<PublishOutcome>
where
    R: WorldRepo + WorldProposalRepo + UserRepo + NotificationRepo + EventLogRepo,
{
    let mut proposal = repo.get_world_proposal(proposal_id)?;
    let mut world = repo.get_world(&proposal.world)?;
    authorize::require_authority_over(repo, actor, &world, &proposal.author, proposal.status)?;

    if !proposal.status.can_transition(ProposalStatus::Live) {
        return Err(Error::IllegalTransition {
            from: proposal.status,
            to: ProposalStatus::Live,
        });
    }
    proposal.check_timeline_coupling()?;

    // DELETE executes the trashing instead of going live.
    if matches!(proposal.cambios, ChangeIntent::Delete) {
        world.soft_delete();
        repo.update_world(&world)?;
        proposal.status = ProposalStatus::Archived;
        proposal.reviewer = Some(actor.name.clone());
        repo.update_world_proposal(&proposal)?;
        repo.create_notification(Notification::new(
            proposal.author.clone(),
            "🗑️ Mundo Eliminado",
            format!("La propuesta de borrado de '{}' ha sido ejecutada.", world.name),
            "/dashboard/",
        ))?;
        repo.log_event(EventLogEntry::new(
            Some(actor.name.clone()),
            "PUBLISH_DELETE",
            Some(world.id.to_string()),
            "",
        ))?;
        log::info!("Mundo '{}' movido a la papelera", world.name);
        return Ok(PublishOutcome { world, proposal });
    }

    // Apply the payload to the live record.
    match (&proposal.cambios, proposal.change_type) {
        (_, ChangeType::Timeline) => {
            let year = proposal
                .timeline_year
                .ok_or_else(|| Error::InvariantViolation("Snapshot sin año".into()))?;
            let snapshot = proposal
                .proposed_snapshot
                .clone()
                .ok_or_else(|| Error::InvariantViolation("Snapshot vacío".into()))?;
            // Snapshots never touch the live name or description.
            world.metadata.put_timeline_snapshot(year, &snapshot);
        }
        (ChangeIntent::SetCover { cover_image }, _) => {
            world.metadata.set_cover_image(cover_image.clone());
        }
        (ChangeIntent::ToggleVisibility { target_visibility }, _) => {
            world.visible_publico = *target_visibility;
        }
        (ChangeIntent::Restore, _) => {
            world.restore();
        }
        (ChangeIntent::MetadataUpdate { metadata }, _) => {
            world.metadata.apply_update(metadata);
        }
        (ChangeIntent::Create | ChangeIntent::Update { .. }, _) => {
            world.name = proposal.proposed_name.clone();
            world.description = proposal.proposed_description.clone();
            if let ChangeIntent::Update {
                metadata: Some(metadata),
            } = &proposal.cambios
            {
                world.metadata.apply_update(metadata);
            }
            world.status = WorldStatus::Live;
        }
        // DELETE is fully handled by the early return above and never reaches here.
        (ChangeIntent::Delete, _) => unreachable!(),
    }
    if proposal.change_type != ChangeType::Timeline {
        world.current_version_number = proposal.version_number;
        world.current_author_name = Some(proposal.author.to_string());
    }
    repo.update_world(&world)?;

    // Supplant the previous LIVE of the same track and archive obsolete
    // open proposals. Snapshot tracks are keyed per year so the dual-track
    // streams never interfere.
    let same_track = |other: &WorldProposal| match proposal.change_type {
        ChangeType::Timeline => {
            other.change_type == ChangeType::Timeline
                && other.timeline_year == proposal.timeline_year
        }
        _ => other.change_type != ChangeType::Timeline,
    };
    for mut other in repo.world_proposals_of(&proposal.world)? {
        if other.id == proposal.id || !same_track(&other) {
            continue;
        }
        if other.status == ProposalStatus::Live {
            other.status = ProposalStatus::History;
            repo.update_world_proposal(&other)?;
            log::info!("Versión {} archivada como historial", other.version_number);
        } else if other.status.is_open() && other.version_number < proposal.version_number {
            other.status = ProposalStatus::Archived;
            repo.update_world_proposal(&other)?;
        }
    }

    proposal.status = ProposalStatus::Live;
    proposal.reviewer = Some(actor.name.clone());
    repo.update_world_proposal(&proposal)?;

    repo.create_notification(Notification::new(
        proposal.author.clone(),
        "🚀 ¡Mundo Publicado!",
        format!("Tu propuesta para '{}' ya está en vivo.", world.name),
        format!("/mundo/{}/", world.public_id),
    ))?;
    repo.log_event(EventLogEntry::new(
        Some(actor.name.clone()),
        "PUBLISH_LIVE",
        Some(proposal.id.to_string()),
        format!("{}", proposal.version_number),
    ))?;

    log::info!(
        "Publicada {}. Mundo '{}' ahora está LIVE.",
        proposal.version_number,
        world.name
    );
    Ok(PublishOutcome { world, proposal })
}
