use super::prelude::*;
use crate::usecases::authorize;

/// Clone-restore: produces a fresh PENDING proposal whose payload equals the
/// archived one. The origin record is left untouched, preserving history.
pub fn restore_world_version<R>(
    repo: &R,
    actor: &User,
    origin_id: ProposalId,
) -> Result<WorldProposal>
where
    R: WorldRepo + WorldProposalRepo + UserRepo + EventLogRepo,
{
    let origin = repo.get_world_proposal(origin_id)?;
    let world = repo.get_world(&origin.world)?;
    let is_author = actor.name == origin.author;
    let has_authority =
        authorize::has_authority_over(repo, actor, &world, &origin.author, origin.status)?;
    if !is_author && !has_authority {
        return Err(Error::Forbidden);
    }

    let version_number = repo.next_world_version_number(&origin.world)?;
    let clone = repo.create_world_proposal(WorldProposal {
        id: ProposalId::default(),
        world: origin.world.clone(),
        version_number,
        proposed_name: origin.proposed_name.clone(),
        proposed_description: origin.proposed_description.clone(),
        cambios: origin.cambios.clone(),
        change_log: format!("Recuperar versión ({})", origin.version_number),
        admin_feedback: None,
        status: ProposalStatus::Pending,
        change_type: origin.change_type,
        timeline_year: origin.timeline_year,
        proposed_snapshot: origin.proposed_snapshot.clone(),
        author: actor.name.clone(),
        reviewer: None,
        created_at: TimestampMs::now(),
    })?;

    repo.log_event(EventLogEntry::new(
        Some(actor.name.clone()),
        "RESTORE_VERSION",
        Some(origin.id.to_string()),
        format!("Nueva {} basada en {}", clone.version_number, origin.version_number),
    ))?;
    log::info!(
        "Propuesta de restauración creada: nueva {} basada en {}",
        clone.version_number,
        origin.version_number
    );
    Ok(clone)
}

/// What a retouch hands back to the editor: the payload of the archived
/// proposal, pre-filled, with a pointer to the right editing surface.
#[derive(Debug, Clone, PartialEq)]
pub enum RetouchDraft {
    /// Metadata-only retouch (the Auto-Noos wheel).
    Metadata {
        world: JId,
        origin: ProposalId,
        metadata: Metadata,
    },
    /// Standard text retouch.
    Text {
        world: JId,
        origin: ProposalId,
        proposed_name: String,
        proposed_description: String,
    },
}

/// Retouch-restore: does NOT transition the archived record. Returns an
/// editable draft pre-filled from the archived payload for the author to
/// modify and re-submit.
pub fn retouch_world_version<R>(repo: &R, origin_id: ProposalId) -> Result<RetouchDraft>
where
    R: WorldRepo + WorldProposalRepo,
{
    let origin = repo.get_world_proposal(origin_id)?;
    let world = repo.get_world(&origin.world)?;

    let metadata = match &origin.cambios {
        ChangeIntent::MetadataUpdate { metadata } => Some(metadata.clone()),
        ChangeIntent::Update {
            metadata: Some(metadata),
        } if origin.proposed_name == world.name
            && origin.proposed_description == world.description =>
        {
            Some(metadata.clone())
        }
        _ => None,
    };

    Ok(match metadata {
        Some(metadata) => RetouchDraft::Metadata {
            world: origin.world,
            origin: origin_id,
            metadata,
        },
        None => RetouchDraft::Text {
            world: origin.world,
            origin: origin_id,
            proposed_name: origin.proposed_name,
            proposed_description: origin.proposed_description,
        },
    })
}
