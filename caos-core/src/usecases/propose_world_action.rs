use super::prelude::*;
use crate::{schema, usecases::authorize};

fn propose_intent<R>(
    repo: &R,
    author: &User,
    world: &World,
    cambios: ChangeIntent,
    change_log: String,
    event_action: &str,
) -> Result<WorldProposal>
where
    R: WorldRepo + WorldProposalRepo + UserRepo + EventLogRepo,
{
    let change_type = match &cambios {
        ChangeIntent::MetadataUpdate { .. } => ChangeType::Metadata,
        _ => ChangeType::Live,
    };
    let version_number = repo.next_world_version_number(&world.id)?;
    let proposal = repo.create_world_proposal(WorldProposal {
        id: ProposalId::default(),
        world: world.id.clone(),
        version_number,
        proposed_name: world.name.clone(),
        proposed_description: world.description.clone(),
        cambios,
        change_log,
        admin_feedback: None,
        status: ProposalStatus::Pending,
        change_type,
        timeline_year: None,
        proposed_snapshot: None,
        author: author.name.clone(),
        reviewer: None,
        created_at: TimestampMs::now(),
    })?;
    repo.log_event(EventLogEntry::new(
        Some(author.name.clone()),
        event_action,
        Some(world.id.to_string()),
        "",
    ))?;
    Ok(proposal)
}

fn resolve_target<R>(repo: &R, author: &User, world_id: &JId) -> Result<World>
where
    R: WorldRepo + UserRepo,
{
    let world = repo
        .try_get_world(world_id)?
        .filter(|w| w.is_active)
        .ok_or(Error::NotFound)?;
    if !authorize::can_propose_on(repo, author, &world)? {
        return Err(Error::Forbidden);
    }
    Ok(world)
}

/// Deleting is itself a proposal; the entity only moves to the trash when
/// the proposal is published.
pub fn propose_world_delete<R>(
    repo: &R,
    author: &User,
    world_id: &JId,
    reason: String,
) -> Result<WorldProposal>
where
    R: WorldRepo + WorldProposalRepo + UserRepo + EventLogRepo,
{
    let world = resolve_target(repo, author, world_id)?;
    propose_intent(
        repo,
        author,
        &world,
        ChangeIntent::Delete,
        reason,
        "PROPOSE_WORLD_DELETE",
    )
}

/// Brings a trashed world back through the regular pipeline.
pub fn propose_world_restore<R>(
    repo: &R,
    author: &User,
    world_id: &JId,
    reason: String,
) -> Result<WorldProposal>
where
    R: WorldRepo + WorldProposalRepo + UserRepo + EventLogRepo,
{
    let world = repo.try_get_world(world_id)?.ok_or(Error::NotFound)?;
    if world.is_active {
        return Err(Error::InvariantViolation(
            "La entidad no está en la papelera".into(),
        ));
    }
    if !authorize::can_propose_on(repo, author, &world)? {
        return Err(Error::Forbidden);
    }
    propose_intent(
        repo,
        author,
        &world,
        ChangeIntent::Restore,
        reason,
        "PROPOSE_WORLD_RESTORE",
    )
}

pub fn propose_set_cover<R>(
    repo: &R,
    author: &User,
    world_id: &JId,
    cover_image: String,
) -> Result<WorldProposal>
where
    R: WorldRepo + WorldProposalRepo + UserRepo + EventLogRepo,
{
    let world = resolve_target(repo, author, world_id)?;
    propose_intent(
        repo,
        author,
        &world,
        ChangeIntent::SetCover { cover_image },
        String::new(),
        "PROPOSE_SET_COVER",
    )
}

pub fn propose_visibility<R>(
    repo: &R,
    author: &User,
    world_id: &JId,
    target_visibility: bool,
) -> Result<WorldProposal>
where
    R: WorldRepo + WorldProposalRepo + UserRepo + EventLogRepo,
{
    let world = resolve_target(repo, author, world_id)?;
    propose_intent(
        repo,
        author,
        &world,
        ChangeIntent::ToggleVisibility { target_visibility },
        String::new(),
        "PROPOSE_VISIBILITY",
    )
}

/// Metadata-only change (the Auto-Noos wheel): name and description stay
/// untouched when this publishes.
pub fn propose_metadata_update<R>(
    repo: &R,
    author: &User,
    world_id: &JId,
    metadata: Metadata,
    change_log: String,
) -> Result<WorldProposal>
where
    R: WorldRepo + WorldProposalRepo + UserRepo + EventLogRepo,
{
    let world = resolve_target(repo, author, world_id)?;
    if let Err(missing) = schema::validate_against_schema(&world.id, &metadata) {
        return Err(Error::Validation(format!(
            "Faltan claves del esquema: {}",
            missing.join(", ")
        )));
    }
    propose_intent(
        repo,
        author,
        &world,
        ChangeIntent::MetadataUpdate { metadata },
        change_log,
        "PROPOSE_METADATA_UPDATE",
    )
}

/// Hard delete of a world record. Only admins, and only from the trash;
/// live entities always travel through a DELETE proposal first.
pub fn hard_delete_world<R>(repo: &R, actor: &User, world_id: &JId) -> Result<()>
where
    R: WorldRepo + UserRepo + EventLogRepo,
{
    crate::authorization::user::authorize_rank(actor, Rank::Admin)?;
    let world = repo.try_get_world(world_id)?.ok_or(Error::NotFound)?;
    if world.is_active {
        return Err(Error::InvariantViolation(
            "Solo se pueden eliminar definitivamente entidades en la papelera".into(),
        ));
    }
    repo.delete_world(world_id)?;
    repo.log_event(EventLogEntry::new(
        Some(actor.name.clone()),
        "HARD_DELETE_WORLD",
        Some(world_id.to_string()),
        "",
    ))?;
    Ok(())
}
