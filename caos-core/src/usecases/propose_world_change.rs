use super::prelude::*;
use crate::{
    temporal::{validate_consistency, ChronoSubject},
    usecases::authorize,
};

/// Parameters of a CREATE proposal: a brand-new entity in the hierarchy.
#[derive(Debug, Clone)]
pub struct NewWorld {
    pub parent: Option<JId>,
    /// Target level when skipping intermediate levels; bridge `00` pairs are
    /// inserted automatically. Defaults to the next level down.
    pub target_level: Option<u8>,
    pub name: String,
    pub description: String,
}

/// Parameters of an UPDATE proposal against the LIVE track.
#[derive(Debug, Clone)]
pub struct NewWorldChange {
    pub world: JId,
    pub proposed_name: String,
    pub proposed_description: String,
    pub metadata: Option<Metadata>,
    pub change_log: String,
}

/// Creates the world record (DRAFT, invisible until published) together
/// with its initial CREATE proposal.
pub fn create_world<R>(repo: &R, author: &User, new_world: NewWorld) -> Result<WorldProposal>
where
    R: WorldRepo + WorldProposalRepo + UserRepo + EventLogRepo,
{
    crate::authorization::user::authorize_rank(author, Rank::Subadmin)?;
    let NewWorld {
        parent,
        target_level,
        name,
        description,
    } = new_world;

    let id = match &parent {
        Some(parent_id) => {
            let parent_world = repo
                .try_get_world(parent_id)?
                .filter(|w| w.is_active)
                .ok_or_else(|| {
                    Error::InvariantViolation(format!(
                        "El ancestro {parent_id} no existe o está en la papelera"
                    ))
                })?;
            if !authorize::can_propose_on(repo, author, &parent_world)? {
                return Err(Error::Forbidden);
            }
            let children = repo.children_of(parent_id)?;
            let segment = JId::next_child_segment(
                &children.iter().map(|c| c.id.clone()).collect::<Vec<_>>(),
            );
            match target_level {
                Some(level) if level > parent_id.level() + 1 => parent_id
                    .compose(level, &segment)
                    .map_err(|e| Error::Validation(e.to_string()))?,
                _ => parent_id
                    .child(&segment)
                    .map_err(|e| Error::Validation(e.to_string()))?,
            }
        }
        None => {
            // Roots are reserved territory.
            crate::authorization::user::authorize_rank(author, Rank::Admin)?;
            let roots: Vec<JId> = repo
                .all_active_worlds()?
                .into_iter()
                .map(|w| w.id)
                .filter(|id| id.level() == 1)
                .collect();
            JId::parse(&JId::next_child_segment(&roots))
                .map_err(|e| Error::Validation(e.to_string()))?
        }
    };

    if repo.try_get_world(&id)?.is_some() {
        return Err(Error::Repo(RepoError::AlreadyExists));
    }

    let mut world = World::new(id.clone(), name.clone(), Some(author.name.clone()));
    world.description = description.clone();
    repo.create_world(world)?;

    let version_number = repo.next_world_version_number(&id)?;
    let proposal = repo.create_world_proposal(WorldProposal {
        id: ProposalId::default(),
        world: id.clone(),
        version_number,
        proposed_name: name,
        proposed_description: description,
        cambios: ChangeIntent::Create,
        change_log: "Creación inicial".into(),
        admin_feedback: None,
        status: ProposalStatus::Pending,
        change_type: ChangeType::Live,
        timeline_year: None,
        proposed_snapshot: None,
        author: author.name.clone(),
        reviewer: None,
        created_at: TimestampMs::now(),
    })?;

    log::info!("Mundo {id} propuesto por {}", author.name);
    repo.log_event(EventLogEntry::new(
        Some(author.name.clone()),
        "CREATE_WORLD",
        Some(id.to_string()),
        "",
    ))?;
    Ok(proposal)
}

/// Creates an UPDATE proposal against a world's LIVE track.
pub fn propose_world_change<R>(
    repo: &R,
    author: &User,
    change: NewWorldChange,
) -> Result<WorldProposal>
where
    R: WorldRepo + WorldProposalRepo + UserRepo + EventLogRepo,
{
    let NewWorldChange {
        world: world_id,
        proposed_name,
        proposed_description,
        metadata,
        change_log,
    } = change;

    let world = repo
        .try_get_world(&world_id)?
        .filter(|w| w.is_active)
        .ok_or(Error::NotFound)?;
    if !authorize::can_propose_on(repo, author, &world)? {
        return Err(Error::Forbidden);
    }

    // Metadata carrying chronology must stay consistent with the parent.
    if let (Some(meta), Some(parent_id)) = (&metadata, world.id.parent()) {
        if let Some(parent) = repo.try_get_world(&parent_id)? {
            validate_consistency(
                ChronoSubject {
                    name: &proposed_name,
                    metadata: meta,
                },
                ChronoSubject::from(&parent),
            )?;
        }
    }

    let version_number = repo.next_world_version_number(&world_id)?;
    let proposal = repo.create_world_proposal(WorldProposal {
        id: ProposalId::default(),
        world: world_id.clone(),
        version_number,
        proposed_name,
        proposed_description,
        cambios: ChangeIntent::Update { metadata },
        change_log,
        admin_feedback: None,
        status: ProposalStatus::Pending,
        change_type: ChangeType::Live,
        timeline_year: None,
        proposed_snapshot: None,
        author: author.name.clone(),
        reviewer: None,
        created_at: TimestampMs::now(),
    })?;

    log::info!(
        "Propuesta LIVE {} creada para {}",
        proposal.version_number,
        world.name
    );
    repo.log_event(EventLogEntry::new(
        Some(author.name.clone()),
        "PROPOSE_WORLD_CHANGE",
        Some(world_id.to_string()),
        "",
    ))?;
    Ok(proposal)
}
