use super::prelude::*;
use crate::usecases::authorize;

/// Parameters of a TIMELINE proposal: a historical snapshot keyed to a year.
#[derive(Debug, Clone)]
pub struct NewTimelineSnapshot {
    pub world: JId,
    pub year: i32,
    pub snapshot: TimelineSnapshot,
    pub change_log: String,
}

pub fn propose_timeline_snapshot<R>(
    repo: &R,
    author: &User,
    new: NewTimelineSnapshot,
) -> Result<WorldProposal>
where
    R: WorldRepo + WorldProposalRepo + UserRepo + EventLogRepo,
{
    let NewTimelineSnapshot {
        world: world_id,
        year,
        snapshot,
        change_log,
    } = new;

    let world = repo
        .try_get_world(&world_id)?
        .filter(|w| w.is_active)
        .ok_or(Error::NotFound)?;
    if !authorize::can_propose_on(repo, author, &world)? {
        return Err(Error::Forbidden);
    }

    if snapshot.description.trim().is_empty() {
        return Err(Error::Validation(
            "El snapshot requiere una descripción".into(),
        ));
    }

    // One open proposal per year at a time.
    let duplicate = repo.world_proposals_of(&world_id)?.into_iter().any(|p| {
        p.change_type == ChangeType::Timeline
            && p.timeline_year == Some(year)
            && p.status == ProposalStatus::Pending
    });
    if duplicate {
        return Err(Error::InvariantViolation(format!(
            "Ya existe una propuesta pendiente para el año {year}"
        )));
    }

    // The version counter is shared with the LIVE track of the same world.
    let version_number = repo.next_world_version_number(&world_id)?;
    let proposal = repo.create_world_proposal(WorldProposal {
        id: ProposalId::default(),
        world: world_id.clone(),
        version_number,
        // Live fields stay untouched by a snapshot.
        proposed_name: world.name.clone(),
        proposed_description: String::new(),
        cambios: ChangeIntent::Update { metadata: None },
        change_log,
        admin_feedback: None,
        status: ProposalStatus::Pending,
        change_type: ChangeType::Timeline,
        timeline_year: Some(year),
        proposed_snapshot: Some(snapshot),
        author: author.name.clone(),
        reviewer: None,
        created_at: TimestampMs::now(),
    })?;
    proposal.check_timeline_coupling()?;

    log::info!(
        "Propuesta TIMELINE creada para {} año {year}",
        world.name
    );
    repo.log_event(EventLogEntry::new(
        Some(author.name.clone()),
        "PROPOSE_TIMELINE_SNAPSHOT",
        Some(world_id.to_string()),
        format!("Año {year}"),
    ))?;
    Ok(proposal)
}
