use super::prelude::*;
use crate::usecases::authorize;

/// Creates a period with its initial version already approved, mirroring
/// how the editor seeds eras: the period exists immediately but its later
/// edits go through review.
pub fn create_period<R>(
    repo: &R,
    author: &User,
    world_id: &JId,
    title: String,
    description: String,
    order: Option<u32>,
) -> Result<(TimelinePeriod, PeriodProposal)>
where
    R: WorldRepo + PeriodRepo + PeriodProposalRepo + UserRepo + EventLogRepo,
{
    let world = repo
        .try_get_world(world_id)?
        .filter(|w| w.is_active)
        .ok_or(Error::NotFound)?;
    if !authorize::can_propose_on(repo, author, &world)? {
        return Err(Error::Forbidden);
    }

    let existing = repo.periods_of_world(world_id)?;
    let base_slug = slugify(&title);
    let mut slug = base_slug.clone();
    let mut counter = 1;
    while existing.iter().any(|p| p.slug == slug) {
        slug = format!("{base_slug}-{counter}");
        counter += 1;
    }
    let order = order.unwrap_or_else(|| {
        existing.iter().map(|p| p.order).max().unwrap_or(0) + 1
    });

    let period = TimelinePeriod {
        world: world_id.clone(),
        slug: slug.clone(),
        title: title.clone(),
        description: description.clone(),
        metadata: Metadata::new(),
        order,
        is_current: false,
        is_active: true,
        created_at: TimestampMs::now(),
    };
    repo.create_period(period.clone())?;

    let version_number = repo.next_period_version_number(world_id, &slug)?;
    let proposal = repo.create_period_proposal(PeriodProposal {
        id: ProposalId::default(),
        world: world_id.clone(),
        period_slug: slug.clone(),
        version_number,
        proposed_title: title,
        proposed_description: description,
        proposed_metadata: Metadata::new(),
        action: PeriodAction::Add,
        change_log: "Creación inicial del período".into(),
        admin_feedback: None,
        status: ProposalStatus::Approved,
        author: author.name.clone(),
        reviewer: None,
        created_at: TimestampMs::now(),
    })?;
    repo.log_event(EventLogEntry::new(
        Some(author.name.clone()),
        "CREATE_PERIOD",
        Some(format!("{world_id}:{slug}")),
        "",
    ))?;
    Ok((period, proposal))
}

/// Proposes changes to an existing period (a new PENDING version).
pub fn propose_period_edit<R>(
    repo: &R,
    author: &User,
    world_id: &JId,
    slug: &str,
    title: Option<String>,
    description: Option<String>,
    metadata: Option<Metadata>,
    change_log: String,
) -> Result<PeriodProposal>
where
    R: WorldRepo + PeriodRepo + PeriodProposalRepo + UserRepo + EventLogRepo,
{
    let world = repo
        .try_get_world(world_id)?
        .filter(|w| w.is_active)
        .ok_or(Error::NotFound)?;
    if !authorize::can_propose_on(repo, author, &world)? {
        return Err(Error::Forbidden);
    }
    let period = repo.get_period(world_id, slug)?;

    let version_number = repo.next_period_version_number(world_id, slug)?;
    let proposal = repo.create_period_proposal(PeriodProposal {
        id: ProposalId::default(),
        world: world_id.clone(),
        period_slug: slug.to_owned(),
        version_number,
        proposed_title: title.unwrap_or_else(|| period.title.clone()),
        proposed_description: description.unwrap_or_else(|| period.description.clone()),
        proposed_metadata: metadata.unwrap_or_else(|| period.metadata.clone()),
        action: PeriodAction::Edit,
        change_log: if change_log.is_empty() {
            format!("Propuesta de cambios {version_number}")
        } else {
            change_log
        },
        admin_feedback: None,
        status: ProposalStatus::Pending,
        author: author.name.clone(),
        reviewer: None,
        created_at: TimestampMs::now(),
    })?;
    Ok(proposal)
}

/// Proposes deleting a period. The ACTUAL (current) period is protected.
pub fn propose_period_delete<R>(
    repo: &R,
    author: &User,
    world_id: &JId,
    slug: &str,
    reason: String,
) -> Result<PeriodProposal>
where
    R: WorldRepo + PeriodRepo + PeriodProposalRepo + UserRepo + EventLogRepo,
{
    let world = repo
        .try_get_world(world_id)?
        .filter(|w| w.is_active)
        .ok_or(Error::NotFound)?;
    if !authorize::can_propose_on(repo, author, &world)? {
        return Err(Error::Forbidden);
    }
    let period = repo.get_period(world_id, slug)?;
    if period.is_current {
        return Err(Error::InvariantViolation(
            "No se puede proponer eliminar el período ACTUAL".into(),
        ));
    }

    let version_number = repo.next_period_version_number(world_id, slug)?;
    let proposal = repo.create_period_proposal(PeriodProposal {
        id: ProposalId::default(),
        world: world_id.clone(),
        period_slug: slug.to_owned(),
        version_number,
        proposed_title: period.title.clone(),
        proposed_description: period.description.clone(),
        proposed_metadata: period.metadata.clone(),
        action: PeriodAction::Delete,
        change_log: reason,
        admin_feedback: None,
        status: ProposalStatus::Pending,
        author: author.name.clone(),
        reviewer: None,
        created_at: TimestampMs::now(),
    })?;
    Ok(proposal)
}

pub fn approve_period_version<R>(
    repo: &R,
    reviewer: &User,
    proposal_id: ProposalId,
) -> Result<PeriodProposal>
where
    R: WorldRepo + PeriodRepo + PeriodProposalRepo + UserRepo + NotificationRepo + EventLogRepo,
{
    let mut proposal = repo.get_period_proposal(proposal_id)?;
    let world = repo.get_world(&proposal.world)?;
    authorize::require_authority_over(repo, reviewer, &world, &proposal.author, proposal.status)?;
    if !proposal.status.can_transition(ProposalStatus::Approved) {
        return Err(Error::IllegalTransition {
            from: proposal.status,
            to: ProposalStatus::Approved,
        });
    }
    proposal.status = ProposalStatus::Approved;
    proposal.reviewer = Some(reviewer.name.clone());
    repo.update_period_proposal(&proposal)?;
    repo.log_event(EventLogEntry::new(
        Some(reviewer.name.clone()),
        "APPROVE_PERIOD_VERSION",
        Some(proposal.id.to_string()),
        "",
    ))?;
    Ok(proposal)
}

pub fn reject_period_version<R>(
    repo: &R,
    reviewer: &User,
    proposal_id: ProposalId,
    feedback: Option<String>,
) -> Result<PeriodProposal>
where
    R: WorldRepo + PeriodRepo + PeriodProposalRepo + UserRepo + NotificationRepo + EventLogRepo,
{
    let mut proposal = repo.get_period_proposal(proposal_id)?;
    let world = repo.get_world(&proposal.world)?;
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
    proposal.admin_feedback = feedback;
    repo.update_period_proposal(&proposal)?;
    repo.log_event(EventLogEntry::new(
        Some(reviewer.name.clone()),
        "REJECT_PERIOD_VERSION",
        Some(proposal.id.to_string()),
        "",
    ))?;
    Ok(proposal)
}

/// Publishes an approved period version onto the period record.
pub fn publish_period_version<R>(
    repo: &R,
    actor: &User,
    proposal_id: ProposalId,
) -> Result<PeriodProposal>
where
    R: WorldRepo + PeriodRepo + PeriodProposalRepo + UserRepo + NotificationRepo + EventLogRepo,
{
    let mut proposal = repo.get_period_proposal(proposal_id)?;
    let world = repo.get_world(&proposal.world)?;
    authorize::require_authority_over(repo, actor, &world, &proposal.author, proposal.status)?;
    if !proposal.status.can_transition(ProposalStatus::Live) {
        return Err(Error::IllegalTransition {
            from: proposal.status,
            to: ProposalStatus::Live,
        });
    }
    let mut period = repo.get_period(&proposal.world, &proposal.period_slug)?;

    if proposal.action == PeriodAction::Delete {
        period.soft_delete();
        repo.update_period(&period)?;
        proposal.status = ProposalStatus::Archived;
        proposal.reviewer = Some(actor.name.clone());
        repo.update_period_proposal(&proposal)?;
        repo.log_event(EventLogEntry::new(
            Some(actor.name.clone()),
            "PUBLISH_PERIOD_DELETE",
            Some(format!("{}:{}", proposal.world, proposal.period_slug)),
            "",
        ))?;
        return Ok(proposal);
    }

    period.title = proposal.proposed_title.clone();
    period.description = proposal.proposed_description.clone();
    period.metadata = proposal.proposed_metadata.clone();
    repo.update_period(&period)?;

    for mut other in repo.period_proposals_of(&proposal.world, &proposal.period_slug)? {
        if other.id == proposal.id {
            continue;
        }
        if other.status == ProposalStatus::Live {
            other.status = ProposalStatus::History;
            repo.update_period_proposal(&other)?;
        } else if other.status.is_open() && other.version_number < proposal.version_number {
            other.status = ProposalStatus::Archived;
            repo.update_period_proposal(&other)?;
        }
    }

    proposal.status = ProposalStatus::Live;
    proposal.reviewer = Some(actor.name.clone());
    repo.update_period_proposal(&proposal)?;
    repo.create_notification(Notification::new(
        proposal.author.clone(),
        "🚀 ¡Período Publicado!",
        format!("Tu propuesta para el período '{}' ya está en vivo.", period.title),
        "/dashboard/?type=PERIOD",
    ))?;
    repo.log_event(EventLogEntry::new(
        Some(actor.name.clone()),
        "PUBLISH_PERIOD_LIVE",
        Some(proposal.id.to_string()),
        "",
    ))?;
    Ok(proposal)
}

#[cfg(test)]
mod tests {
    use super::super::tests::MockDb;
    use super::*;
    use caos_entities::builders::*;

    fn fixture() -> (MockDb, User) {
        let db = MockDb::default();
        let owner = User::new("ana", Rank::Admin);
        db.users.borrow_mut().push(owner.clone());
        db.worlds
            .borrow_mut()
            .push(World::build().id("0101").author("ana").finish());
        (db, owner)
    }

    #[test]
    fn slugs_deduplicate_per_world() {
        let (db, owner) = fixture();
        let world: JId = "0101".parse().unwrap();
        let (p1, _) =
            create_period(&db, &owner, &world, "Inicios".into(), String::new(), None).unwrap();
        let (p2, _) =
            create_period(&db, &owner, &world, "Inicios".into(), String::new(), None).unwrap();
        assert_eq!(p1.slug, "inicios");
        assert_eq!(p2.slug, "inicios-1");
        assert_eq!(p2.order, p1.order + 1);
    }

    #[test]
    fn current_period_cannot_be_deleted() {
        let (db, owner) = fixture();
        let world: JId = "0101".parse().unwrap();
        let (mut period, _) =
            create_period(&db, &owner, &world, "Actual".into(), String::new(), None).unwrap();
        period.is_current = true;
        db.update_period(&period).unwrap();

        let err = propose_period_delete(&db, &owner, &world, "actual", String::new())
            .unwrap_err();
        assert!(matches!(err, Error::InvariantViolation(_)));
    }

    #[test]
    fn edit_publish_applies_to_period() {
        let (db, owner) = fixture();
        let world: JId = "0101".parse().unwrap();
        let (period, _) =
            create_period(&db, &owner, &world, "Inicios".into(), "v1".into(), None).unwrap();
        let edit = propose_period_edit(
            &db,
            &owner,
            &world,
            &period.slug,
            Some("Título Publicado".into()),
            None,
            None,
            String::new(),
        )
        .unwrap();
        approve_period_version(&db, &owner, edit.id).unwrap();
        publish_period_version(&db, &owner, edit.id).unwrap();
        assert_eq!(
            db.get_period(&world, &period.slug).unwrap().title,
            "Título Publicado"
        );
    }
}
