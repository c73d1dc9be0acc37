use super::prelude::*;
use crate::usecases::authorize;

/// Moves a proposal to the archive without approving or rejecting it.
/// LIVE versions cannot be archived; they only leave through supplanting.
pub fn archive_world_version<R>(
    repo: &R,
    actor: &User,
    proposal_id: ProposalId,
) -> Result<WorldProposal>
where
    R: WorldRepo + WorldProposalRepo + UserRepo + EventLogRepo,
{
    let mut proposal = repo.get_world_proposal(proposal_id)?;
    let world = repo.get_world(&proposal.world)?;
    authorize::require_authority_over(repo, actor, &world, &proposal.author, proposal.status)?;

    if !proposal.status.can_transition(ProposalStatus::Archived) {
        return Err(Error::IllegalTransition {
            from: proposal.status,
            to: ProposalStatus::Archived,
        });
    }

    proposal.status = ProposalStatus::Archived;
    repo.update_world_proposal(&proposal)?;
    repo.log_event(EventLogEntry::new(
        Some(actor.name.clone()),
        "ARCHIVE_VERSION",
        Some(proposal.id.to_string()),
        "",
    ))?;
    Ok(proposal)
}

/// Hard delete of a proposal record. Forbidden for LIVE versions; reserved
/// for the proposal's author or an admin working the trash view.
pub fn delete_world_proposal<R>(repo: &R, actor: &User, proposal_id: ProposalId) -> Result<()>
where
    R: WorldRepo + WorldProposalRepo + UserRepo + EventLogRepo,
{
    let proposal = repo.get_world_proposal(proposal_id)?;
    if proposal.status == ProposalStatus::Live {
        return Err(Error::IllegalTransition {
            from: ProposalStatus::Live,
            to: ProposalStatus::Archived,
        });
    }
    let world = repo.get_world(&proposal.world)?;
    let is_author = actor.name == proposal.author;
    let has_authority =
        authorize::has_authority_over(repo, actor, &world, &proposal.author, proposal.status)?;
    if !is_author && !has_authority {
        return Err(Error::Forbidden);
    }
    repo.delete_world_proposal(proposal_id)?;
    repo.log_event(EventLogEntry::new(
        Some(actor.name.clone()),
        "DELETE_VERSION",
        Some(proposal_id.to_string()),
        "",
    ))?;
    Ok(())
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
    fn archive_rejected_proposal() {
        let (db, owner) = fixture();
        let proposal = db
            .create_world_proposal(
                WorldProposal::build()
                    .world("0101")
                    .status(ProposalStatus::Rejected)
                    .author("luis")
                    .finish(),
            )
            .unwrap();
        let archived = archive_world_version(&db, &owner, proposal.id).unwrap();
        assert_eq!(archived.status, ProposalStatus::Archived);
    }

    #[test]
    fn live_version_cannot_be_archived_or_deleted() {
        let (db, owner) = fixture();
        let live = db
            .create_world_proposal(
                WorldProposal::build()
                    .world("0101")
                    .status(ProposalStatus::Live)
                    .author("luis")
                    .finish(),
            )
            .unwrap();
        assert!(matches!(
            archive_world_version(&db, &owner, live.id),
            Err(Error::IllegalTransition { .. })
        ));
        assert!(matches!(
            delete_world_proposal(&db, &owner, live.id),
            Err(Error::IllegalTransition { .. })
        ));
    }
}
