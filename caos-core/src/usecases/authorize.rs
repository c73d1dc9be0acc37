use super::prelude::*;
use crate::authorization::user::authorize_rank;

/// Access a user holds over a world, from none to global authority.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum AccessLevel {
    None,
    Viewer,
    Contributor,
    Owner,
    Superuser,
}

/// Computes the per-user access level over a world.
pub fn access_level<R: UserRepo>(repo: &R, user: &User, world: &World) -> Result<AccessLevel> {
    if user.is_global_admin() {
        return Ok(AccessLevel::Superuser);
    }
    if world.author.as_ref() == Some(&user.name) {
        return Ok(AccessLevel::Owner);
    }
    // Minions of the world's owner contribute directly.
    if let Some(owner) = &world.author {
        if user.bosses.contains(owner) {
            return Ok(AccessLevel::Contributor);
        }
        // Admins may act on system/superuser territory to propose.
        let owner_user = repo.try_get_user(owner)?;
        let owner_is_system = owner_user.map(|o| o.is_global_admin()).unwrap_or(true);
        if owner_is_system && user.rank >= Rank::Admin {
            return Ok(AccessLevel::Contributor);
        }
    } else if user.rank >= Rank::Admin {
        // Orphaned/system worlds are open to admins.
        return Ok(AccessLevel::Contributor);
    }
    if world.allow_proposals && user.rank >= Rank::Subadmin {
        return Ok(AccessLevel::Contributor);
    }
    if world.is_publicly_visible() {
        return Ok(AccessLevel::Viewer);
    }
    Ok(AccessLevel::None)
}

/// Whether the user may submit proposals against the world.
pub fn can_propose_on<R: UserRepo>(repo: &R, user: &User, world: &World) -> Result<bool> {
    authorize_rank(user, Rank::Subadmin)?;
    Ok(access_level(repo, user, world)? >= AccessLevel::Contributor)
}

/// Strict read permission for a single world.
pub fn can_view_world<R: UserRepo>(repo: &R, user: &User, world: &World) -> Result<bool> {
    if world.is_publicly_visible() {
        return Ok(true);
    }
    Ok(access_level(repo, user, world)? > AccessLevel::Viewer)
}

/// Authority over a proposal: the world's owner or a superuser always has
/// it; the author keeps it only while the proposal is still PENDING.
pub fn has_authority_over<R: UserRepo>(
    repo: &R,
    user: &User,
    world: &World,
    proposal_author: &UserName,
    proposal_status: ProposalStatus,
) -> Result<bool> {
    let level = access_level(repo, user, world)?;
    if level >= AccessLevel::Owner {
        return Ok(true);
    }
    Ok(&user.name == proposal_author && proposal_status == ProposalStatus::Pending)
}

pub fn require_authority_over<R: UserRepo>(
    repo: &R,
    user: &User,
    world: &World,
    proposal_author: &UserName,
    proposal_status: ProposalStatus,
) -> Result<()> {
    if has_authority_over(repo, user, world, proposal_author, proposal_status)? {
        Ok(())
    } else {
        Err(Error::Forbidden)
    }
}

/// The authors whose work is visible to a non-global user: the user plus
/// their collaborators (minions).
pub fn visible_author_set<R: UserRepo>(repo: &R, user: &User) -> Result<Vec<UserName>> {
    let mut authors = vec![user.name.clone()];
    authors.extend(repo.collaborators_of(&user.name)?);
    Ok(authors)
}

/// Territorial silo rule for review listings: a user sees their own
/// proposals unconditionally, and collaborators' proposals only when the
/// targeted world also belongs to the team. Collaborators' proposals against
/// out-of-team worlds stay invisible.
pub fn passes_territorial_silo(
    viewer: &User,
    visible_authors: &[UserName],
    proposal_author: &UserName,
    world_author: Option<&UserName>,
) -> bool {
    if viewer.is_global_admin() {
        return true;
    }
    if proposal_author == &viewer.name {
        return true;
    }
    if !visible_authors.contains(proposal_author) {
        return false;
    }
    world_author.is_some_and(|owner| visible_authors.contains(owner))
}

/// Public visibility filter: which worlds a user may browse at all.
/// Anonymous readers get LIVE public worlds only; signed-in users add their
/// own and their bosses' territory; admins additionally see system worlds.
pub fn is_world_visible_to<R: UserRepo>(
    repo: &R,
    user: Option<&User>,
    world: &World,
) -> Result<bool> {
    if !world.is_active {
        return Ok(false);
    }
    let Some(user) = user else {
        return Ok(world.is_publicly_visible());
    };
    if user.is_global_admin() {
        return Ok(true);
    }
    if world.is_publicly_visible() {
        return Ok(true);
    }
    match &world.author {
        Some(owner) => {
            if owner == &user.name || user.bosses.contains(owner) {
                return Ok(true);
            }
            if user.rank >= Rank::Admin {
                let owner_is_system = repo
                    .try_get_user(owner)?
                    .map(|o| o.is_global_admin())
                    .unwrap_or(true);
                return Ok(owner_is_system);
            }
            Ok(false)
        }
        // Orphaned worlds surface for admins so they can adopt them.
        None => Ok(user.rank >= Rank::Admin),
    }
}
