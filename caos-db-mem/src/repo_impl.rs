use caos_core::repositories::*;
use caos_entities::{
    event::*, id::*, jid::*, narrative::*, notification::*, period::*, proposal::*, social::*,
    user::*, version::*, world::*,
};
use parking_lot::RwLock;

type Result<T> = std::result::Result<T, Error>;

/// All tables of the store. Cloned wholesale for transaction snapshots;
/// the id counter travels with the snapshot so a rollback also rewinds
/// assigned ids.
#[derive(Debug, Default, Clone)]
pub(crate) struct State {
    worlds: Vec<World>,
    world_proposals: Vec<WorldProposal>,
    narratives: Vec<Narrative>,
    narrative_proposals: Vec<NarrativeProposal>,
    periods: Vec<TimelinePeriod>,
    period_proposals: Vec<PeriodProposal>,
    image_proposals: Vec<ImageProposal>,
    users: Vec<User>,
    notifications: Vec<Notification>,
    events: Vec<EventLogEntry>,
    comments: Vec<Comment>,
    likes: Vec<Like>,
    ratings: Vec<Rating>,
    next_id: u64,
}

#[derive(Debug, Default)]
pub struct MemDb {
    state: RwLock<State>,
}

impl MemDb {
    pub(crate) fn snapshot(&self) -> State {
        self.state.read().clone()
    }

    pub(crate) fn restore(&self, snapshot: State) {
        *self.state.write() = snapshot;
    }

    fn next_id(&self) -> u64 {
        let mut state = self.state.write();
        state.next_id += 1;
        state.next_id
    }
}

impl WorldRepo for MemDb {
    fn create_world(&self, world: World) -> Result<()> {
        let mut state = self.state.write();
        if state.worlds.iter().any(|w| w.id == world.id) {
            return Err(Error::AlreadyExists);
        }
        state.worlds.push(world);
        Ok(())
    }

    fn update_world(&self, world: &World) -> Result<()> {
        let mut state = self.state.write();
        let slot = state
            .worlds
            .iter_mut()
            .find(|w| w.id == world.id)
            .ok_or(Error::NotFound)?;
        *slot = world.clone();
        Ok(())
    }

    fn get_world(&self, id: &JId) -> Result<World> {
        self.try_get_world(id)?.ok_or(Error::NotFound)
    }

    fn try_get_world(&self, id: &JId) -> Result<Option<World>> {
        Ok(self
            .state
            .read()
            .worlds
            .iter()
            .find(|w| &w.id == id)
            .cloned())
    }

    fn get_world_by_public_id(&self, public_id: &PublicId) -> Result<World> {
        self.state
            .read()
            .worlds
            .iter()
            .find(|w| &w.public_id == public_id)
            .cloned()
            .ok_or(Error::NotFound)
    }

    fn all_active_worlds(&self) -> Result<Vec<World>> {
        Ok(self
            .state
            .read()
            .worlds
            .iter()
            .filter(|w| w.is_active)
            .cloned()
            .collect())
    }

    fn worlds_in_trash(&self) -> Result<Vec<World>> {
        Ok(self
            .state
            .read()
            .worlds
            .iter()
            .filter(|w| !w.is_active)
            .cloned()
            .collect())
    }

    fn count_worlds(&self) -> Result<usize> {
        Ok(self.state.read().worlds.len())
    }

    fn children_of(&self, parent: &JId) -> Result<Vec<World>> {
        Ok(self
            .state
            .read()
            .worlds
            .iter()
            .filter(|w| w.id.parent().as_ref() == Some(parent))
            .cloned()
            .collect())
    }

    fn delete_world(&self, id: &JId) -> Result<()> {
        let mut state = self.state.write();
        let before = state.worlds.len();
        state.worlds.retain(|w| &w.id != id);
        if state.worlds.len() == before {
            return Err(Error::NotFound);
        }
        Ok(())
    }
}

impl WorldProposalRepo for MemDb {
    fn create_world_proposal(&self, mut proposal: WorldProposal) -> Result<WorldProposal> {
        proposal.id = self.next_id().into();
        self.state.write().world_proposals.push(proposal.clone());
        Ok(proposal)
    }

    fn update_world_proposal(&self, proposal: &WorldProposal) -> Result<()> {
        let mut state = self.state.write();
        let slot = state
            .world_proposals
            .iter_mut()
            .find(|p| p.id == proposal.id)
            .ok_or(Error::NotFound)?;
        *slot = proposal.clone();
        Ok(())
    }

    fn get_world_proposal(&self, id: ProposalId) -> Result<WorldProposal> {
        self.state
            .read()
            .world_proposals
            .iter()
            .find(|p| p.id == id)
            .cloned()
            .ok_or(Error::NotFound)
    }

    fn delete_world_proposal(&self, id: ProposalId) -> Result<()> {
        let mut state = self.state.write();
        let before = state.world_proposals.len();
        state.world_proposals.retain(|p| p.id != id);
        if state.world_proposals.len() == before {
            return Err(Error::NotFound);
        }
        Ok(())
    }

    fn world_proposals_of(&self, world: &JId) -> Result<Vec<WorldProposal>> {
        Ok(self
            .state
            .read()
            .world_proposals
            .iter()
            .filter(|p| &p.world == world)
            .cloned()
            .collect())
    }

    fn query_world_proposals(&self, query: &ProposalQuery) -> Result<Vec<WorldProposal>> {
        let state = self.state.read();
        let world_author = |world: &JId| {
            state
                .worlds
                .iter()
                .find(|w| &w.id == world)
                .and_then(|w| w.author.clone())
        };
        Ok(state
            .world_proposals
            .iter()
            .filter(|p| query.status.is_empty() || query.status.contains(&p.status))
            .filter(|p| query.change_type.map_or(true, |ct| p.change_type == ct))
            .filter(|p| query.authors.is_empty() || query.authors.contains(&p.author))
            .filter(|p| {
                query.world_authors.is_empty()
                    || world_author(&p.world)
                        .map_or(false, |a| query.world_authors.contains(&a))
            })
            .filter(|p| {
                query.text.as_deref().map_or(true, |text| {
                    let text = text.to_lowercase();
                    p.proposed_name.to_lowercase().contains(&text)
                        || p.change_log.to_lowercase().contains(&text)
                })
            })
            .filter(|p| query.since.map_or(true, |ts| p.created_at >= ts))
            .filter(|p| query.until.map_or(true, |ts| p.created_at <= ts))
            .cloned()
            .collect())
    }

    fn next_world_version_number(&self, world: &JId) -> Result<VersionNumber> {
        Ok(self
            .state
            .read()
            .world_proposals
            .iter()
            .filter(|p| &p.world == world)
            .map(|p| p.version_number)
            .max()
            .map(VersionNumber::next)
            .unwrap_or_else(VersionNumber::initial))
    }
}

impl NarrativeRepo for MemDb {
    fn create_narrative(&self, narrative: Narrative) -> Result<()> {
        let mut state = self.state.write();
        if state.narratives.iter().any(|n| n.nid == narrative.nid) {
            return Err(Error::AlreadyExists);
        }
        state.narratives.push(narrative);
        Ok(())
    }

    fn update_narrative(&self, narrative: &Narrative) -> Result<()> {
        let mut state = self.state.write();
        let slot = state
            .narratives
            .iter_mut()
            .find(|n| n.nid == narrative.nid)
            .ok_or(Error::NotFound)?;
        *slot = narrative.clone();
        Ok(())
    }

    fn get_narrative(&self, nid: &NId) -> Result<Narrative> {
        self.state
            .read()
            .narratives
            .iter()
            .find(|n| &n.nid == nid)
            .cloned()
            .ok_or(Error::NotFound)
    }

    fn get_narrative_by_public_id(&self, public_id: &PublicId) -> Result<Narrative> {
        self.state
            .read()
            .narratives
            .iter()
            .find(|n| &n.public_id == public_id)
            .cloned()
            .ok_or(Error::NotFound)
    }

    fn narratives_of_world(&self, world: &JId) -> Result<Vec<Narrative>> {
        Ok(self
            .state
            .read()
            .narratives
            .iter()
            .filter(|n| &n.world == world && n.is_active)
            .cloned()
            .collect())
    }

    fn all_active_narratives(&self) -> Result<Vec<Narrative>> {
        Ok(self
            .state
            .read()
            .narratives
            .iter()
            .filter(|n| n.is_active)
            .cloned()
            .collect())
    }
}

impl NarrativeProposalRepo for MemDb {
    fn create_narrative_proposal(
        &self,
        mut proposal: NarrativeProposal,
    ) -> Result<NarrativeProposal> {
        proposal.id = self.next_id().into();
        self.state
            .write()
            .narrative_proposals
            .push(proposal.clone());
        Ok(proposal)
    }

    fn update_narrative_proposal(&self, proposal: &NarrativeProposal) -> Result<()> {
        let mut state = self.state.write();
        let slot = state
            .narrative_proposals
            .iter_mut()
            .find(|p| p.id == proposal.id)
            .ok_or(Error::NotFound)?;
        *slot = proposal.clone();
        Ok(())
    }

    fn get_narrative_proposal(&self, id: ProposalId) -> Result<NarrativeProposal> {
        self.state
            .read()
            .narrative_proposals
            .iter()
            .find(|p| p.id == id)
            .cloned()
            .ok_or(Error::NotFound)
    }

    fn narrative_proposals_of(&self, nid: &NId) -> Result<Vec<NarrativeProposal>> {
        Ok(self
            .state
            .read()
            .narrative_proposals
            .iter()
            .filter(|p| &p.narrative == nid)
            .cloned()
            .collect())
    }

    fn all_narrative_proposals(&self) -> Result<Vec<NarrativeProposal>> {
        Ok(self.state.read().narrative_proposals.clone())
    }

    fn next_narrative_version_number(&self, nid: &NId) -> Result<VersionNumber> {
        Ok(self
            .state
            .read()
            .narrative_proposals
            .iter()
            .filter(|p| &p.narrative == nid)
            .map(|p| p.version_number)
            .max()
            .map(VersionNumber::next)
            .unwrap_or_else(VersionNumber::initial))
    }
}

impl PeriodRepo for MemDb {
    fn create_period(&self, period: TimelinePeriod) -> Result<()> {
        let mut state = self.state.write();
        if state
            .periods
            .iter()
            .any(|p| p.world == period.world && p.slug == period.slug)
        {
            return Err(Error::AlreadyExists);
        }
        state.periods.push(period);
        Ok(())
    }

    fn update_period(&self, period: &TimelinePeriod) -> Result<()> {
        let mut state = self.state.write();
        let slot = state
            .periods
            .iter_mut()
            .find(|p| p.world == period.world && p.slug == period.slug)
            .ok_or(Error::NotFound)?;
        *slot = period.clone();
        Ok(())
    }

    fn get_period(&self, world: &JId, slug: &str) -> Result<TimelinePeriod> {
        self.state
            .read()
            .periods
            .iter()
            .find(|p| &p.world == world && p.slug == slug)
            .cloned()
            .ok_or(Error::NotFound)
    }

    fn periods_of_world(&self, world: &JId) -> Result<Vec<TimelinePeriod>> {
        let mut periods: Vec<TimelinePeriod> = self
            .state
            .read()
            .periods
            .iter()
            .filter(|p| &p.world == world)
            .cloned()
            .collect();
        periods.sort_by_key(|p| p.order);
        Ok(periods)
    }
}

impl PeriodProposalRepo for MemDb {
    fn create_period_proposal(&self, mut proposal: PeriodProposal) -> Result<PeriodProposal> {
        proposal.id = self.next_id().into();
        self.state.write().period_proposals.push(proposal.clone());
        Ok(proposal)
    }

    fn update_period_proposal(&self, proposal: &PeriodProposal) -> Result<()> {
        let mut state = self.state.write();
        let slot = state
            .period_proposals
            .iter_mut()
            .find(|p| p.id == proposal.id)
            .ok_or(Error::NotFound)?;
        *slot = proposal.clone();
        Ok(())
    }

    fn get_period_proposal(&self, id: ProposalId) -> Result<PeriodProposal> {
        self.state
            .read()
            .period_proposals
            .iter()
            .find(|p| p.id == id)
            .cloned()
            .ok_or(Error::NotFound)
    }

    fn period_proposals_of(&self, world: &JId, slug: &str) -> Result<Vec<PeriodProposal>> {
        Ok(self
            .state
            .read()
            .period_proposals
            .iter()
            .filter(|p| &p.world == world && p.period_slug == slug)
            .cloned()
            .collect())
    }

    fn all_period_proposals(&self) -> Result<Vec<PeriodProposal>> {
        Ok(self.state.read().period_proposals.clone())
    }

    fn next_period_version_number(&self, world: &JId, slug: &str) -> Result<VersionNumber> {
        Ok(self
            .state
            .read()
            .period_proposals
            .iter()
            .filter(|p| &p.world == world && p.period_slug == slug)
            .map(|p| p.version_number)
            .max()
            .map(VersionNumber::next)
            .unwrap_or_else(VersionNumber::initial))
    }
}

impl ImageProposalRepo for MemDb {
    fn create_image_proposal(&self, mut proposal: ImageProposal) -> Result<ImageProposal> {
        proposal.id = self.next_id().into();
        self.state.write().image_proposals.push(proposal.clone());
        Ok(proposal)
    }

    fn update_image_proposal(&self, proposal: &ImageProposal) -> Result<()> {
        let mut state = self.state.write();
        let slot = state
            .image_proposals
            .iter_mut()
            .find(|p| p.id == proposal.id)
            .ok_or(Error::NotFound)?;
        *slot = proposal.clone();
        Ok(())
    }

    fn get_image_proposal(&self, id: ProposalId) -> Result<ImageProposal> {
        self.state
            .read()
            .image_proposals
            .iter()
            .find(|p| p.id == id)
            .cloned()
            .ok_or(Error::NotFound)
    }

    fn image_proposals_of(&self, world: &JId) -> Result<Vec<ImageProposal>> {
        Ok(self
            .state
            .read()
            .image_proposals
            .iter()
            .filter(|p| &p.world == world)
            .cloned()
            .collect())
    }

    fn all_image_proposals(&self) -> Result<Vec<ImageProposal>> {
        Ok(self.state.read().image_proposals.clone())
    }
}

impl UserRepo for MemDb {
    fn create_user(&self, user: &User) -> Result<()> {
        let mut state = self.state.write();
        if state.users.iter().any(|u| u.name == user.name) {
            return Err(Error::AlreadyExists);
        }
        state.users.push(user.clone());
        Ok(())
    }

    fn update_user(&self, user: &User) -> Result<()> {
        let mut state = self.state.write();
        let slot = state
            .users
            .iter_mut()
            .find(|u| u.name == user.name)
            .ok_or(Error::NotFound)?;
        *slot = user.clone();
        Ok(())
    }

    fn delete_user(&self, name: &UserName) -> Result<()> {
        let mut state = self.state.write();
        let before = state.users.len();
        state.users.retain(|u| &u.name != name);
        if state.users.len() == before {
            return Err(Error::NotFound);
        }
        Ok(())
    }

    fn all_users(&self) -> Result<Vec<User>> {
        Ok(self.state.read().users.clone())
    }

    fn count_users(&self) -> Result<usize> {
        Ok(self.state.read().users.len())
    }

    fn get_user(&self, name: &UserName) -> Result<User> {
        self.try_get_user(name)?.ok_or(Error::NotFound)
    }

    fn try_get_user(&self, name: &UserName) -> Result<Option<User>> {
        Ok(self
            .state
            .read()
            .users
            .iter()
            .find(|u| &u.name == name)
            .cloned())
    }

    fn collaborators_of(&self, boss: &UserName) -> Result<Vec<UserName>> {
        Ok(self
            .state
            .read()
            .users
            .iter()
            .filter(|u| u.bosses.contains(boss))
            .map(|u| u.name.clone())
            .collect())
    }
}

impl NotificationRepo for MemDb {
    fn create_notification(&self, mut notification: Notification) -> Result<Notification> {
        notification.id = self.next_id();
        self.state.write().notifications.push(notification.clone());
        Ok(notification)
    }

    fn notifications_of(&self, user: &UserName) -> Result<Vec<Notification>> {
        Ok(self
            .state
            .read()
            .notifications
            .iter()
            .filter(|n| &n.user == user)
            .cloned()
            .collect())
    }

    fn mark_notification_read(&self, id: u64) -> Result<()> {
        let mut state = self.state.write();
        let slot = state
            .notifications
            .iter_mut()
            .find(|n| n.id == id)
            .ok_or(Error::NotFound)?;
        slot.mark_read();
        Ok(())
    }

    fn mark_all_notifications_read(&self, user: &UserName) -> Result<usize> {
        let mut count = 0;
        for notification in self.state.write().notifications.iter_mut() {
            if &notification.user == user && notification.is_unread() {
                notification.mark_read();
                count += 1;
            }
        }
        Ok(count)
    }
}

impl EventLogRepo for MemDb {
    fn log_event(&self, mut entry: EventLogEntry) -> Result<()> {
        entry.id = self.next_id();
        self.state.write().events.push(entry);
        Ok(())
    }

    fn recent_events(&self, pagination: &Pagination) -> Result<Vec<EventLogEntry>> {
        let mut events = self.state.read().events.clone();
        events.sort_by(|a, b| b.at.cmp(&a.at));
        let offset = pagination.offset.unwrap_or(0) as usize;
        let limit = pagination.limit.map(|l| l as usize).unwrap_or(usize::MAX);
        Ok(events.into_iter().skip(offset).take(limit).collect())
    }
}

impl CommentRepo for MemDb {
    fn create_comment(&self, mut comment: Comment) -> Result<Comment> {
        comment.id = self.next_id();
        self.state.write().comments.push(comment.clone());
        Ok(comment)
    }

    fn comments_for(&self, key: &EntityKey, parent_only: bool) -> Result<Vec<Comment>> {
        Ok(self
            .state
            .read()
            .comments
            .iter()
            .filter(|c| c.archived_at.is_none() && &c.entity_key == key)
            .filter(|c| !parent_only || c.parent.is_none())
            .cloned()
            .collect())
    }

    fn count_comments(&self, key: &EntityKey, parent_only: bool) -> Result<usize> {
        Ok(self.comments_for(key, parent_only)?.len())
    }
}

impl LikeRepo for MemDb {
    fn create_like(&self, mut like: Like) -> Result<Like> {
        like.id = self.next_id();
        self.state.write().likes.push(like.clone());
        Ok(like)
    }

    fn delete_like(&self, user: &UserName, key: &EntityKey) -> Result<()> {
        let mut state = self.state.write();
        let before = state.likes.len();
        state
            .likes
            .retain(|l| !(&l.user == user && &l.entity_key == key));
        if state.likes.len() == before {
            return Err(Error::NotFound);
        }
        Ok(())
    }

    fn find_like(&self, user: &UserName, key: &EntityKey) -> Result<Option<Like>> {
        Ok(self
            .state
            .read()
            .likes
            .iter()
            .find(|l| &l.user == user && &l.entity_key == key)
            .cloned())
    }

    fn count_likes(&self, key: &EntityKey) -> Result<usize> {
        Ok(self
            .state
            .read()
            .likes
            .iter()
            .filter(|l| &l.entity_key == key)
            .count())
    }
}

impl RatingRepo for MemDb {
    fn create_rating(&self, mut rating: Rating) -> Result<Rating> {
        rating.id = self.next_id();
        self.state.write().ratings.push(rating.clone());
        Ok(rating)
    }

    fn ratings_for(&self, key: &EntityKey) -> Result<Vec<Rating>> {
        Ok(self
            .state
            .read()
            .ratings
            .iter()
            .filter(|r| &r.entity_key == key)
            .cloned()
            .collect())
    }
}
