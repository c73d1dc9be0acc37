use std::cell::{Cell, RefCell};

use anyhow::{anyhow, Result as Fallible};
use serde_json::Value;

use crate::{
    entities::{
        event::*, id::*, jid::*, narrative::*, notification::*, period::*, proposal::*,
        social::*, user::*, version::*, world::*,
    },
    gateways::{images::ImageStorage, llm::LoreGenerator},
    repositories::{Error as RepoError, *},
};

type RepoResult<T> = std::result::Result<T, RepoError>;

/// In-memory double of the store for usecase-level tests.
#[derive(Default)]
pub struct MockDb {
    pub worlds: RefCell<Vec<World>>,
    pub world_proposals: RefCell<Vec<WorldProposal>>,
    pub narratives: RefCell<Vec<Narrative>>,
    pub narrative_proposals: RefCell<Vec<NarrativeProposal>>,
    pub periods: RefCell<Vec<TimelinePeriod>>,
    pub period_proposals: RefCell<Vec<PeriodProposal>>,
    pub image_proposals: RefCell<Vec<ImageProposal>>,
    pub users: RefCell<Vec<User>>,
    pub notifications: RefCell<Vec<Notification>>,
    pub events: RefCell<Vec<EventLogEntry>>,
    pub comments: RefCell<Vec<Comment>>,
    pub likes: RefCell<Vec<Like>>,
    pub ratings: RefCell<Vec<Rating>>,
    next_id: Cell<u64>,
}

impl MockDb {
    fn next_id(&self) -> u64 {
        let id = self.next_id.get() + 1;
        self.next_id.set(id);
        id
    }
}

impl WorldRepo for MockDb {
    fn create_world(&self, world: World) -> RepoResult<()> {
        if self.worlds.borrow().iter().any(|w| w.id == world.id) {
            return Err(RepoError::AlreadyExists);
        }
        self.worlds.borrow_mut().push(world);
        Ok(())
    }

    fn update_world(&self, world: &World) -> RepoResult<()> {
        let mut worlds = self.worlds.borrow_mut();
        let slot = worlds
            .iter_mut()
            .find(|w| w.id == world.id)
            .ok_or(RepoError::NotFound)?;
        *slot = world.clone();
        Ok(())
    }

    fn get_world(&self, id: &JId) -> RepoResult<World> {
        self.try_get_world(id)?.ok_or(RepoError::NotFound)
    }

    fn try_get_world(&self, id: &JId) -> RepoResult<Option<World>> {
        Ok(self.worlds.borrow().iter().find(|w| &w.id == id).cloned())
    }

    fn get_world_by_public_id(&self, public_id: &PublicId) -> RepoResult<World> {
        self.worlds
            .borrow()
            .iter()
            .find(|w| &w.public_id == public_id)
            .cloned()
            .ok_or(RepoError::NotFound)
    }

    fn all_active_worlds(&self) -> RepoResult<Vec<World>> {
        Ok(self
            .worlds
            .borrow()
            .iter()
            .filter(|w| w.is_active)
            .cloned()
            .collect())
    }

    fn worlds_in_trash(&self) -> RepoResult<Vec<World>> {
        Ok(self
            .worlds
            .borrow()
            .iter()
            .filter(|w| !w.is_active)
            .cloned()
            .collect())
    }

    fn count_worlds(&self) -> RepoResult<usize> {
        Ok(self.worlds.borrow().len())
    }

    fn children_of(&self, parent: &JId) -> RepoResult<Vec<World>> {
        Ok(self
            .worlds
            .borrow()
            .iter()
            .filter(|w| w.id.parent().as_ref() == Some(parent))
            .cloned()
            .collect())
    }

    fn delete_world(&self, id: &JId) -> RepoResult<()> {
        let mut worlds = self.worlds.borrow_mut();
        let before = worlds.len();
        worlds.retain(|w| &w.id != id);
        if worlds.len() == before {
            return Err(RepoError::NotFound);
        }
        Ok(())
    }
}

impl WorldProposalRepo for MockDb {
    fn create_world_proposal(&self, mut proposal: WorldProposal) -> RepoResult<WorldProposal> {
        proposal.id = self.next_id().into();
        self.world_proposals.borrow_mut().push(proposal.clone());
        Ok(proposal)
    }

    fn update_world_proposal(&self, proposal: &WorldProposal) -> RepoResult<()> {
        let mut proposals = self.world_proposals.borrow_mut();
        let slot = proposals
            .iter_mut()
            .find(|p| p.id == proposal.id)
            .ok_or(RepoError::NotFound)?;
        *slot = proposal.clone();
        Ok(())
    }

    fn get_world_proposal(&self, id: ProposalId) -> RepoResult<WorldProposal> {
        self.world_proposals
            .borrow()
            .iter()
            .find(|p| p.id == id)
            .cloned()
            .ok_or(RepoError::NotFound)
    }

    fn delete_world_proposal(&self, id: ProposalId) -> RepoResult<()> {
        let mut proposals = self.world_proposals.borrow_mut();
        let before = proposals.len();
        proposals.retain(|p| p.id != id);
        if proposals.len() == before {
            return Err(RepoError::NotFound);
        }
        Ok(())
    }

    fn world_proposals_of(&self, world: &JId) -> RepoResult<Vec<WorldProposal>> {
        Ok(self
            .world_proposals
            .borrow()
            .iter()
            .filter(|p| &p.world == world)
            .cloned()
            .collect())
    }

    fn query_world_proposals(&self, query: &ProposalQuery) -> RepoResult<Vec<WorldProposal>> {
        let worlds = self.worlds.borrow();
        Ok(self
            .world_proposals
            .borrow()
            .iter()
            .filter(|p| query.status.is_empty() || query.status.contains(&p.status))
            .filter(|p| query.change_type.map_or(true, |ct| p.change_type == ct))
            .filter(|p| query.authors.is_empty() || query.authors.contains(&p.author))
            .filter(|p| {
                query.world_authors.is_empty()
                    || worlds
                        .iter()
                        .find(|w| w.id == p.world)
                        .and_then(|w| w.author.as_ref())
                        .is_some_and(|a| query.world_authors.contains(a))
            })
            .filter(|p| {
                query.text.as_deref().map_or(true, |t| {
                    let t = t.to_lowercase();
                    p.proposed_name.to_lowercase().contains(&t)
                        || p.change_log.to_lowercase().contains(&t)
                })
            })
            .filter(|p| query.since.map_or(true, |ts| p.created_at >= ts))
            .filter(|p| query.until.map_or(true, |ts| p.created_at <= ts))
            .cloned()
            .collect())
    }

    fn next_world_version_number(&self, world: &JId) -> RepoResult<VersionNumber> {
        Ok(self
            .world_proposals
            .borrow()
            .iter()
            .filter(|p| &p.world == world)
            .map(|p| p.version_number)
            .max()
            .map(VersionNumber::next)
            .unwrap_or_else(VersionNumber::initial))
    }
}

impl NarrativeRepo for MockDb {
    fn create_narrative(&self, narrative: Narrative) -> RepoResult<()> {
        if self
            .narratives
            .borrow()
            .iter()
            .any(|n| n.nid == narrative.nid)
        {
            return Err(RepoError::AlreadyExists);
        }
        self.narratives.borrow_mut().push(narrative);
        Ok(())
    }

    fn update_narrative(&self, narrative: &Narrative) -> RepoResult<()> {
        let mut narratives = self.narratives.borrow_mut();
        let slot = narratives
            .iter_mut()
            .find(|n| n.nid == narrative.nid)
            .ok_or(RepoError::NotFound)?;
        *slot = narrative.clone();
        Ok(())
    }

    fn get_narrative(&self, nid: &NId) -> RepoResult<Narrative> {
        self.narratives
            .borrow()
            .iter()
            .find(|n| &n.nid == nid)
            .cloned()
            .ok_or(RepoError::NotFound)
    }

    fn get_narrative_by_public_id(&self, public_id: &PublicId) -> RepoResult<Narrative> {
        self.narratives
            .borrow()
            .iter()
            .find(|n| &n.public_id == public_id)
            .cloned()
            .ok_or(RepoError::NotFound)
    }

    fn narratives_of_world(&self, world: &JId) -> RepoResult<Vec<Narrative>> {
        Ok(self
            .narratives
            .borrow()
            .iter()
            .filter(|n| &n.world == world && n.is_active)
            .cloned()
            .collect())
    }

    fn all_active_narratives(&self) -> RepoResult<Vec<Narrative>> {
        Ok(self
            .narratives
            .borrow()
            .iter()
            .filter(|n| n.is_active)
            .cloned()
            .collect())
    }
}

impl NarrativeProposalRepo for MockDb {
    fn create_narrative_proposal(
        &self,
        mut proposal: NarrativeProposal,
    ) -> RepoResult<NarrativeProposal> {
        proposal.id = self.next_id().into();
        self.narrative_proposals.borrow_mut().push(proposal.clone());
        Ok(proposal)
    }

    fn update_narrative_proposal(&self, proposal: &NarrativeProposal) -> RepoResult<()> {
        let mut proposals = self.narrative_proposals.borrow_mut();
        let slot = proposals
            .iter_mut()
            .find(|p| p.id == proposal.id)
            .ok_or(RepoError::NotFound)?;
        *slot = proposal.clone();
        Ok(())
    }

    fn get_narrative_proposal(&self, id: ProposalId) -> RepoResult<NarrativeProposal> {
        self.narrative_proposals
            .borrow()
            .iter()
            .find(|p| p.id == id)
            .cloned()
            .ok_or(RepoError::NotFound)
    }

    fn narrative_proposals_of(&self, nid: &NId) -> RepoResult<Vec<NarrativeProposal>> {
        Ok(self
            .narrative_proposals
            .borrow()
            .iter()
            .filter(|p| &p.narrative == nid)
            .cloned()
            .collect())
    }

    fn all_narrative_proposals(&self) -> RepoResult<Vec<NarrativeProposal>> {
        Ok(self.narrative_proposals.borrow().clone())
    }

    fn next_narrative_version_number(&self, nid: &NId) -> RepoResult<VersionNumber> {
        Ok(self
            .narrative_proposals
            .borrow()
            .iter()
            .filter(|p| &p.narrative == nid)
            .map(|p| p.version_number)
            .max()
            .map(VersionNumber::next)
            .unwrap_or_else(VersionNumber::initial))
    }
}

impl PeriodRepo for MockDb {
    fn create_period(&self, period: TimelinePeriod) -> RepoResult<()> {
        if self
            .periods
            .borrow()
            .iter()
            .any(|p| p.world == period.world && p.slug == period.slug)
        {
            return Err(RepoError::AlreadyExists);
        }
        self.periods.borrow_mut().push(period);
        Ok(())
    }

    fn update_period(&self, period: &TimelinePeriod) -> RepoResult<()> {
        let mut periods = self.periods.borrow_mut();
        let slot = periods
            .iter_mut()
            .find(|p| p.world == period.world && p.slug == period.slug)
            .ok_or(RepoError::NotFound)?;
        *slot = period.clone();
        Ok(())
    }

    fn get_period(&self, world: &JId, slug: &str) -> RepoResult<TimelinePeriod> {
        self.periods
            .borrow()
            .iter()
            .find(|p| &p.world == world && p.slug == slug)
            .cloned()
            .ok_or(RepoError::NotFound)
    }

    fn periods_of_world(&self, world: &JId) -> RepoResult<Vec<TimelinePeriod>> {
        let mut periods: Vec<TimelinePeriod> = self
            .periods
            .borrow()
            .iter()
            .filter(|p| &p.world == world)
            .cloned()
            .collect();
        periods.sort_by_key(|p| p.order);
        Ok(periods)
    }
}

impl PeriodProposalRepo for MockDb {
    fn create_period_proposal(&self, mut proposal: PeriodProposal) -> RepoResult<PeriodProposal> {
        proposal.id = self.next_id().into();
        self.period_proposals.borrow_mut().push(proposal.clone());
        Ok(proposal)
    }

    fn update_period_proposal(&self, proposal: &PeriodProposal) -> RepoResult<()> {
        let mut proposals = self.period_proposals.borrow_mut();
        let slot = proposals
            .iter_mut()
            .find(|p| p.id == proposal.id)
            .ok_or(RepoError::NotFound)?;
        *slot = proposal.clone();
        Ok(())
    }

    fn get_period_proposal(&self, id: ProposalId) -> RepoResult<PeriodProposal> {
        self.period_proposals
            .borrow()
            .iter()
            .find(|p| p.id == id)
            .cloned()
            .ok_or(RepoError::NotFound)
    }

    fn period_proposals_of(&self, world: &JId, slug: &str) -> RepoResult<Vec<PeriodProposal>> {
        Ok(self
            .period_proposals
            .borrow()
            .iter()
            .filter(|p| &p.world == world && p.period_slug == slug)
            .cloned()
            .collect())
    }

    fn all_period_proposals(&self) -> RepoResult<Vec<PeriodProposal>> {
        Ok(self.period_proposals.borrow().clone())
    }

    fn next_period_version_number(&self, world: &JId, slug: &str) -> RepoResult<VersionNumber> {
        Ok(self
            .period_proposals
            .borrow()
            .iter()
            .filter(|p| &p.world == world && p.period_slug == slug)
            .map(|p| p.version_number)
            .max()
            .map(VersionNumber::next)
            .unwrap_or_else(VersionNumber::initial))
    }
}

impl ImageProposalRepo for MockDb {
    fn create_image_proposal(&self, mut proposal: ImageProposal) -> RepoResult<ImageProposal> {
        proposal.id = self.next_id().into();
        self.image_proposals.borrow_mut().push(proposal.clone());
        Ok(proposal)
    }

    fn update_image_proposal(&self, proposal: &ImageProposal) -> RepoResult<()> {
        let mut proposals = self.image_proposals.borrow_mut();
        let slot = proposals
            .iter_mut()
            .find(|p| p.id == proposal.id)
            .ok_or(RepoError::NotFound)?;
        *slot = proposal.clone();
        Ok(())
    }

    fn get_image_proposal(&self, id: ProposalId) -> RepoResult<ImageProposal> {
        self.image_proposals
            .borrow()
            .iter()
            .find(|p| p.id == id)
            .cloned()
            .ok_or(RepoError::NotFound)
    }

    fn image_proposals_of(&self, world: &JId) -> RepoResult<Vec<ImageProposal>> {
        Ok(self
            .image_proposals
            .borrow()
            .iter()
            .filter(|p| &p.world == world)
            .cloned()
            .collect())
    }

    fn all_image_proposals(&self) -> RepoResult<Vec<ImageProposal>> {
        Ok(self.image_proposals.borrow().clone())
    }
}

impl UserRepo for MockDb {
    fn create_user(&self, user: &User) -> RepoResult<()> {
        if self.users.borrow().iter().any(|u| u.name == user.name) {
            return Err(RepoError::AlreadyExists);
        }
        self.users.borrow_mut().push(user.clone());
        Ok(())
    }

    fn update_user(&self, user: &User) -> RepoResult<()> {
        let mut users = self.users.borrow_mut();
        let slot = users
            .iter_mut()
            .find(|u| u.name == user.name)
            .ok_or(RepoError::NotFound)?;
        *slot = user.clone();
        Ok(())
    }

    fn delete_user(&self, name: &UserName) -> RepoResult<()> {
        let mut users = self.users.borrow_mut();
        let before = users.len();
        users.retain(|u| &u.name != name);
        if users.len() == before {
            return Err(RepoError::NotFound);
        }
        Ok(())
    }

    fn all_users(&self) -> RepoResult<Vec<User>> {
        Ok(self.users.borrow().clone())
    }

    fn count_users(&self) -> RepoResult<usize> {
        Ok(self.users.borrow().len())
    }

    fn get_user(&self, name: &UserName) -> RepoResult<User> {
        self.try_get_user(name)?.ok_or(RepoError::NotFound)
    }

    fn try_get_user(&self, name: &UserName) -> RepoResult<Option<User>> {
        Ok(self.users.borrow().iter().find(|u| &u.name == name).cloned())
    }

    fn collaborators_of(&self, boss: &UserName) -> RepoResult<Vec<UserName>> {
        Ok(self
            .users
            .borrow()
            .iter()
            .filter(|u| u.bosses.contains(boss))
            .map(|u| u.name.clone())
            .collect())
    }
}

impl NotificationRepo for MockDb {
    fn create_notification(&self, mut notification: Notification) -> RepoResult<Notification> {
        notification.id = self.next_id();
        self.notifications.borrow_mut().push(notification.clone());
        Ok(notification)
    }

    fn notifications_of(&self, user: &UserName) -> RepoResult<Vec<Notification>> {
        Ok(self
            .notifications
            .borrow()
            .iter()
            .filter(|n| &n.user == user)
            .cloned()
            .collect())
    }

    fn mark_notification_read(&self, id: u64) -> RepoResult<()> {
        let mut notifications = self.notifications.borrow_mut();
        let slot = notifications
            .iter_mut()
            .find(|n| n.id == id)
            .ok_or(RepoError::NotFound)?;
        slot.mark_read();
        Ok(())
    }

    fn mark_all_notifications_read(&self, user: &UserName) -> RepoResult<usize> {
        let mut count = 0;
        for notification in self.notifications.borrow_mut().iter_mut() {
            if &notification.user == user && notification.is_unread() {
                notification.mark_read();
                count += 1;
            }
        }
        Ok(count)
    }
}

impl EventLogRepo for MockDb {
    fn log_event(&self, mut entry: EventLogEntry) -> RepoResult<()> {
        entry.id = self.next_id();
        self.events.borrow_mut().push(entry);
        Ok(())
    }

    fn recent_events(&self, pagination: &Pagination) -> RepoResult<Vec<EventLogEntry>> {
        let mut events = self.events.borrow().clone();
        events.sort_by(|a, b| b.at.cmp(&a.at));
        let offset = pagination.offset.unwrap_or(0) as usize;
        let limit = pagination.limit.map(|l| l as usize).unwrap_or(usize::MAX);
        Ok(events.into_iter().skip(offset).take(limit).collect())
    }
}

impl CommentRepo for MockDb {
    fn create_comment(&self, mut comment: Comment) -> RepoResult<Comment> {
        comment.id = self.next_id();
        self.comments.borrow_mut().push(comment.clone());
        Ok(comment)
    }

    fn comments_for(&self, key: &EntityKey, parent_only: bool) -> RepoResult<Vec<Comment>> {
        Ok(self
            .comments
            .borrow()
            .iter()
            .filter(|c| c.archived_at.is_none() && &c.entity_key == key)
            .filter(|c| !parent_only || c.parent.is_none())
            .cloned()
            .collect())
    }

    fn count_comments(&self, key: &EntityKey, parent_only: bool) -> RepoResult<usize> {
        Ok(self.comments_for(key, parent_only)?.len())
    }
}

impl LikeRepo for MockDb {
    fn create_like(&self, mut like: Like) -> RepoResult<Like> {
        like.id = self.next_id();
        self.likes.borrow_mut().push(like.clone());
        Ok(like)
    }

    fn delete_like(&self, user: &UserName, key: &EntityKey) -> RepoResult<()> {
        let mut likes = self.likes.borrow_mut();
        let before = likes.len();
        likes.retain(|l| !(&l.user == user && &l.entity_key == key));
        if likes.len() == before {
            return Err(RepoError::NotFound);
        }
        Ok(())
    }

    fn find_like(&self, user: &UserName, key: &EntityKey) -> RepoResult<Option<Like>> {
        Ok(self
            .likes
            .borrow()
            .iter()
            .find(|l| &l.user == user && &l.entity_key == key)
            .cloned())
    }

    fn count_likes(&self, key: &EntityKey) -> RepoResult<usize> {
        Ok(self
            .likes
            .borrow()
            .iter()
            .filter(|l| &l.entity_key == key)
            .count())
    }
}

impl RatingRepo for MockDb {
    fn create_rating(&self, mut rating: Rating) -> RepoResult<Rating> {
        rating.id = self.next_id();
        self.ratings.borrow_mut().push(rating.clone());
        Ok(rating)
    }

    fn ratings_for(&self, key: &EntityKey) -> RepoResult<Vec<Rating>> {
        Ok(self
            .ratings
            .borrow()
            .iter()
            .filter(|r| &r.entity_key == key)
            .cloned()
            .collect())
    }
}

/// In-memory double of the per-world image folders.
#[derive(Default)]
pub struct MockStorage {
    files: RefCell<Vec<(JId, String, bool)>>, // (world, filename, trashed)
}

impl MockStorage {
    pub fn seed(&self, world: &JId, filename: &str) {
        self.files
            .borrow_mut()
            .push((world.clone(), filename.to_owned(), false));
    }

    pub fn live_files(&self, world: &JId) -> Vec<String> {
        self.files
            .borrow()
            .iter()
            .filter(|(w, _, trashed)| w == world && !trashed)
            .map(|(_, f, _)| f.clone())
            .collect()
    }

    pub fn trashed_files(&self, world: &JId) -> Vec<String> {
        self.files
            .borrow()
            .iter()
            .filter(|(w, _, trashed)| w == world && *trashed)
            .map(|(_, f, _)| f.clone())
            .collect()
    }
}

impl ImageStorage for MockStorage {
    fn store(&self, world: &JId, filename: &str, _blob_ref: &str) -> Fallible<()> {
        self.seed(world, filename);
        Ok(())
    }

    fn move_to_trash(&self, world: &JId, filename: &str) -> Fallible<()> {
        let mut files = self.files.borrow_mut();
        let slot = files
            .iter_mut()
            .find(|(w, f, trashed)| w == world && f == filename && !trashed)
            .ok_or_else(|| anyhow!("no such file: {filename}"))?;
        slot.2 = true;
        Ok(())
    }

    fn restore_from_trash(&self, world: &JId, filename: &str) -> Fallible<()> {
        let mut files = self.files.borrow_mut();
        let slot = files
            .iter_mut()
            .find(|(w, f, trashed)| w == world && f == filename && *trashed)
            .ok_or_else(|| anyhow!("not in trash: {filename}"))?;
        slot.2 = false;
        Ok(())
    }

    fn list_images(&self, world: &JId) -> Fallible<Vec<String>> {
        Ok(self.live_files(world))
    }
}

/// Scripted double of the LLM collaborator.
#[derive(Default)]
pub struct MockLore {
    structure: Option<Value>,
    text: Option<String>,
    structure_calls: Cell<usize>,
}

impl MockLore {
    pub fn with_structure(structure: Value) -> Self {
        Self {
            structure: Some(structure),
            ..Default::default()
        }
    }

    pub fn with_text(text: &str) -> Self {
        Self {
            text: Some(text.to_owned()),
            ..Default::default()
        }
    }

    pub fn structure_calls(&self) -> usize {
        self.structure_calls.get()
    }
}

impl LoreGenerator for MockLore {
    fn edit_text(&self, _: &str, _: &str, _: f32, _: u32) -> Fallible<String> {
        self.text
            .clone()
            .ok_or_else(|| anyhow!("no scripted text response"))
    }

    fn generate_structure(&self, _: &str, _: &str) -> Fallible<Value> {
        self.structure_calls.set(self.structure_calls.get() + 1);
        self.structure
            .clone()
            .ok_or_else(|| anyhow!("no scripted structure response"))
    }

    fn extract_metadata(&self, _: &str) -> Fallible<Value> {
        self.structure
            .clone()
            .ok_or_else(|| anyhow!("no scripted extraction response"))
    }
}
