// Low-level database access traits.
// Each repository is responsible for a single entity and
// its relationships. Related entities are only referenced
// by their id and never modified or loaded by another
// repository.

use std::io;

use thiserror::Error;

use crate::entities::{
    event::*, id::*, jid::*, narrative::*, notification::*, period::*, proposal::*, social::*,
    status::*, time::*, user::*, version::*, world::*,
};

#[derive(Debug, Error)]
pub enum Error {
    #[error("The requested object could not be found")]
    NotFound,
    #[error("The object already exists")]
    AlreadyExists,
    #[error("The version of the object is invalid")]
    InvalidVersion,
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

type Result<T> = std::result::Result<T, Error>;

#[derive(Clone, Debug, Copy, Default, PartialEq, Eq, Hash)]
pub struct Pagination {
    pub offset: Option<u64>,
    pub limit: Option<u64>,
}

/// Filter over a proposal stream. Empty vectors mean "any".
#[derive(Debug, Default, Clone)]
pub struct ProposalQuery {
    pub status: Vec<ProposalStatus>,
    pub change_type: Option<ChangeType>,
    pub authors: Vec<UserName>,
    pub world_authors: Vec<UserName>,
    pub text: Option<String>,
    pub since: Option<TimestampMs>,
    pub until: Option<TimestampMs>,
}

pub trait WorldRepo {
    fn create_world(&self, world: World) -> Result<()>;
    fn update_world(&self, world: &World) -> Result<()>;

    /// Also resolves soft-deleted worlds; callers decide whether the trash
    /// is visible to them.
    fn get_world(&self, id: &JId) -> Result<World>;
    fn try_get_world(&self, id: &JId) -> Result<Option<World>>;
    fn get_world_by_public_id(&self, public_id: &PublicId) -> Result<World>;

    /// Only worlds with `is_active = true`.
    fn all_active_worlds(&self) -> Result<Vec<World>>;
    fn worlds_in_trash(&self) -> Result<Vec<World>>;
    fn count_worlds(&self) -> Result<usize>;
    fn children_of(&self, parent: &JId) -> Result<Vec<World>>;

    /// Hard delete. Reserved for admins acting on trashed records.
    fn delete_world(&self, id: &JId) -> Result<()>;
}

pub trait WorldProposalRepo {
    /// Persists a new proposal, assigning its id.
    fn create_world_proposal(&self, proposal: WorldProposal) -> Result<WorldProposal>;
    fn update_world_proposal(&self, proposal: &WorldProposal) -> Result<()>;
    fn get_world_proposal(&self, id: ProposalId) -> Result<WorldProposal>;
    fn delete_world_proposal(&self, id: ProposalId) -> Result<()>;
    fn world_proposals_of(&self, world: &JId) -> Result<Vec<WorldProposal>>;
    fn query_world_proposals(&self, query: &ProposalQuery) -> Result<Vec<WorldProposal>>;

    /// Next free version number of the target's stream. Runs inside the same
    /// atomic unit as the subsequent insert.
    fn next_world_version_number(&self, world: &JId) -> Result<VersionNumber>;
}

pub trait NarrativeRepo {
    fn create_narrative(&self, narrative: Narrative) -> Result<()>;
    fn update_narrative(&self, narrative: &Narrative) -> Result<()>;
    fn get_narrative(&self, nid: &NId) -> Result<Narrative>;
    fn get_narrative_by_public_id(&self, public_id: &PublicId) -> Result<Narrative>;
    fn narratives_of_world(&self, world: &JId) -> Result<Vec<Narrative>>;
    fn all_active_narratives(&self) -> Result<Vec<Narrative>>;
}

pub trait NarrativeProposalRepo {
    fn create_narrative_proposal(&self, proposal: NarrativeProposal) -> Result<NarrativeProposal>;
    fn update_narrative_proposal(&self, proposal: &NarrativeProposal) -> Result<()>;
    fn get_narrative_proposal(&self, id: ProposalId) -> Result<NarrativeProposal>;
    fn narrative_proposals_of(&self, nid: &NId) -> Result<Vec<NarrativeProposal>>;
    fn all_narrative_proposals(&self) -> Result<Vec<NarrativeProposal>>;
    fn next_narrative_version_number(&self, nid: &NId) -> Result<VersionNumber>;
}

pub trait PeriodRepo {
    fn create_period(&self, period: TimelinePeriod) -> Result<()>;
    fn update_period(&self, period: &TimelinePeriod) -> Result<()>;
    fn get_period(&self, world: &JId, slug: &str) -> Result<TimelinePeriod>;
    fn periods_of_world(&self, world: &JId) -> Result<Vec<TimelinePeriod>>;
}

pub trait PeriodProposalRepo {
    fn create_period_proposal(&self, proposal: PeriodProposal) -> Result<PeriodProposal>;
    fn update_period_proposal(&self, proposal: &PeriodProposal) -> Result<()>;
    fn get_period_proposal(&self, id: ProposalId) -> Result<PeriodProposal>;
    fn period_proposals_of(&self, world: &JId, slug: &str) -> Result<Vec<PeriodProposal>>;
    fn all_period_proposals(&self) -> Result<Vec<PeriodProposal>>;
    fn next_period_version_number(&self, world: &JId, slug: &str) -> Result<VersionNumber>;
}

pub trait ImageProposalRepo {
    fn create_image_proposal(&self, proposal: ImageProposal) -> Result<ImageProposal>;
    fn update_image_proposal(&self, proposal: &ImageProposal) -> Result<()>;
    fn get_image_proposal(&self, id: ProposalId) -> Result<ImageProposal>;
    fn image_proposals_of(&self, world: &JId) -> Result<Vec<ImageProposal>>;
    fn all_image_proposals(&self) -> Result<Vec<ImageProposal>>;
}

pub trait UserRepo {
    fn create_user(&self, user: &User) -> Result<()>;
    fn update_user(&self, user: &User) -> Result<()>;
    fn delete_user(&self, name: &UserName) -> Result<()>;

    fn all_users(&self) -> Result<Vec<User>>;
    fn count_users(&self) -> Result<usize>;

    fn get_user(&self, name: &UserName) -> Result<User>;
    fn try_get_user(&self, name: &UserName) -> Result<Option<User>>;

    /// Inverse of `User::bosses`: everyone who collaborates for `boss`.
    fn collaborators_of(&self, boss: &UserName) -> Result<Vec<UserName>>;
}

pub trait NotificationRepo {
    fn create_notification(&self, notification: Notification) -> Result<Notification>;
    fn notifications_of(&self, user: &UserName) -> Result<Vec<Notification>>;
    fn mark_notification_read(&self, id: u64) -> Result<()>;
    fn mark_all_notifications_read(&self, user: &UserName) -> Result<usize>;
}

pub trait EventLogRepo {
    fn log_event(&self, entry: EventLogEntry) -> Result<()>;
    fn recent_events(&self, pagination: &Pagination) -> Result<Vec<EventLogEntry>>;
}

pub trait CommentRepo {
    fn create_comment(&self, comment: Comment) -> Result<Comment>;

    // Only unarchived comments
    fn comments_for(&self, key: &EntityKey, parent_only: bool) -> Result<Vec<Comment>>;
    fn count_comments(&self, key: &EntityKey, parent_only: bool) -> Result<usize>;
}

pub trait LikeRepo {
    fn create_like(&self, like: Like) -> Result<Like>;
    fn delete_like(&self, user: &UserName, key: &EntityKey) -> Result<()>;
    fn find_like(&self, user: &UserName, key: &EntityKey) -> Result<Option<Like>>;
    fn count_likes(&self, key: &EntityKey) -> Result<usize>;
}

pub trait RatingRepo {
    fn create_rating(&self, rating: Rating) -> Result<Rating>;
    fn ratings_for(&self, key: &EntityKey) -> Result<Vec<Rating>>;
}
