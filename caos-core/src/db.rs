use crate::repositories::*;

/// Umbrella over all repositories, implemented by every storage backend.
pub trait Db:
    WorldRepo
    + WorldProposalRepo
    + NarrativeRepo
    + NarrativeProposalRepo
    + PeriodRepo
    + PeriodProposalRepo
    + ImageProposalRepo
    + UserRepo
    + NotificationRepo
    + EventLogRepo
    + CommentRepo
    + LikeRepo
    + RatingRepo
{
}

impl<T> Db for T where
    T: WorldRepo
        + WorldProposalRepo
        + NarrativeRepo
        + NarrativeProposalRepo
        + PeriodRepo
        + PeriodProposalRepo
        + ImageProposalRepo
        + UserRepo
        + NotificationRepo
        + EventLogRepo
        + CommentRepo
        + LikeRepo
        + RatingRepo
{
}
