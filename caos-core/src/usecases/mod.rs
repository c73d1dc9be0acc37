mod approve_version;
mod archive_version;
mod bulk;
mod change_user_rank;
mod dashboard;
mod delete_user;
mod error;
mod generate_metadata;
mod history;
mod home_index;
mod image_workflow;
mod narrative_workflow;
mod notifications;
mod period_workflow;
mod propose_timeline_snapshot;
mod propose_world_action;
mod propose_world_change;
mod publish_to_live;
mod reject_version;
mod restore_version;
mod social;

pub mod authorize;

#[cfg(test)]
pub mod tests;

type Result<T> = std::result::Result<T, Error>;

pub use self::{
    approve_version::*, archive_version::*, authorize::*, bulk::*, change_user_rank::*,
    dashboard::*, delete_user::*, error::Error, generate_metadata::*, history::*, home_index::*,
    image_workflow::*, narrative_workflow::*, notifications::*, period_workflow::*,
    propose_timeline_snapshot::*, propose_world_action::*, propose_world_change::*,
    publish_to_live::*, reject_version::*, restore_version::*, social::*,
};

mod prelude {
    pub use super::error::Error;
    pub type Result<T> = std::result::Result<T, Error>;
    pub use crate::{
        db::*,
        entities::{
            event::*, id::*, jid::*, metadata::*, narrative::*, notification::*, period::*,
            proposal::*, social::*, status::*, time::*, user::*, version::*, world::*,
        },
        repositories::*,
        RepoError,
    };
}
