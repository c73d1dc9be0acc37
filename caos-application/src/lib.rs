#[macro_use]
extern crate log;

mod bulk_operations;
mod content_discovery;
mod history_cleanup;
mod image_versions;
mod metadata_generation;
mod narrative_versions;
mod period_versions;
mod user_management;
mod world_versions;

pub mod prelude {
    pub use super::{
        bulk_operations::*, content_discovery::*, history_cleanup::*, image_versions::*,
        metadata_generation::*, narrative_versions::*, period_versions::*, user_management::*,
        world_versions::*,
    };
}

pub mod error;

pub type Result<T> = std::result::Result<T, error::AppError>;

pub(crate) use caos_core::{entities, usecases};

pub(crate) mod mem {
    pub use caos_db_mem::Connections;
}

#[cfg(test)]
pub(crate) mod tests;
