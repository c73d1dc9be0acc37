use crate::{id::*, jid::*, metadata::*, status::*, time::*, user::*, version::*};

/// Live record of a world (an entity in the cosmological hierarchy).
///
/// The record mirrors the currently-LIVE proposal of its stream; all
/// mutations arrive through the editorial pipeline.
#[rustfmt::skip]
#[derive(Debug, Clone, PartialEq)]
pub struct World {
    pub id                     : JId,
    pub public_id              : PublicId,
    pub name                   : String,
    pub description            : String,
    pub metadata               : Metadata,
    pub status                 : WorldStatus,
    pub is_active              : bool,
    pub visible_publico        : bool,
    pub allow_proposals        : bool,
    pub author                 : Option<UserName>,
    pub current_version_number : VersionNumber,
    pub current_author_name    : Option<String>,
    pub created_at             : TimestampMs,
}

impl World {
    pub fn new(id: JId, name: impl Into<String>, author: Option<UserName>) -> Self {
        Self {
            id,
            public_id: PublicId::new(),
            name: name.into(),
            description: String::new(),
            metadata: Metadata::new(),
            status: WorldStatus::Draft,
            is_active: true,
            visible_publico: true,
            allow_proposals: true,
            author,
            current_version_number: VersionNumber::initial(),
            current_author_name: None,
            created_at: TimestampMs::now(),
        }
    }

    /// Moves the world to the trash. The record stays resolvable for the
    /// trash view and for restore proposals, but disappears from all other
    /// reads.
    pub fn soft_delete(&mut self) {
        self.is_active = false;
        self.status = WorldStatus::Deleted;
    }

    pub fn restore(&mut self) {
        self.is_active = true;
        self.status = WorldStatus::Live;
    }

    pub fn is_publicly_visible(&self) -> bool {
        self.is_active && self.visible_publico && self.status == WorldStatus::Live
    }
}
