use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{jid::*, metadata::*, narrative::*, status::*, time::*, user::*, version::*};

pub type ProposalIdValue = u64;

/// Store-assigned identifier of a proposal record, unique across streams.
#[derive(Debug, Default, Clone, Copy, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct ProposalId(ProposalIdValue);

impl ProposalId {
    pub const fn to_inner(self) -> ProposalIdValue {
        self.0
    }
}

impl From<ProposalIdValue> for ProposalId {
    fn from(from: ProposalIdValue) -> Self {
        Self(from)
    }
}

impl From<ProposalId> for ProposalIdValue {
    fn from(from: ProposalId) -> Self {
        from.0
    }
}

impl fmt::Display for ProposalId {
    fn fmt(&self, f: &mut fmt::Formatter) -> Result<(), fmt::Error> {
        write!(f, "{}", self.0)
    }
}

/// The intent a world proposal carries, discriminated by its `action` tag.
///
/// Serializes to the `cambios` JSON column, e.g.
/// `{"action": "SET_COVER", "cover_image": "portada.png"}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action")]
pub enum ChangeIntent {
    #[serde(rename = "CREATE")]
    Create,
    #[serde(rename = "UPDATE")]
    Update {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        metadata: Option<Metadata>,
    },
    #[serde(rename = "DELETE")]
    Delete,
    #[serde(rename = "RESTORE")]
    Restore,
    #[serde(rename = "SET_COVER")]
    SetCover { cover_image: String },
    #[serde(rename = "TOGGLE_VISIBILITY")]
    ToggleVisibility { target_visibility: bool },
    #[serde(rename = "METADATA_UPDATE")]
    MetadataUpdate { metadata: Metadata },
}

impl ChangeIntent {
    pub fn action_tag(&self) -> &'static str {
        match self {
            Self::Create => "CREATE",
            Self::Update { .. } => "UPDATE",
            Self::Delete => "DELETE",
            Self::Restore => "RESTORE",
            Self::SetCover { .. } => "SET_COVER",
            Self::ToggleVisibility { .. } => "TOGGLE_VISIBILITY",
            Self::MetadataUpdate { .. } => "METADATA_UPDATE",
        }
    }
}

#[derive(Debug, Error)]
#[error("TIMELINE proposals require a year and a snapshot; other change types forbid them")]
pub struct TimelineCouplingViolation;

/// A proposed change to a world, either against the current state (LIVE),
/// against a historical year (TIMELINE) or against the metadata document
/// only (METADATA).
#[rustfmt::skip]
#[derive(Debug, Clone, PartialEq)]
pub struct WorldProposal {
    pub id                   : ProposalId,
    pub world                : JId,
    pub version_number       : VersionNumber,
    pub proposed_name        : String,
    pub proposed_description : String,
    pub cambios              : ChangeIntent,
    pub change_log           : String,
    pub admin_feedback       : Option<String>,
    pub status               : ProposalStatus,
    pub change_type          : ChangeType,
    pub timeline_year        : Option<i32>,
    pub proposed_snapshot    : Option<TimelineSnapshot>,
    pub author               : UserName,
    pub reviewer             : Option<UserName>,
    pub created_at           : TimestampMs,
}

impl WorldProposal {
    /// Checks the dual-track coupling invariant:
    /// `change_type == TIMELINE  <=>  timeline_year and proposed_snapshot set`.
    pub fn check_timeline_coupling(&self) -> Result<(), TimelineCouplingViolation> {
        let is_timeline = self.change_type == ChangeType::Timeline;
        let has_payload = self.timeline_year.is_some() && self.proposed_snapshot.is_some();
        let has_any = self.timeline_year.is_some() || self.proposed_snapshot.is_some();
        if (is_timeline && !has_payload) || (!is_timeline && has_any) {
            return Err(TimelineCouplingViolation);
        }
        Ok(())
    }

    pub fn is_live_proposal(&self) -> bool {
        self.change_type == ChangeType::Live
    }

    pub fn is_timeline_proposal(&self) -> bool {
        self.change_type == ChangeType::Timeline
    }

    /// Pure-metadata proposals leave name and description untouched when
    /// published.
    pub fn is_metadata_only(&self) -> bool {
        matches!(self.cambios, ChangeIntent::MetadataUpdate { .. })
            || self.change_type == ChangeType::Metadata
    }
}

/// Editorial action of a narrative proposal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NarrativeAction {
    Add,
    Edit,
    Delete,
    Restore,
}

impl NarrativeAction {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Add => "ADD",
            Self::Edit => "EDIT",
            Self::Delete => "DELETE",
            Self::Restore => "RESTORE",
        }
    }
}

impl fmt::Display for NarrativeAction {
    fn fmt(&self, f: &mut fmt::Formatter) -> Result<(), fmt::Error> {
        f.write_str(self.as_str())
    }
}

#[rustfmt::skip]
#[derive(Debug, Clone, PartialEq)]
pub struct NarrativeProposal {
    pub id               : ProposalId,
    pub narrative        : NId,
    pub version_number   : VersionNumber,
    pub proposed_title   : String,
    pub proposed_content : String,
    pub action           : NarrativeAction,
    pub change_log       : String,
    pub admin_feedback   : Option<String>,
    pub status           : ProposalStatus,
    pub author           : UserName,
    pub reviewer         : Option<UserName>,
    pub created_at       : TimestampMs,
}

/// Editorial action of a period proposal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PeriodAction {
    Add,
    Edit,
    Delete,
}

impl PeriodAction {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Add => "ADD",
            Self::Edit => "EDIT",
            Self::Delete => "DELETE",
        }
    }
}

impl fmt::Display for PeriodAction {
    fn fmt(&self, f: &mut fmt::Formatter) -> Result<(), fmt::Error> {
        f.write_str(self.as_str())
    }
}

#[rustfmt::skip]
#[derive(Debug, Clone, PartialEq)]
pub struct PeriodProposal {
    pub id                   : ProposalId,
    pub world                : JId,
    pub period_slug          : String,
    pub version_number       : VersionNumber,
    pub proposed_title       : String,
    pub proposed_description : String,
    pub proposed_metadata    : Metadata,
    pub action               : PeriodAction,
    pub change_log           : String,
    pub admin_feedback       : Option<String>,
    pub status               : ProposalStatus,
    pub author               : UserName,
    pub reviewer             : Option<UserName>,
    pub created_at           : TimestampMs,
}

/// Editorial action of an image proposal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageAction {
    Add,
    Delete,
}

impl ImageAction {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Add => "ADD",
            Self::Delete => "DELETE",
        }
    }
}

impl fmt::Display for ImageAction {
    fn fmt(&self, f: &mut fmt::Formatter) -> Result<(), fmt::Error> {
        f.write_str(self.as_str())
    }
}

/// A proposed gallery mutation. `ADD` carries a blob reference for the
/// pending upload; `DELETE` names the live file to move into the per-world
/// trash folder.
#[rustfmt::skip]
#[derive(Debug, Clone, PartialEq)]
pub struct ImageProposal {
    pub id              : ProposalId,
    pub world           : JId,
    pub action          : ImageAction,
    pub image_blob_ref  : Option<String>,
    pub target_filename : String,
    pub title           : String,
    pub reason          : String,
    pub timeline_period : Option<String>,
    pub admin_feedback  : Option<String>,
    pub status          : ProposalStatus,
    pub author          : UserName,
    pub reviewer        : Option<UserName>,
    pub created_at      : TimestampMs,
}
