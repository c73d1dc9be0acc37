use num_derive::{FromPrimitive, ToPrimitive};
use num_traits::*;
use strum::{EnumCount, EnumIter, EnumString};
use thiserror::Error;

pub type ProposalStatusPrimitive = i16;

/// Lifecycle state of a proposal.
///
/// Allowed transitions:
///
/// ```text
/// PENDING  -> APPROVED | REJECTED | ARCHIVED
/// APPROVED -> REJECTED | ARCHIVED | LIVE
/// LIVE     -> HISTORY            (implicit, on publish of a successor)
/// REJECTED -> ARCHIVED
/// ARCHIVED -> (terminal; restore clones into a new PENDING)
/// ```
#[rustfmt::skip]
#[derive(Debug, Clone, Copy, PartialEq, Eq, FromPrimitive, ToPrimitive, EnumIter, EnumCount, EnumString)]
#[strum(ascii_case_insensitive)]
pub enum ProposalStatus {
    Rejected = -1,
    Archived =  0,
    Pending  =  1,
    Approved =  2,
    Live     =  3,
    History  =  4,
}

impl ProposalStatus {
    pub const fn default() -> Self {
        Self::Pending
    }

    /// Still waiting for editorial action.
    pub fn is_open(self) -> bool {
        matches!(self, Self::Pending | Self::Approved)
    }

    pub fn can_transition(self, to: Self) -> bool {
        use ProposalStatus::*;
        matches!(
            (self, to),
            (Pending, Approved)
                | (Pending, Rejected)
                | (Pending, Archived)
                | (Approved, Rejected)
                | (Approved, Archived)
                | (Approved, Live)
                | (Live, History)
                | (Rejected, Archived)
        )
    }

    pub fn as_str(self) -> &'static str {
        use ProposalStatus::*;
        match self {
            Rejected => "REJECTED",
            Archived => "ARCHIVED",
            Pending => "PENDING",
            Approved => "APPROVED",
            Live => "LIVE",
            History => "HISTORY",
        }
    }
}

impl std::fmt::Display for ProposalStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> Result<(), std::fmt::Error> {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error)]
#[error("Invalid proposal status primitive: {0}")]
pub struct InvalidProposalStatusPrimitive(ProposalStatusPrimitive);

impl TryFrom<ProposalStatusPrimitive> for ProposalStatus {
    type Error = InvalidProposalStatusPrimitive;
    fn try_from(from: ProposalStatusPrimitive) -> Result<Self, Self::Error> {
        Self::from_i16(from).ok_or(InvalidProposalStatusPrimitive(from))
    }
}

impl From<ProposalStatus> for ProposalStatusPrimitive {
    fn from(from: ProposalStatus) -> Self {
        from.to_i16().unwrap_or_default()
    }
}

/// Editorial track of a world proposal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, EnumString)]
#[strum(ascii_case_insensitive)]
pub enum ChangeType {
    Live,
    Timeline,
    Metadata,
}

impl ChangeType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Live => "LIVE",
            Self::Timeline => "TIMELINE",
            Self::Metadata => "METADATA",
        }
    }
}

impl std::fmt::Display for ChangeType {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> Result<(), std::fmt::Error> {
        f.write_str(self.as_str())
    }
}

/// Publication state of the live world record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, EnumString)]
#[strum(ascii_case_insensitive)]
pub enum WorldStatus {
    Draft,
    Live,
    Offline,
    Locked,
    Deleted,
}

impl WorldStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Draft => "DRAFT",
            Self::Live => "LIVE",
            Self::Offline => "OFFLINE",
            Self::Locked => "LOCKED",
            Self::Deleted => "DELETED",
        }
    }
}

impl std::fmt::Display for WorldStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> Result<(), std::fmt::Error> {
        f.write_str(self.as_str())
    }
}
