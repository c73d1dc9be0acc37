use std::{fmt, str::FromStr};

use thiserror::Error;

use crate::{id::*, proposal::*, time::*, user::*};

/// Opaque key a social interaction attaches to.
///
/// Canonical string forms: `WORLD_{public_id}`, `IMG_{filename}`,
/// `narr_{public_id}`, `VER_{proposal_id}`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum EntityKey {
    World(PublicId),
    Image(String),
    Narrative(PublicId),
    Version(ProposalId),
}

#[derive(Debug, Clone, Eq, PartialEq, Error)]
#[error("Unrecognized entity key: {0}")]
pub struct EntityKeyParseError(String);

/// Keys arrive from templates and client scripts with unstable casing and
/// with dashes occasionally escaped as `-`; comparisons go through
/// this normal form.
pub fn normalize_key(key: &str) -> String {
    key.to_lowercase()
        .replace("\\u002d", "-")
        .replace("\\u002D", "-")
}

impl EntityKey {
    pub fn matches(&self, raw: &str) -> bool {
        normalize_key(raw) == normalize_key(&self.to_string())
    }
}

impl fmt::Display for EntityKey {
    fn fmt(&self, f: &mut fmt::Formatter) -> Result<(), fmt::Error> {
        match self {
            Self::World(pid) => write!(f, "WORLD_{pid}"),
            Self::Image(filename) => write!(f, "IMG_{filename}"),
            Self::Narrative(pid) => write!(f, "narr_{pid}"),
            Self::Version(id) => write!(f, "VER_{id}"),
        }
    }
}

impl FromStr for EntityKey {
    type Err = EntityKeyParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = normalize_key(s);
        let rest = |prefix: &str| s[prefix.len()..].replace("\\u002D", "-").replace("\\u002d", "-");
        if normalized.starts_with("world_") {
            return Ok(Self::World(rest("world_").into()));
        }
        if normalized.starts_with("img_") {
            return Ok(Self::Image(rest("img_")));
        }
        if normalized.starts_with("narr_") {
            return Ok(Self::Narrative(rest("narr_").into()));
        }
        if normalized.starts_with("ver_") {
            if let Ok(id) = rest("ver_").parse::<ProposalIdValue>() {
                return Ok(Self::Version(id.into()));
            }
        }
        Err(EntityKeyParseError(s.to_owned()))
    }
}

#[rustfmt::skip]
#[derive(Debug, Clone, PartialEq)]
pub struct Comment {
    pub id          : u64,
    pub entity_key  : EntityKey,
    pub user        : UserName,
    pub text        : String,
    pub parent      : Option<u64>,
    pub created_at  : TimestampMs,
    pub archived_at : Option<TimestampMs>,
}

#[rustfmt::skip]
#[derive(Debug, Clone, PartialEq)]
pub struct Like {
    pub id         : u64,
    pub entity_key : EntityKey,
    pub user       : UserName,
    pub created_at : TimestampMs,
}

/// Star rating in the inclusive range 1..=5.
#[derive(Debug, Clone, Copy, Eq, PartialEq, PartialOrd, Ord)]
pub struct RatingScore(u8);

impl RatingScore {
    pub const fn min() -> Self {
        Self(1)
    }

    pub const fn max() -> Self {
        Self(5)
    }

    pub fn new<I: Into<u8>>(val: I) -> Self {
        let new = Self(val.into());
        debug_assert!(new.is_valid());
        new
    }

    pub fn clamp(self) -> Self {
        Self(self.0.clamp(Self::min().0, Self::max().0))
    }

    pub fn is_valid(self) -> bool {
        self >= Self::min() && self <= Self::max()
    }
}

impl From<u8> for RatingScore {
    fn from(from: u8) -> Self {
        Self(from)
    }
}

impl From<RatingScore> for u8 {
    fn from(from: RatingScore) -> Self {
        from.0
    }
}

#[rustfmt::skip]
#[derive(Debug, Clone, PartialEq)]
pub struct Rating {
    pub id         : u64,
    pub entity_key : EntityKey,
    pub user       : UserName,
    pub score      : RatingScore,
    pub created_at : TimestampMs,
}
