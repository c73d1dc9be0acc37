use std::{fmt, str::FromStr};

use thiserror::Error;

use crate::{id::*, jid::*, time::*, user::*};

/// Content type letter of an N-ID.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NarrativeKind {
    Historia,
    Lore,
    Regla,
    Evento,
    Npc,
}

impl NarrativeKind {
    pub const fn letter(self) -> char {
        match self {
            Self::Historia => 'H',
            Self::Lore => 'L',
            Self::Regla => 'R',
            Self::Evento => 'E',
            Self::Npc => 'N',
        }
    }

    pub const fn from_letter(c: char) -> Option<Self> {
        match c {
            'H' => Some(Self::Historia),
            'L' => Some(Self::Lore),
            'R' => Some(Self::Regla),
            'E' => Some(Self::Evento),
            'N' => Some(Self::Npc),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Eq, PartialEq, Error)]
pub enum NIdParseError {
    #[error("N-ID must start with a hierarchical J-ID")]
    MissingJId,
    #[error("Unknown narrative type letter")]
    UnknownKind,
    #[error("N-ID sequence must be two digits")]
    BadSequence,
    #[error(transparent)]
    JId(#[from] JIdParseError),
}

/// Narrative identifier: the owning J-ID followed by a type letter, a
/// two-digit sequence and an optional chapter suffix, e.g. `0101L01` or
/// `0101H02C03`.
#[derive(Debug, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct NId(String);

impl NId {
    pub fn compose(
        jid: &JId,
        kind: NarrativeKind,
        number: u8,
        chapter: Option<u8>,
    ) -> Result<Self, NIdParseError> {
        if chapter.is_some() && !matches!(kind, NarrativeKind::Historia) {
            return Err(NIdParseError::UnknownKind);
        }
        let mut out = format!("{jid}{}{number:02}", kind.letter());
        if let Some(chapter) = chapter {
            out.push_str(&format!("C{chapter:02}"));
        }
        Ok(Self(out))
    }

    pub fn parse(s: &str) -> Result<Self, NIdParseError> {
        let digits = s.bytes().take_while(|b| b.is_ascii_digit()).count();
        if digits == 0 {
            return Err(NIdParseError::MissingJId);
        }
        JId::parse(&s[..digits])?;
        let suffix = &s[digits..];
        let mut chars = suffix.chars();
        let kind = chars
            .next()
            .and_then(NarrativeKind::from_letter)
            .ok_or(NIdParseError::UnknownKind)?;
        let seq: String = chars.by_ref().take(2).collect();
        if seq.len() != 2 || !seq.bytes().all(|b| b.is_ascii_digit()) {
            return Err(NIdParseError::BadSequence);
        }
        let rest: String = chars.collect();
        if !rest.is_empty() {
            let ok = matches!(kind, NarrativeKind::Historia)
                && rest.len() == 3
                && rest.starts_with('C')
                && rest[1..].bytes().all(|b| b.is_ascii_digit());
            if !ok {
                return Err(NIdParseError::BadSequence);
            }
        }
        Ok(Self(s.to_owned()))
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    /// The J-ID of the owning world.
    pub fn world_jid(&self) -> JId {
        let digits = self.0.bytes().take_while(|b| b.is_ascii_digit()).count();
        JId::parse(&self.0[..digits]).unwrap_or_else(|_| unreachable!("validated on parse"))
    }

    pub fn kind(&self) -> NarrativeKind {
        let digits = self.0.bytes().take_while(|b| b.is_ascii_digit()).count();
        self.0[digits..]
            .chars()
            .next()
            .and_then(NarrativeKind::from_letter)
            .unwrap_or(NarrativeKind::Lore)
    }
}

impl FromStr for NId {
    type Err = NIdParseError;
    fn from_str(s: &str) -> Result<NId, Self::Err> {
        Self::parse(s)
    }
}

impl From<NId> for String {
    fn from(from: NId) -> Self {
        from.0
    }
}

impl AsRef<str> for NId {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for NId {
    fn fmt(&self, f: &mut fmt::Formatter) -> Result<(), fmt::Error> {
        f.write_str(self.as_ref())
    }
}

/// Free-form textual content attached to a world, optionally keyed to a
/// timeline period.
#[rustfmt::skip]
#[derive(Debug, Clone, PartialEq)]
pub struct Narrative {
    pub nid             : NId,
    pub public_id       : PublicId,
    pub world           : JId,
    pub titulo          : String,
    pub contenido       : String,
    pub tipo            : NarrativeKind,
    pub timeline_period : Option<String>,
    pub created_by      : Option<UserName>,
    pub is_active       : bool,
    pub created_at      : TimestampMs,
}

impl Narrative {
    pub fn soft_delete(&mut self) {
        self.is_active = false;
    }

    pub fn restore(&mut self) {
        self.is_active = true;
    }
}
