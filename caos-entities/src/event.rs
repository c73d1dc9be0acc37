use crate::{time::*, user::*};

/// Append-only audit record of an editorial action.
#[rustfmt::skip]
#[derive(Debug, Clone, PartialEq)]
pub struct EventLogEntry {
    pub id        : u64,
    pub user      : Option<UserName>,
    pub action    : String,
    pub target_id : Option<String>,
    pub details   : String,
    pub at        : TimestampMs,
}

impl EventLogEntry {
    pub fn new(
        user: Option<UserName>,
        action: impl Into<String>,
        target_id: Option<String>,
        details: impl Into<String>,
    ) -> Self {
        Self {
            id: 0,
            user,
            action: action.into(),
            target_id,
            details: details.into(),
            at: TimestampMs::now(),
        }
    }
}
