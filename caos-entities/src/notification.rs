use crate::{time::*, user::*};

/// In-app message enqueued for a user by the editorial pipeline.
#[rustfmt::skip]
#[derive(Debug, Clone, PartialEq)]
pub struct Notification {
    pub id         : u64,
    pub user       : UserName,
    pub title      : String,
    pub message    : String,
    pub url        : String,
    pub created_at : TimestampMs,
    pub read_at    : Option<TimestampMs>,
}

impl Notification {
    pub fn new(
        user: UserName,
        title: impl Into<String>,
        message: impl Into<String>,
        url: impl Into<String>,
    ) -> Self {
        Self {
            id: 0,
            user,
            title: title.into(),
            message: message.into(),
            url: url.into(),
            created_at: TimestampMs::now(),
            read_at: None,
        }
    }

    pub fn is_unread(&self) -> bool {
        self.read_at.is_none()
    }

    pub fn mark_read(&mut self) {
        if self.read_at.is_none() {
            self.read_at = Some(TimestampMs::now());
        }
    }
}
