use crate::{jid::*, metadata::*, time::*};

/// Named era of a world, used to key historical snapshots and to group
/// narratives and images. Identified by a per-world unique slug.
#[rustfmt::skip]
#[derive(Debug, Clone, PartialEq)]
pub struct TimelinePeriod {
    pub world       : JId,
    pub slug        : String,
    pub title       : String,
    pub description : String,
    pub metadata    : Metadata,
    pub order       : u32,
    pub is_current  : bool,
    pub is_active   : bool,
    pub created_at  : TimestampMs,
}

impl TimelinePeriod {
    pub fn soft_delete(&mut self) {
        self.is_active = false;
    }

    pub fn restore(&mut self) {
        self.is_active = true;
    }
}

/// ASCII slug of a period title: lowercased, alphanumeric runs joined by
/// single dashes.
pub fn slugify(title: &str) -> String {
    let mut slug = String::with_capacity(title.len());
    let mut pending_dash = false;
    for c in title.chars() {
        if c.is_ascii_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.push(c.to_ascii_lowercase());
        } else {
            pending_dash = true;
        }
    }
    slug
}
