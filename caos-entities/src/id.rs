use std::{borrow::Borrow, fmt, str::FromStr};

use uuid::Uuid;

/// Portable public identifier with a string representation.
///
/// Used for stable external links; never encodes hierarchy information.
#[derive(Default, Debug, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct PublicId(String);

impl PublicId {
    pub fn new() -> Self {
        Uuid::new_v4().into()
    }

    pub fn is_valid(&self) -> bool {
        !self.0.is_empty()
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl AsRef<String> for PublicId {
    fn as_ref(&self) -> &String {
        &self.0
    }
}

impl AsRef<str> for PublicId {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl From<String> for PublicId {
    fn from(from: String) -> Self {
        Self(from)
    }
}

impl From<&str> for PublicId {
    fn from(from: &str) -> Self {
        from.to_owned().into()
    }
}

impl From<Uuid> for PublicId {
    fn from(from: Uuid) -> Self {
        from.as_simple().to_string().into()
    }
}

impl From<PublicId> for String {
    fn from(from: PublicId) -> Self {
        from.0
    }
}

impl FromStr for PublicId {
    type Err = ();
    fn from_str(s: &str) -> Result<PublicId, Self::Err> {
        Ok(s.into())
    }
}

impl Borrow<str> for PublicId {
    fn borrow(&self) -> &str {
        self.as_ref()
    }
}

impl fmt::Display for PublicId {
    fn fmt(&self, f: &mut fmt::Formatter) -> Result<(), fmt::Error> {
        f.write_str(self.as_ref())
    }
}
