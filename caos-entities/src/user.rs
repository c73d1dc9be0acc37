use std::{borrow::Borrow, fmt, str::FromStr};

use num_derive::{FromPrimitive, ToPrimitive};
use num_traits::*;
use strum::{EnumIter, EnumString};
use thiserror::Error;

/// Account names that belong to the engine itself and must never be deleted.
///
/// `Xico` is the AI/system account, `Alone` the superadmin.
pub const PROTECTED_USERS: [&str; 2] = ["Xico", "Alone"];

#[derive(Default, Debug, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct UserName(String);

impl UserName {
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    pub fn is_protected(&self) -> bool {
        PROTECTED_USERS.contains(&self.0.as_str())
    }
}

impl AsRef<str> for UserName {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl Borrow<str> for UserName {
    fn borrow(&self) -> &str {
        self.as_ref()
    }
}

impl From<String> for UserName {
    fn from(from: String) -> Self {
        Self(from)
    }
}

impl From<&str> for UserName {
    fn from(from: &str) -> Self {
        from.to_owned().into()
    }
}

impl From<UserName> for String {
    fn from(from: UserName) -> Self {
        from.0
    }
}

impl FromStr for UserName {
    type Err = ();
    fn from_str(s: &str) -> Result<UserName, Self::Err> {
        Ok(s.into())
    }
}

impl fmt::Display for UserName {
    fn fmt(&self, f: &mut fmt::Formatter) -> Result<(), fmt::Error> {
        f.write_str(self.as_ref())
    }
}

pub type RankPrimitive = i16;

#[rustfmt::skip]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, FromPrimitive, ToPrimitive, EnumIter, EnumString)]
#[strum(ascii_case_insensitive)]
pub enum Rank {
    Explorer   = 0,
    Subadmin   = 1,
    Admin      = 2,
    Superadmin = 3,
}

impl Default for Rank {
    fn default() -> Rank {
        Rank::Explorer
    }
}

#[derive(Debug, Error)]
#[error("Invalid rank primitive: {0}")]
pub struct InvalidRankPrimitive(RankPrimitive);

impl TryFrom<RankPrimitive> for Rank {
    type Error = InvalidRankPrimitive;
    fn try_from(from: RankPrimitive) -> Result<Self, Self::Error> {
        Self::from_i16(from).ok_or(InvalidRankPrimitive(from))
    }
}

impl From<Rank> for RankPrimitive {
    fn from(from: Rank) -> Self {
        from.to_i16().unwrap_or_default()
    }
}

/// A user account together with its editorial profile.
///
/// `bosses` holds the admins this user collaborates for; the inverse
/// relation (collaborators a.k.a. minions) is resolved by the store.
#[rustfmt::skip]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub name       : UserName,
    pub rank       : Rank,
    pub superuser  : bool,
    pub avatar_ref : Option<String>,
    pub bosses     : Vec<UserName>,
    pub is_active  : bool,
}

impl User {
    pub fn new(name: impl Into<UserName>, rank: Rank) -> Self {
        Self {
            name: name.into(),
            rank,
            superuser: false,
            avatar_ref: None,
            bosses: Vec::new(),
            is_active: true,
        }
    }

    /// Global authority: the explicit superuser flag or the top rank.
    pub fn is_global_admin(&self) -> bool {
        self.superuser || self.rank == Rank::Superadmin
    }

    pub fn is_protected(&self) -> bool {
        self.name.is_protected()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rank_order() {
        assert!(Rank::Explorer < Rank::Subadmin);
        assert!(Rank::Subadmin < Rank::Admin);
        assert!(Rank::Admin < Rank::Superadmin);
    }

    #[test]
    fn rank_parses_case_insensitively() {
        assert_eq!("SUBADMIN".parse::<Rank>().unwrap(), Rank::Subadmin);
        assert_eq!("admin".parse::<Rank>().unwrap(), Rank::Admin);
    }

    #[test]
    fn protected_accounts() {
        assert!(UserName::from("Xico").is_protected());
        assert!(UserName::from("Alone").is_protected());
        assert!(!UserName::from("roberto").is_protected());
    }
}
