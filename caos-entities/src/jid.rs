use std::{borrow::Borrow, fmt, str::FromStr};

use thiserror::Error;

/// Maximum nesting depth of the cosmological hierarchy.
pub const MAX_LEVEL: u8 = 16;

/// Hierarchical J-ID: a zero-padded decimal positional code where every
/// 2 characters denote one hierarchy level.
///
/// `"0101"` is level 2 and its parent is `"01"`. A `00` pair acts as a
/// structural bridge ("ghost") on non-geographic levels.
#[derive(Debug, Clone, Default, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct JId(String);

#[derive(Debug, Clone, Eq, PartialEq, Error)]
pub enum JIdParseError {
    #[error("Empty J-ID")]
    Empty,
    #[error("J-ID length must be even: {0}")]
    OddLength(usize),
    #[error("J-ID must only contain decimal digits")]
    NonDigit,
    #[error("J-ID nesting too deep (level {0})")]
    TooDeep(u8),
}

/// First-level cosmological branch, derived from the leading segments.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum Branch {
    Physical,
    Dimensional,
}

/// Level-16 split between living beings and inanimate artifacts.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum IndividualKind {
    Creature,
    Object,
}

impl JId {
    pub fn parse(s: &str) -> Result<Self, JIdParseError> {
        if s.is_empty() {
            return Err(JIdParseError::Empty);
        }
        if s.len() % 2 != 0 {
            return Err(JIdParseError::OddLength(s.len()));
        }
        if !s.bytes().all(|b| b.is_ascii_digit()) {
            return Err(JIdParseError::NonDigit);
        }
        let level = (s.len() / 2) as u8;
        if level > MAX_LEVEL {
            return Err(JIdParseError::TooDeep(level));
        }
        Ok(Self(s.to_owned()))
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    pub fn level(&self) -> u8 {
        (self.0.len() / 2) as u8
    }

    pub fn parent(&self) -> Option<JId> {
        if self.0.len() <= 2 {
            return None;
        }
        Some(Self(self.0[..self.0.len() - 2].to_owned()))
    }

    /// All ancestors ordered from the farthest (level 1) to the direct parent.
    pub fn ancestors(&self) -> Vec<JId> {
        let mut up = Vec::with_capacity(self.level() as usize);
        let mut len = 2;
        while len < self.0.len() {
            up.push(Self(self.0[..len].to_owned()));
            len += 2;
        }
        up
    }

    /// The 2-char segment that encodes the given level, if deep enough.
    pub fn segment(&self, level: u8) -> Option<&str> {
        if level == 0 || level > self.level() {
            return None;
        }
        let start = (level as usize - 1) * 2;
        Some(&self.0[start..start + 2])
    }

    pub fn branch(&self) -> Branch {
        if self.0.starts_with("0102") || self.0.starts_with("0105") {
            Branch::Dimensional
        } else {
            Branch::Physical
        }
    }

    /// True if the id carries a `00` fragment anywhere in its lineage.
    pub fn contains_ghost(&self) -> bool {
        self.0.contains("00")
    }

    /// True for pure structural bridges that hold no data of their own.
    pub fn is_pure_bridge(&self) -> bool {
        self.0.ends_with("00")
    }

    /// The trunk an id collapses to on the home index: the prefix before the
    /// first `00` fragment. Only meaningful below the geographic levels; the
    /// caller decides whether to collapse at all.
    pub fn trunk(&self) -> &str {
        match self.0.find("00") {
            Some(pos) => &self.0[..pos],
            None => self.0.as_str(),
        }
    }

    /// Appends a direct child segment (2 decimal digits).
    pub fn child(&self, segment: &str) -> Result<JId, JIdParseError> {
        Self::parse(&format!("{}{segment}", self.0))
    }

    /// Builds a descendant at `target_level`, inserting `00` bridge pairs for
    /// every skipped intermediate level.
    pub fn compose(&self, target_level: u8, final_segment: &str) -> Result<JId, JIdParseError> {
        let base_level = self.level();
        if target_level <= base_level || target_level > MAX_LEVEL {
            return Err(JIdParseError::TooDeep(target_level));
        }
        let bridges = "00".repeat((target_level - base_level - 1) as usize);
        Self::parse(&format!("{}{bridges}{final_segment}", self.0))
    }

    /// Next free sibling segment below this id, given the existing children.
    /// Children are numbered sequentially from `01`.
    pub fn next_child_segment(existing_children: &[JId]) -> String {
        let max = existing_children
            .iter()
            .filter_map(|c| c.0.get(c.0.len() - 2..))
            .filter_map(|seg| seg.parse::<u32>().ok())
            .max()
            .unwrap_or(0);
        format!("{:02}", max + 1)
    }

    /// Splits level-16 individuals into creatures and objects by the level-13
    /// segment: values 90..=99 are reserved for objects. Ids too short to
    /// carry a level-13 segment classify as creatures.
    pub fn individual_kind(&self) -> IndividualKind {
        match self.segment(13).and_then(|seg| seg.parse::<u32>().ok()) {
            Some(cat) if cat >= 90 => IndividualKind::Object,
            _ => IndividualKind::Creature,
        }
    }

    /// Human-readable label of the hierarchy position.
    pub fn hierarchy_label(&self) -> &'static str {
        let level = self.level();
        if level == 16 && self.individual_kind() == IndividualKind::Object {
            return "OBJETO / ARTEFACTO";
        }
        level_label(self.branch(), level).unwrap_or("NIVEL")
    }

    /// Levels an author may create children at from this node, with their
    /// labels. Skipped levels get bridged with `00` pairs on composition.
    pub fn available_child_levels(&self) -> Vec<(u8, &'static str)> {
        let branch = self.branch();
        (self.level() + 1..=MAX_LEVEL)
            .filter_map(|level| level_label(branch, level).map(|label| (level, label)))
            .collect()
    }
}

fn level_label(branch: Branch, level: u8) -> Option<&'static str> {
    match level {
        1 => Some("CAOS PRIME"),
        2 => Some("ABISMO / GESTACIÓN"),
        _ => match branch {
            Branch::Physical => match level {
                3 => Some("UNIVERSO"),
                4 => Some("GALAXIA"),
                5 => Some("SISTEMA"),
                6 => Some("PLANETA"),
                7 => Some("CONTINENTE"),
                8 => Some("PAÍS"),
                9 => Some("CIUDAD"),
                10 => Some("DISTRITO"),
                11 => Some("LUGAR"),
                13 => Some("RAZA/ESPECIE"),
                16 => Some("PERSONAJE"),
                _ => None,
            },
            Branch::Dimensional => match level {
                3 => Some("PLANO MAYOR"),
                4 => Some("DOMINIO"),
                5 => Some("ESTRUCTURA"),
                6 => Some("CAPA / CÍRCULO"),
                7 => Some("SECTOR DIMENSIONAL"),
                8 => Some("ÁREA"),
                9 => Some("ASENTAMIENTO"),
                13 => Some("ESPECIE DEMONIACA"),
                16 => Some("ENTIDAD"),
                _ => None,
            },
        },
    }
}

impl AsRef<str> for JId {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl Borrow<str> for JId {
    fn borrow(&self) -> &str {
        self.as_ref()
    }
}

impl FromStr for JId {
    type Err = JIdParseError;
    fn from_str(s: &str) -> Result<JId, Self::Err> {
        Self::parse(s)
    }
}

impl From<JId> for String {
    fn from(from: JId) -> Self {
        from.0
    }
}

impl fmt::Display for JId {
    fn fmt(&self, f: &mut fmt::Formatter) -> Result<(), fmt::Error> {
        f.write_str(self.as_ref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn jid(s: &str) -> JId {
        JId::parse(s).unwrap()
    }

    #[test]
    fn parse_rejects_malformed_ids() {
        assert_eq!(JId::parse(""), Err(JIdParseError::Empty));
        assert_eq!(JId::parse("010"), Err(JIdParseError::OddLength(3)));
        assert_eq!(JId::parse("01ab"), Err(JIdParseError::NonDigit));
        assert!(JId::parse(&"01".repeat(17)).is_err());
    }

    #[test]
    fn level_and_parent() {
        assert_eq!(jid("01").level(), 1);
        assert_eq!(jid("0101").level(), 2);
        assert_eq!(jid("010203").parent(), Some(jid("0102")));
        assert_eq!(jid("01").parent(), None);
    }

    #[test]
    fn ancestors_are_ordered_farthest_first() {
        assert_eq!(
            jid("01020304").ancestors(),
            vec![jid("01"), jid("0102"), jid("010203")]
        );
        assert!(jid("01").ancestors().is_empty());
    }

    #[test]
    fn branch_detection() {
        assert_eq!(jid("010101").branch(), Branch::Physical);
        assert_eq!(jid("010201").branch(), Branch::Dimensional);
        assert_eq!(jid("010502").branch(), Branch::Dimensional);
        assert_eq!(jid("0101").branch(), Branch::Physical);
    }

    #[test]
    fn ghost_and_trunk() {
        assert!(jid("01010001").contains_ghost());
        assert!(!jid("010101").contains_ghost());
        assert!(jid("010100").is_pure_bridge());
        assert_eq!(jid("01010001").trunk(), "0101");
        assert_eq!(jid("010101").trunk(), "010101");
    }

    #[test]
    fn compose_inserts_bridges() {
        // Level 3 -> level 6 skips two levels.
        assert_eq!(
            jid("010101").compose(6, "05").unwrap(),
            jid("010101000005")
        );
        // Direct child needs no bridge.
        assert_eq!(jid("0101").compose(3, "02").unwrap(), jid("010102"));
        assert!(jid("0101").compose(2, "01").is_err());
    }

    #[test]
    fn next_child_segment_is_sequential() {
        let children = vec![jid("010101"), jid("010103")];
        assert_eq!(JId::next_child_segment(&children), "04");
        assert_eq!(JId::next_child_segment(&[]), "01");
    }

    #[test]
    fn available_child_levels_follow_the_branch() {
        let universe = jid("010101");
        let levels = universe.available_child_levels();
        assert_eq!(levels.first(), Some(&(4, "GALAXIA")));
        assert!(levels.contains(&(6, "PLANETA")));
        // Level 12 has no label and is skipped.
        assert!(!levels.iter().any(|(lvl, _)| *lvl == 12));

        let layer = jid("010201");
        assert!(layer.available_child_levels().contains(&(6, "CAPA / CÍRCULO")));
    }

    #[test]
    fn individual_kind_cutoff() {
        // 26 chars: the level-13 segment is at chars 24..26.
        let creature = jid(&format!("{}{}", "01".repeat(12), "45"));
        let object = jid(&format!("{}{}", "01".repeat(12), "92"));
        assert_eq!(creature.individual_kind(), IndividualKind::Creature);
        assert_eq!(object.individual_kind(), IndividualKind::Object);
        // Short ids cannot carry the segment and default to creature.
        assert_eq!(jid("0101").individual_kind(), IndividualKind::Creature);
    }
}
