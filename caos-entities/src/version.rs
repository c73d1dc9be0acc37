pub type VersionNumberValue = u64;

/// Monotonic per-target version counter of the proposal stream.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct VersionNumber(VersionNumberValue);

impl VersionNumber {
    pub const fn initial() -> Self {
        Self(1)
    }

    pub fn is_initial(self) -> bool {
        self == Self::initial()
    }

    pub fn next(self) -> Self {
        Self(self.0.saturating_add(1))
    }
}

impl From<VersionNumber> for VersionNumberValue {
    fn from(from: VersionNumber) -> Self {
        from.0
    }
}

impl From<VersionNumberValue> for VersionNumber {
    fn from(from: VersionNumberValue) -> Self {
        Self(from)
    }
}

impl std::fmt::Display for VersionNumber {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> Result<(), std::fmt::Error> {
        write!(f, "v{}", self.0)
    }
}
