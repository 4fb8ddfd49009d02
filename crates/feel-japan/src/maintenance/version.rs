use std::fmt;
use std::str::FromStr;

use super::ReleaseError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BumpKind {
    Major,
    Minor,
    #[default]
    Patch,
}

impl BumpKind {
    pub fn label(self) -> &'static str {
        match self {
            BumpKind::Major => "major",
            BumpKind::Minor => "minor",
            BumpKind::Patch => "patch",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "major" => Some(BumpKind::Major),
            "minor" => Some(BumpKind::Minor),
            "patch" => Some(BumpKind::Patch),
            _ => None,
        }
    }
}

impl fmt::Display for BumpKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// `major.minor.patch`; ordering compares the components left to right.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Version {
    pub major: u64,
    pub minor: u64,
    pub patch: u64,
}

impl Version {
    pub const fn new(major: u64, minor: u64, patch: u64) -> Self {
        Self {
            major,
            minor,
            patch,
        }
    }

    pub fn bump(self, kind: BumpKind) -> Self {
        match kind {
            BumpKind::Major => Self::new(self.major + 1, 0, 0),
            BumpKind::Minor => Self::new(self.major, self.minor + 1, 0),
            BumpKind::Patch => Self::new(self.major, self.minor, self.patch + 1),
        }
    }
}

impl FromStr for Version {
    type Err = ReleaseError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let invalid = || ReleaseError::InvalidVersion(raw.to_string());
        let mut parts = raw.trim().split('.');
        let mut next = || -> Result<u64, ReleaseError> {
            parts
                .next()
                .ok_or_else(invalid)?
                .parse()
                .map_err(|_| invalid())
        };

        let version = Self::new(next()?, next()?, next()?);
        if parts.next().is_some() {
            return Err(invalid());
        }
        Ok(version)
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}
