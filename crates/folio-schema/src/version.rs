use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("invalid version '{0}', expected X.Y.Z")]
pub struct VersionError(pub String);

/// A `major.minor.patch` triple of non-negative integers.
///
/// Ordering is componentwise and numeric, left to right, so `1.10.0` sorts
/// after `1.2.0`. Serializes as the dotted string.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(try_from = "String", into = "String")]
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
}

impl FromStr for Version {
    type Err = VersionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = [0u64; 3];
        let mut count = 0;
        for component in s.split('.') {
            if count == 3 || component.is_empty() || !component.bytes().all(|b| b.is_ascii_digit())
            {
                return Err(VersionError(s.to_owned()));
            }
            parts[count] = component
                .parse()
                .map_err(|_| VersionError(s.to_owned()))?;
            count += 1;
        }
        if count != 3 {
            return Err(VersionError(s.to_owned()));
        }
        Ok(Self::new(parts[0], parts[1], parts[2]))
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

impl TryFrom<String> for Version {
    type Error = VersionError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Version> for String {
    fn from(v: Version) -> Self {
        v.to_string()
    }
}

/// Compare two dotted version strings numerically.
pub fn compare_versions(a: &str, b: &str) -> Result<Ordering, VersionError> {
    Ok(a.parse::<Version>()?.cmp(&b.parse::<Version>()?))
}
