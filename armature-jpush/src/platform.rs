//! Device platform selection.

use serde::ser::{SerializeSeq, Serializer};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Device platform a push can target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    /// Android device.
    Android,
    /// iOS device.
    Ios,
}

impl Platform {
    /// Every platform the gateway knows about.
    pub const ALL: [Platform; 2] = [Platform::Android, Platform::Ios];

    /// Wire name of the platform.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Android => "android",
            Self::Ios => "ios",
        }
    }
}

/// Platforms a send targets.
///
/// `All` is equivalent to the full set of known platforms.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlatformSet {
    /// Every platform.
    All,
    /// An explicit selection.
    Only(BTreeSet<Platform>),
}

impl PlatformSet {
    /// Every platform.
    pub fn all() -> Self {
        Self::All
    }

    /// Android only.
    pub fn android() -> Self {
        Self::of([Platform::Android])
    }

    /// iOS only.
    pub fn ios() -> Self {
        Self::of([Platform::Ios])
    }

    /// Android and iOS.
    pub fn android_and_ios() -> Self {
        Self::of([Platform::Android, Platform::Ios])
    }

    /// An explicit selection. May be empty; the payload builder rejects that.
    pub fn of(platforms: impl IntoIterator<Item = Platform>) -> Self {
        Self::Only(platforms.into_iter().collect())
    }

    /// Check if the set targets the given platform.
    pub fn contains(&self, platform: Platform) -> bool {
        match self {
            Self::All => true,
            Self::Only(set) => set.contains(&platform),
        }
    }

    /// Check if the set selects nothing.
    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Only(set) if set.is_empty())
    }

    /// Iterate the targeted platforms.
    pub fn platforms(&self) -> Vec<Platform> {
        Platform::ALL
            .into_iter()
            .filter(|p| self.contains(*p))
            .collect()
    }
}

impl Default for PlatformSet {
    fn default() -> Self {
        Self::All
    }
}

impl Serialize for PlatformSet {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            Self::All => serializer.serialize_str("all"),
            Self::Only(set) => {
                let mut seq = serializer.serialize_seq(Some(set.len()))?;
                for platform in set {
                    seq.serialize_element(platform.as_str())?;
                }
                seq.end()
            }
        }
    }
}
