//! Audience selection: who receives a push.
//!
//! An [`Audience`] is either the `all` wildcard or a set of target groups.
//! Values inside a group are combined with union semantics (except
//! [`AudienceType::TagAnd`], which requires every value), and the groups
//! themselves are intersected.
//!
//! ```
//! use armature_jpush::{Audience, AudienceTarget};
//!
//! // tag in {t1, t2} AND alias in {a1, a2}
//! let audience = Audience::builder()
//!     .target(AudienceTarget::tag(["t1", "t2"]))
//!     .target(AudienceTarget::alias(["a1", "a2"]))
//!     .build()
//!     .unwrap();
//! assert!(!audience.is_all());
//! ```

use serde::ser::{SerializeMap, Serializer};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::{PushError, Result};

/// Kind of an audience target group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AudienceType {
    /// Devices carrying any of the tags.
    Tag,
    /// Devices carrying every one of the tags.
    TagAnd,
    /// Devices registered under any of the aliases.
    Alias,
    /// Devices with any of the registration ids.
    RegistrationId,
    /// Devices in any of the segments.
    Segment,
}

impl AudienceType {
    /// Wire name of the group.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Tag => "tag",
            Self::TagAnd => "tag_and",
            Self::Alias => "alias",
            Self::RegistrationId => "registration_id",
            Self::Segment => "segment",
        }
    }
}

/// One selection criterion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudienceTarget {
    kind: AudienceType,
    values: Vec<String>,
}

impl AudienceTarget {
    /// Create a target of the given kind.
    pub fn new<I, S>(kind: AudienceType, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            kind,
            values: values.into_iter().map(Into::into).collect(),
        }
    }

    /// Union of tags.
    pub fn tag<I, S>(tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(AudienceType::Tag, tags)
    }

    /// Intersection of tags.
    pub fn tag_and<I, S>(tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(AudienceType::TagAnd, tags)
    }

    /// Union of aliases.
    pub fn alias<I, S>(aliases: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(AudienceType::Alias, aliases)
    }

    /// Union of registration ids.
    pub fn registration_id<I, S>(ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(AudienceType::RegistrationId, ids)
    }

    /// Union of segments.
    pub fn segment<I, S>(segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(AudienceType::Segment, segments)
    }

    /// Kind of the target.
    pub fn kind(&self) -> AudienceType {
        self.kind
    }

    /// Values in insertion order.
    pub fn values(&self) -> &[String] {
        &self.values
    }
}

/// Recipients of a push.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Audience {
    /// Every device. Exclusive with any other target.
    All,
    /// Intersection of target groups.
    Targets(BTreeMap<AudienceType, Vec<String>>),
}

impl Audience {
    /// Every device.
    pub fn all() -> Self {
        Self::All
    }

    /// Devices carrying any of the tags.
    pub fn tag<I, S>(tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::single(AudienceTarget::tag(tags))
    }

    /// Devices carrying all of the tags.
    pub fn tag_and<I, S>(tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::single(AudienceTarget::tag_and(tags))
    }

    /// Devices registered under any of the aliases.
    pub fn alias<I, S>(aliases: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::single(AudienceTarget::alias(aliases))
    }

    /// Devices with any of the registration ids.
    pub fn registration_id<I, S>(ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::single(AudienceTarget::registration_id(ids))
    }

    /// Devices in any of the segments.
    pub fn segment<I, S>(segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::single(AudienceTarget::segment(segments))
    }

    /// Create a builder for multi-group audiences.
    pub fn builder() -> AudienceBuilder {
        AudienceBuilder::default()
    }

    fn single(target: AudienceTarget) -> Self {
        let mut groups = BTreeMap::new();
        groups.insert(target.kind, target.values);
        Self::Targets(groups)
    }

    /// Check if this is the `all` wildcard.
    pub fn is_all(&self) -> bool {
        matches!(self, Self::All)
    }

    /// Values of one target group.
    pub fn group(&self, kind: AudienceType) -> Option<&[String]> {
        match self {
            Self::All => None,
            Self::Targets(groups) => groups.get(&kind).map(Vec::as_slice),
        }
    }

    /// Check that the audience selects something.
    ///
    /// `Targets` needs at least one group, and every group needs at least one
    /// value.
    pub fn validate(&self) -> Result<()> {
        let Self::Targets(groups) = self else {
            return Ok(());
        };

        if groups.is_empty() {
            return Err(PushError::InvalidAudience(
                "no audience target is set".to_string(),
            ));
        }
        if let Some((kind, _)) = groups.iter().find(|(_, values)| values.is_empty()) {
            return Err(PushError::InvalidAudience(format!(
                "'{}' target has no values",
                kind.as_str()
            )));
        }
        Ok(())
    }

    /// Evaluate the audience against a device.
    ///
    /// An empty group matches no device.
    pub fn matches(&self, device: &Device) -> bool {
        let Self::Targets(groups) = self else {
            return true;
        };

        if groups.is_empty() {
            return false;
        }

        groups.iter().all(|(kind, values)| {
            if values.is_empty() {
                return false;
            }
            match kind {
                AudienceType::Tag => values.iter().any(|t| device.tags.contains(t)),
                AudienceType::TagAnd => values.iter().all(|t| device.tags.contains(t)),
                AudienceType::Alias => device
                    .alias
                    .as_ref()
                    .is_some_and(|alias| values.contains(alias)),
                AudienceType::RegistrationId => device
                    .registration_id
                    .as_ref()
                    .is_some_and(|id| values.contains(id)),
                AudienceType::Segment => values.iter().any(|s| device.segments.contains(s)),
            }
        })
    }
}

impl Serialize for Audience {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            Self::All => serializer.serialize_str("all"),
            Self::Targets(groups) => {
                let mut map = serializer.serialize_map(Some(groups.len()))?;
                for (kind, values) in groups {
                    map.serialize_entry(kind.as_str(), values)?;
                }
                map.end()
            }
        }
    }
}

/// Builder composing several target groups.
#[derive(Debug, Clone, Default)]
pub struct AudienceBuilder {
    all: bool,
    targets: Vec<AudienceTarget>,
}

impl AudienceBuilder {
    /// Create a new builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Select every device.
    pub fn all(mut self) -> Self {
        self.all = true;
        self
    }

    /// Add a target group.
    pub fn target(mut self, target: AudienceTarget) -> Self {
        self.targets.push(target);
        self
    }

    /// Add several target groups.
    pub fn targets(mut self, targets: impl IntoIterator<Item = AudienceTarget>) -> Self {
        self.targets.extend(targets);
        self
    }

    /// Build the audience.
    ///
    /// Targets of the same kind are appended to one group.
    pub fn build(self) -> Result<Audience> {
        match (self.all, self.targets.is_empty()) {
            (true, true) => Ok(Audience::All),
            (true, false) => Err(PushError::InvalidAudience(
                "'all' cannot be combined with other audience targets".to_string(),
            )),
            (false, true) => Err(PushError::InvalidAudience(
                "no audience target is set".to_string(),
            )),
            (false, false) => {
                let mut groups: BTreeMap<AudienceType, Vec<String>> = BTreeMap::new();
                for target in self.targets {
                    groups.entry(target.kind).or_default().extend(target.values);
                }
                let audience = Audience::Targets(groups);
                audience.validate()?;
                Ok(audience)
            }
        }
    }
}

/// A device as seen by audience evaluation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Device {
    /// Registration id assigned by the gateway.
    pub registration_id: Option<String>,
    /// Alias bound to the device.
    pub alias: Option<String>,
    /// Tags bound to the device.
    pub tags: Vec<String>,
    /// Segments the device belongs to.
    pub segments: Vec<String>,
}

impl Device {
    /// Create an empty device.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the registration id.
    pub fn registration_id(mut self, id: impl Into<String>) -> Self {
        self.registration_id = Some(id.into());
        self
    }

    /// Set the alias.
    pub fn alias(mut self, alias: impl Into<String>) -> Self {
        self.alias = Some(alias.into());
        self
    }

    /// Add a tag.
    pub fn tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.push(tag.into());
        self
    }

    /// Add a segment.
    pub fn segment(mut self, segment: impl Into<String>) -> Self {
        self.segments.push(segment.into());
        self
    }
}
