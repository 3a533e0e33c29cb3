//! Access-control change events raised by the content host.
//!
//! These mirror what the host hands to its change subscribers: the content
//! that was touched, how the save was performed ([`SaveType`]) and the
//! resulting permission entries.

use std::fmt;
use std::ops::BitOr;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::ParseError;

/// How an access-control save was performed.
///
/// The numeric codes are the host's enumeration values and double as the
/// action codes of stored activities.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SaveType {
    /// No explicit save semantics.
    None,
    /// Entries replaced on the item.
    Replace,
    /// Entries modified on the item.
    Modify,
    /// Entries replaced on the item and its descendants.
    RecursiveReplace,
    /// Entries modified on the item and its descendants.
    RecursiveModify,
    /// Child permissions replaced.
    ReplaceChildPermissions,
    /// Item switched to read-protected mode.
    ReadProtected,
}

impl SaveType {
    /// Every member, in code order.
    pub const ALL: [SaveType; 7] = [
        SaveType::None,
        SaveType::Replace,
        SaveType::Modify,
        SaveType::RecursiveReplace,
        SaveType::RecursiveModify,
        SaveType::ReplaceChildPermissions,
        SaveType::ReadProtected,
    ];

    /// Host enumeration value.
    pub const fn code(self) -> i32 {
        match self {
            Self::None => 0,
            Self::Replace => 1,
            Self::Modify => 2,
            Self::RecursiveReplace => 4,
            Self::RecursiveModify => 8,
            Self::ReplaceChildPermissions => 16,
            Self::ReadProtected => 32,
        }
    }

    /// Symbolic member name.
    pub const fn name(self) -> &'static str {
        match self {
            Self::None => "None",
            Self::Replace => "Replace",
            Self::Modify => "Modify",
            Self::RecursiveReplace => "RecursiveReplace",
            Self::RecursiveModify => "RecursiveModify",
            Self::ReplaceChildPermissions => "ReplaceChildPermissions",
            Self::ReadProtected => "ReadProtected",
        }
    }

    /// Look up a member by its host enumeration value.
    pub fn from_code(code: i32) -> Option<Self> {
        Self::ALL.into_iter().find(|s| s.code() == code)
    }
}

impl fmt::Display for SaveType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for SaveType {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        Self::ALL
            .into_iter()
            .find(|t| t.name() == s)
            .ok_or_else(|| ParseError::SaveType(s.to_string()))
    }
}

/// Kind of principal a permission entry applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntityType {
    /// A single user.
    User,
    /// A role or group.
    Role,
    /// A visitor group (when usable for protecting content).
    VisitorGroup,
}

impl fmt::Display for EntityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::User => write!(f, "User"),
            Self::Role => write!(f, "Role"),
            Self::VisitorGroup => write!(f, "VisitorGroup"),
        }
    }
}

/// Access level granted by a permission entry.
///
/// A flag set. Renders the way the host does: a named value by its name,
/// anything else as the set flags joined by `", "`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct AccessLevel(u32);

impl AccessLevel {
    /// No access at all.
    pub const NO_ACCESS: Self = Self(0);
    /// Read.
    pub const READ: Self = Self(1);
    /// Create children.
    pub const CREATE: Self = Self(2);
    /// Edit.
    pub const EDIT: Self = Self(4);
    /// Delete.
    pub const DELETE: Self = Self(8);
    /// Publish.
    pub const PUBLISH: Self = Self(16);
    /// Change access rights.
    pub const ADMINISTER: Self = Self(32);
    /// Every flag above.
    pub const FULL_ACCESS: Self = Self(63);

    const FLAGS: [(u32, &'static str); 6] = [
        (1, "Read"),
        (2, "Create"),
        (4, "Edit"),
        (8, "Delete"),
        (16, "Publish"),
        (32, "Administer"),
    ];

    /// Build from a raw host value. Unknown bits are kept.
    pub const fn from_bits(bits: u32) -> Self {
        Self(bits)
    }

    /// Raw host value.
    pub const fn bits(self) -> u32 {
        self.0
    }

    /// Whether every flag of `other` is set.
    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    fn parse_name(name: &str) -> Option<u32> {
        match name {
            "NoAccess" => Some(0),
            "FullAccess" => Some(63),
            _ => Self::FLAGS
                .iter()
                .find(|(_, n)| *n == name)
                .map(|(bits, _)| *bits),
        }
    }
}

impl BitOr for AccessLevel {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl fmt::Display for AccessLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            0 => return f.write_str("NoAccess"),
            63 => return f.write_str("FullAccess"),
            _ => {}
        }

        let known = Self::FLAGS.iter().fold(0, |acc, (bits, _)| acc | bits);
        if self.0 & !known != 0 {
            // not representable by names
            return write!(f, "{}", self.0);
        }

        let names: Vec<&str> = Self::FLAGS
            .iter()
            .filter(|(bits, _)| self.0 & bits != 0)
            .map(|(_, name)| *name)
            .collect();
        f.write_str(&names.join(", "))
    }
}

impl FromStr for AccessLevel {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if let Ok(bits) = s.parse::<u32>() {
            return Ok(Self(bits));
        }

        let mut bits = 0;
        for part in s.split(',') {
            let part = part.trim();
            bits |= Self::parse_name(part).ok_or_else(|| ParseError::AccessLevel(s.to_string()))?;
        }
        Ok(Self(bits))
    }
}

impl Serialize for AccessLevel {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for AccessLevel {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        match NumberOrText::deserialize(deserializer)? {
            NumberOrText::Number(bits) => u32::try_from(bits)
                .map(Self)
                .map_err(serde::de::Error::custom),
            NumberOrText::Text(text) => text.parse().map_err(serde::de::Error::custom),
        }
    }
}

/// Reference to a content item, optionally pinned to a version.
///
/// Changes made from edit mode carry the version; changes made from the
/// admin access-rights screen do not.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ContentId {
    id: u64,
    work_id: Option<u64>,
}

impl ContentId {
    /// Reference without version information.
    pub const fn new(id: u64) -> Self {
        Self { id, work_id: None }
    }

    /// Reference to a specific version.
    pub const fn with_version(id: u64, work_id: u64) -> Self {
        Self {
            id,
            work_id: Some(work_id),
        }
    }

    /// Content item id.
    pub const fn id(&self) -> u64 {
        self.id
    }

    /// Version id, if any.
    pub const fn work_id(&self) -> Option<u64> {
        self.work_id
    }

    /// Same item with the version dropped.
    pub const fn without_version(&self) -> Self {
        Self::new(self.id)
    }
}

impl fmt::Display for ContentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.work_id {
            Some(work_id) => write!(f, "{}_{}", self.id, work_id),
            None => write!(f, "{}", self.id),
        }
    }
}

impl FromStr for ContentId {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ParseError::ContentId(s.to_string());
        let s = s.trim();
        match s.split_once('_') {
            Some((id, work_id)) => Ok(Self::with_version(
                id.parse().map_err(|_| invalid())?,
                work_id.parse().map_err(|_| invalid())?,
            )),
            None => Ok(Self::new(s.parse().map_err(|_| invalid())?)),
        }
    }
}

impl Serialize for ContentId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for ContentId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        match NumberOrText::deserialize(deserializer)? {
            NumberOrText::Number(id) => Ok(Self::new(id)),
            NumberOrText::Text(text) => text.parse().map_err(serde::de::Error::custom),
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum NumberOrText {
    Number(u64),
    Text(String),
}

/// One (principal, access level) pair of a content item's access list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PermissionEntry {
    /// Kind of principal.
    pub entity_type: EntityType,
    /// Principal name.
    pub name: String,
    /// Granted access.
    pub access: AccessLevel,
}

impl PermissionEntry {
    /// Create a new entry.
    pub fn new(entity_type: EntityType, name: impl Into<String>, access: AccessLevel) -> Self {
        Self {
            entity_type,
            name: name.into(),
            access,
        }
    }
}

/// Notification raised when access-control entries on a content item change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeEvent {
    /// The content item whose access list changed.
    pub content: ContentId,

    /// How the save was performed.
    pub save_type: SaveType,

    /// Resulting entries. The host may deliver no list at all.
    #[serde(default)]
    pub entries: Option<Vec<PermissionEntry>>,

    /// Creator as reported by the host. Observed to be empty in practice and
    /// never read by the audit pipeline.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub creator: Option<String>,
}

impl ChangeEvent {
    /// Event without a permission list.
    pub fn new(content: ContentId, save_type: SaveType) -> Self {
        Self {
            content,
            save_type,
            entries: None,
            creator: None,
        }
    }

    /// Attach the permission list.
    pub fn with_entries(mut self, entries: Vec<PermissionEntry>) -> Self {
        self.entries = Some(entries);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_save_type_codes_are_unique() {
        let mut codes: Vec<i32> = SaveType::ALL.iter().map(|s| s.code()).collect();
        codes.dedup();
        assert_eq!(codes.len(), SaveType::ALL.len());
        assert_eq!(SaveType::from_code(32), Some(SaveType::ReadProtected));
        assert_eq!(SaveType::from_code(3), None);
    }

    #[test]
    fn test_save_type_from_str() {
        assert_eq!("Modify".parse::<SaveType>(), Ok(SaveType::Modify));
        assert!("modify".parse::<SaveType>().is_err());
    }

    #[test]
    fn test_access_level_display() {
        assert_eq!(AccessLevel::READ.to_string(), "Read");
        assert_eq!(AccessLevel::NO_ACCESS.to_string(), "NoAccess");
        assert_eq!(AccessLevel::FULL_ACCESS.to_string(), "FullAccess");
        assert_eq!((AccessLevel::READ | AccessLevel::EDIT).to_string(), "Read, Edit");
        assert_eq!(AccessLevel::from_bits(128).to_string(), "128");
    }

    #[test]
    fn test_access_level_parse() {
        assert_eq!("Read".parse::<AccessLevel>(), Ok(AccessLevel::READ));
        assert_eq!(
            "Read, Publish".parse::<AccessLevel>(),
            Ok(AccessLevel::READ | AccessLevel::PUBLISH)
        );
        assert_eq!("63".parse::<AccessLevel>(), Ok(AccessLevel::FULL_ACCESS));
        assert!("Read, Fly".parse::<AccessLevel>().is_err());
        assert!((AccessLevel::FULL_ACCESS).contains(AccessLevel::ADMINISTER));
    }

    #[test]
    fn test_content_id_display_and_parse() {
        assert_eq!(ContentId::new(42).to_string(), "42");
        assert_eq!(ContentId::with_version(42, 7).to_string(), "42_7");
        assert_eq!("42_7".parse::<ContentId>(), Ok(ContentId::with_version(42, 7)));
        assert_eq!(
            ContentId::with_version(42, 7).without_version(),
            ContentId::new(42)
        );
        assert!("abc".parse::<ContentId>().is_err());
    }

    #[test]
    fn test_change_event_from_json() {
        let json = r#"{
            "content": 42,
            "save_type": "ReadProtected",
            "entries": [{"entity_type": "User", "name": "bob", "access": "Read"}]
        }"#;
        let event: ChangeEvent = serde_json::from_str(json).unwrap();
        assert_eq!(event.content, ContentId::new(42));
        assert_eq!(event.save_type, SaveType::ReadProtected);
        assert_eq!(
            event.entries,
            Some(vec![PermissionEntry::new(EntityType::User, "bob", AccessLevel::READ)])
        );
        assert_eq!(event.creator, None);
    }

    #[test]
    fn test_change_event_without_entries() {
        let event: ChangeEvent =
            serde_json::from_str(r#"{"content": "7_3", "save_type": "Modify"}"#).unwrap();
        assert_eq!(event.content, ContentId::with_version(7, 3));
        assert!(event.entries.is_none());
    }
}
