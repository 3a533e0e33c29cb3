//! Activity records and the descriptor used to classify them.

use std::fmt;

use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};

use crate::security::SaveType;

/// Name under which content security activities are registered and stored.
pub const CONTENT_SECURITY_ACTIVITY: &str = "ContentSecurity";

/// One (code, label) pair of an activity type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionType {
    /// Numeric action code stored on each record.
    pub code: i32,
    /// Label shown when decoding a stored record.
    pub name: String,
}

impl ActionType {
    /// Create a new action type.
    pub fn new(code: i32, name: impl Into<String>) -> Self {
        Self {
            code,
            name: name.into(),
        }
    }
}

/// Named classification a repository uses to decode stored records.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivityType {
    /// Registry key.
    pub name: String,
    /// Known action codes.
    pub actions: Vec<ActionType>,
}

impl ActivityType {
    /// Create a new descriptor.
    pub fn new(name: impl Into<String>, actions: impl IntoIterator<Item = ActionType>) -> Self {
        Self {
            name: name.into(),
            actions: actions.into_iter().collect(),
        }
    }

    /// Find the action with the given code.
    pub fn action(&self, code: i32) -> Option<&ActionType> {
        self.actions.iter().find(|a| a.code == code)
    }
}

/// Identifier assigned by an activity repository.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ActivityId(pub i64);

impl fmt::Display for ActivityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Insertion-ordered string mapping with unique keys.
///
/// Consumers render entries in insertion order, so the order is part of the
/// contract. Inserting an existing key replaces its value in place.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ActivityData {
    entries: Vec<(String, String)>,
}

impl ActivityData {
    /// Create an empty mapping.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a value. Returns the previous value for the key.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) -> Option<String> {
        let key = key.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some((_, existing)) => Some(std::mem::replace(existing, value)),
            None => {
                self.entries.push((key, value));
                None
            }
        }
    }

    /// Value for `key`.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Whether `key` is present.
    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// Keys in insertion order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    /// Entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the mapping is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for ActivityData {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut data = Self::new();
        for (k, v) in iter {
            data.insert(k, v);
        }
        data
    }
}

impl Serialize for ActivityData {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (k, v) in &self.entries {
            map.serialize_entry(k, v)?;
        }
        map.end()
    }
}

/// The unit of audit storage: an action code plus ordered details.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ActivityRecord {
    /// Activity type name the record is classified under.
    pub activity_type: String,
    /// Save type of the originating change. Stored as its numeric code.
    #[serde(serialize_with = "serialize_action_code")]
    pub action: SaveType,
    /// Ordered details.
    pub data: ActivityData,
}

impl ActivityRecord {
    /// Content security record for the given save type.
    pub fn content_security(action: SaveType, data: ActivityData) -> Self {
        Self {
            activity_type: CONTENT_SECURITY_ACTIVITY.to_string(),
            action,
            data,
        }
    }

    /// Numeric action code, as registered on the activity type.
    pub fn action_code(&self) -> i32 {
        self.action.code()
    }
}

fn serialize_action_code<S: Serializer>(action: &SaveType, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_i32(action.code())
}
