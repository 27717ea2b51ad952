// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Token claims payload.
//!
//! Claims are a plain string-keyed mapping. Two keys carry meaning for this
//! crate: `exp` (expiry) and the configured subject key (`user_id` by
//! default). Everything else is application-defined and passed through.

use std::collections::BTreeMap;

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Reserved key holding the expiry time.
pub const EXP_CLAIM: &str = "exp";

/// Default key holding the subject (user) identifier.
pub const DEFAULT_SUBJECT_CLAIM: &str = "user_id";

/// A single claim value.
///
/// `Timestamp` is the in-memory form of a point in time; on the wire it is
/// always an integer number of seconds since the Unix epoch. Floats, arrays
/// and objects are carried as raw JSON.
#[derive(Debug, Clone, PartialEq)]
pub enum ClaimValue {
    Null,
    Bool(bool),
    Integer(i64),
    String(String),
    Timestamp(DateTime<Utc>),
    Json(serde_json::Value),
}

impl ClaimValue {
    pub fn is_null(&self) -> bool {
        matches!(self, ClaimValue::Null)
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            ClaimValue::Integer(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            ClaimValue::String(s) => Some(s),
            _ => None,
        }
    }

    /// Structured timestamp, if this value is one.
    ///
    /// Integer epochs are not converted here; see
    /// [`normalize_exp`](super::expiry::normalize_exp).
    pub fn as_timestamp(&self) -> Option<DateTime<Utc>> {
        match self {
            ClaimValue::Timestamp(t) => Some(*t),
            _ => None,
        }
    }
}

impl From<serde_json::Value> for ClaimValue {
    fn from(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => ClaimValue::Null,
            serde_json::Value::Bool(b) => ClaimValue::Bool(b),
            serde_json::Value::Number(n) => match n.as_i64() {
                Some(i) => ClaimValue::Integer(i),
                None => ClaimValue::Json(serde_json::Value::Number(n)),
            },
            serde_json::Value::String(s) => ClaimValue::String(s),
            other => ClaimValue::Json(other),
        }
    }
}

impl From<bool> for ClaimValue {
    fn from(value: bool) -> Self {
        ClaimValue::Bool(value)
    }
}

impl From<i64> for ClaimValue {
    fn from(value: i64) -> Self {
        ClaimValue::Integer(value)
    }
}

impl From<i32> for ClaimValue {
    fn from(value: i32) -> Self {
        ClaimValue::Integer(value.into())
    }
}

impl From<u32> for ClaimValue {
    fn from(value: u32) -> Self {
        ClaimValue::Integer(value.into())
    }
}

impl From<&str> for ClaimValue {
    fn from(value: &str) -> Self {
        ClaimValue::String(value.to_string())
    }
}

impl From<String> for ClaimValue {
    fn from(value: String) -> Self {
        ClaimValue::String(value)
    }
}

impl From<DateTime<Utc>> for ClaimValue {
    fn from(value: DateTime<Utc>) -> Self {
        ClaimValue::Timestamp(value)
    }
}

impl From<SubjectId> for ClaimValue {
    fn from(value: SubjectId) -> Self {
        match value {
            SubjectId::Integer(i) => ClaimValue::Integer(i),
            SubjectId::String(s) => ClaimValue::String(s),
        }
    }
}

impl Serialize for ClaimValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            ClaimValue::Null => serializer.serialize_none(),
            ClaimValue::Bool(b) => serializer.serialize_bool(*b),
            ClaimValue::Integer(i) => serializer.serialize_i64(*i),
            ClaimValue::String(s) => serializer.serialize_str(s),
            ClaimValue::Timestamp(t) => serializer.serialize_i64(t.timestamp()),
            ClaimValue::Json(v) => v.serialize(serializer),
        }
    }
}

impl<'de> Deserialize<'de> for ClaimValue {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        serde_json::Value::deserialize(deserializer).map(ClaimValue::from)
    }
}

/// Claims carried by a token.
///
/// Lookups distinguish an absent key (`None`) from a key holding null
/// (`Some(&ClaimValue::Null)`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Claims(BTreeMap<String, ClaimValue>);

impl Claims {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<ClaimValue>) -> Self {
        self.set(key, value);
        self
    }

    pub fn get(&self, key: &str) -> Option<&ClaimValue> {
        self.0.get(key)
    }

    /// Insert or replace a claim, returning the previous value.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<ClaimValue>) -> Option<ClaimValue> {
        self.0.insert(key.into(), value.into())
    }

    pub fn has(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn remove(&mut self, key: &str) -> Option<ClaimValue> {
        self.0.remove(key)
    }

    pub fn as_map(&self) -> &BTreeMap<String, ClaimValue> {
        &self.0
    }

    pub fn into_map(self) -> BTreeMap<String, ClaimValue> {
        self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &ClaimValue)> {
        self.0.iter()
    }

    /// Expiry as a structured timestamp.
    ///
    /// Accepts either form `exp` may be stored in; returns `None` when the
    /// claim is absent or holds something that is not a point in time.
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        match self.get(EXP_CLAIM)? {
            ClaimValue::Timestamp(t) => Some(*t),
            ClaimValue::Integer(secs) => Utc.timestamp_opt(*secs, 0).single(),
            _ => None,
        }
    }

    /// Subject identifier stored under `key`.
    ///
    /// `None` when the key is absent. A present value that cannot identify a
    /// user (null, bool, ...) yields `Some(None)`.
    pub fn subject(&self, key: &str) -> Option<Option<SubjectId>> {
        self.get(key).map(SubjectId::from_claim)
    }
}

impl<K: Into<String>, V: Into<ClaimValue>> FromIterator<(K, V)> for Claims {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

/// Identifier of the user a token was issued for.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SubjectId {
    Integer(i64),
    String(String),
}

impl SubjectId {
    fn from_claim(value: &ClaimValue) -> Option<Self> {
        match value {
            ClaimValue::Integer(i) => Some(SubjectId::Integer(*i)),
            ClaimValue::String(s) => Some(SubjectId::String(s.clone())),
            _ => None,
        }
    }
}

impl From<i64> for SubjectId {
    fn from(value: i64) -> Self {
        SubjectId::Integer(value)
    }
}

impl From<&str> for SubjectId {
    fn from(value: &str) -> Self {
        SubjectId::String(value.to_string())
    }
}

impl From<String> for SubjectId {
    fn from(value: String) -> Self {
        SubjectId::String(value)
    }
}

impl std::fmt::Display for SubjectId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SubjectId::Integer(i) => write!(f, "{i}"),
            SubjectId::String(s) => f.write_str(s),
        }
    }
}
