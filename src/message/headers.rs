/*
 * Copyright (c) 2024. Govcraft
 *
 * Licensed under either of
 *   * Apache License, Version 2.0 (the "License");
 *     you may not use this file except in compliance with the License.
 *     You may obtain a copy of the License at http://www.apache.org/licenses/LICENSE-2.0
 *   * MIT license: http://opensource.org/licenses/MIT
 *
 * Unless required by applicable law or agreed to in writing, software
 * distributed under the License is distributed on an "AS IS" BASIS,
 * WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
 * See the applicable License for the specific language governing permissions and
 * limitations under that License.
 */

//! The envelope header map, its typed values, and the reserved header names.

use std::collections::HashMap;

use uuid::Uuid;

/// Reserved header: the unique identifier stamped on every envelope.
pub const ID: &str = "id";

/// Reserved header: epoch-millisecond creation time stamped on every envelope.
pub const TIMESTAMP: &str = "timestamp";

/// Reserved header: the channel name replies should be sent to.
pub const REPLY_CHANNEL: &str = "replyChannel";

/// Reserved header: the channel name errors should be sent to.
pub const ERROR_CHANNEL: &str = "errorChannel";

/// Header consulted by the priority channel's default comparator.
pub const PRIORITY: &str = "priority";

/// Header correlating an envelope with the message it was derived from.
pub const CORRELATION_ID: &str = "correlationId";

/// Header carrying an envelope's 1-based position within a sequence.
pub const SEQUENCE_NUMBER: &str = "sequenceNumber";

/// Header carrying the total size of the sequence an envelope belongs to.
pub const SEQUENCE_SIZE: &str = "sequenceSize";

/// Internal tiebreak header stamped by the priority channel while an
/// envelope sits in its heap. Never visible to consumers.
pub(crate) const PRIORITY_SEQUENCE: &str = "__priorityChannelSequence__";

/// Transient header names. These identify a single envelope in flight and
/// are never mapped across a transport boundary.
pub const TRANSIENT_HEADER_NAMES: [&str; 4] = [ID, TIMESTAMP, REPLY_CHANNEL, ERROR_CHANNEL];

/// A typed header value.
///
/// The source of the header decides the variant; consumers use the typed
/// accessors and get `None` on a variant mismatch rather than a panic.
#[derive(Debug, Clone, PartialEq)]
pub enum HeaderValue {
    /// A UTF-8 string value.
    String(String),
    /// A signed integer value (also used for timestamps and sequence data).
    Int(i64),
    /// A boolean value.
    Bool(bool),
    /// An opaque byte value.
    Bytes(Vec<u8>),
    /// A UUID value (used for `id` and `correlationId`).
    Uuid(Uuid),
}

impl HeaderValue {
    /// Returns the string value, if this is a `String`.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            HeaderValue::String(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the integer value, if this is an `Int`.
    pub fn as_int(&self) -> Option<i64> {
        match self {
            HeaderValue::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// Returns the boolean value, if this is a `Bool`.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            HeaderValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Returns the byte value, if this is `Bytes`.
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            HeaderValue::Bytes(b) => Some(b),
            _ => None,
        }
    }

    /// Returns the UUID value, if this is a `Uuid`.
    pub fn as_uuid(&self) -> Option<Uuid> {
        match self {
            HeaderValue::Uuid(u) => Some(*u),
            _ => None,
        }
    }

    /// Renders the value as a string where a faithful textual form exists.
    ///
    /// `Bytes` has no canonical textual form and yields `None`; the router
    /// uses this to decide whether a key value can act as a channel name.
    pub fn coerce_string(&self) -> Option<String> {
        match self {
            HeaderValue::String(s) => Some(s.clone()),
            HeaderValue::Int(i) => Some(i.to_string()),
            HeaderValue::Bool(b) => Some(b.to_string()),
            HeaderValue::Uuid(u) => Some(u.to_string()),
            HeaderValue::Bytes(_) => None,
        }
    }
}

impl From<&str> for HeaderValue {
    fn from(value: &str) -> Self {
        HeaderValue::String(value.to_string())
    }
}

impl From<String> for HeaderValue {
    fn from(value: String) -> Self {
        HeaderValue::String(value)
    }
}

impl From<i64> for HeaderValue {
    fn from(value: i64) -> Self {
        HeaderValue::Int(value)
    }
}

impl From<i32> for HeaderValue {
    fn from(value: i32) -> Self {
        HeaderValue::Int(i64::from(value))
    }
}

impl From<u32> for HeaderValue {
    fn from(value: u32) -> Self {
        HeaderValue::Int(i64::from(value))
    }
}

impl From<bool> for HeaderValue {
    fn from(value: bool) -> Self {
        HeaderValue::Bool(value)
    }
}

impl From<Vec<u8>> for HeaderValue {
    fn from(value: Vec<u8>) -> Self {
        HeaderValue::Bytes(value)
    }
}

impl From<Uuid> for HeaderValue {
    fn from(value: Uuid) -> Self {
        HeaderValue::Uuid(value)
    }
}

/// A string-keyed map of [`HeaderValue`]s.
///
/// Standalone `HeaderMap`s (for example the output of a header mapper) are
/// plain mutable maps. Once a map is sealed inside an [`Envelope`] it is
/// shared behind an `Arc` and can no longer change.
///
/// [`Envelope`]: crate::message::Envelope
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HeaderMap {
    inner: HashMap<String, HeaderValue>,
}

impl HeaderMap {
    /// Creates an empty header map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the value stored under `name`.
    pub fn get(&self, name: &str) -> Option<&HeaderValue> {
        self.inner.get(name)
    }

    /// Returns `true` when a value is stored under `name`.
    pub fn contains(&self, name: &str) -> bool {
        self.inner.contains_key(name)
    }

    /// Number of headers in the map.
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    /// Returns `true` when the map holds no headers.
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// Iterates over `(name, value)` pairs in unspecified order.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &HeaderValue)> {
        self.inner.iter()
    }

    /// Inserts a header, replacing any previous value under the same name.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<HeaderValue>) {
        self.inner.insert(name.into(), value.into());
    }

    /// Removes the header stored under `name`, returning its value.
    pub fn remove(&mut self, name: &str) -> Option<HeaderValue> {
        self.inner.remove(name)
    }

    /// The envelope id, when present.
    pub fn id(&self) -> Option<Uuid> {
        self.get(ID).and_then(HeaderValue::as_uuid)
    }

    /// The envelope creation time in epoch milliseconds, when present.
    pub fn timestamp(&self) -> Option<i64> {
        self.get(TIMESTAMP).and_then(HeaderValue::as_int)
    }

    /// The `priority` header, when present and numeric.
    pub fn priority(&self) -> Option<i64> {
        self.get(PRIORITY).and_then(HeaderValue::as_int)
    }

    /// The `correlationId` header, when present.
    pub fn correlation_id(&self) -> Option<Uuid> {
        self.get(CORRELATION_ID).and_then(HeaderValue::as_uuid)
    }

    /// The `sequenceNumber` header, when present and numeric.
    pub fn sequence_number(&self) -> Option<i64> {
        self.get(SEQUENCE_NUMBER).and_then(HeaderValue::as_int)
    }

    /// The `sequenceSize` header, when present and numeric.
    pub fn sequence_size(&self) -> Option<i64> {
        self.get(SEQUENCE_SIZE).and_then(HeaderValue::as_int)
    }

    /// The `replyChannel` header, when present.
    pub fn reply_channel(&self) -> Option<&str> {
        self.get(REPLY_CHANNEL).and_then(HeaderValue::as_str)
    }

    /// The `errorChannel` header, when present.
    pub fn error_channel(&self) -> Option<&str> {
        self.get(ERROR_CHANNEL).and_then(HeaderValue::as_str)
    }
}

impl FromIterator<(String, HeaderValue)> for HeaderMap {
    fn from_iter<I: IntoIterator<Item = (String, HeaderValue)>>(iter: I) -> Self {
        Self {
            inner: iter.into_iter().collect(),
        }
    }
}
