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

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use tracing::trace;
use uuid::Uuid;

use crate::message::headers::{self, HeaderMap, HeaderValue};
use crate::message::Envelope;
use crate::traits::Payload;

/// Builder for [`Envelope`]s.
///
/// Every call to [`finish`](Self::finish) produces a fresh envelope with a
/// newly generated `id` and `timestamp`; envelopes built earlier are
/// unaffected. Writes to the auto-stamped `id` and `timestamp` headers are
/// silently ignored.
#[derive(Debug)]
pub struct EnvelopeBuilder {
    payload: Arc<dyn Payload>,
    headers: HashMap<String, HeaderValue>,
}

impl EnvelopeBuilder {
    /// Starts a builder around `payload` with no headers.
    pub fn new(payload: impl Payload) -> Self {
        Self {
            payload: Arc::new(payload),
            headers: HashMap::new(),
        }
    }

    /// Starts a builder seeded from an existing envelope.
    ///
    /// The payload is reused by reference and all headers except `id` and
    /// `timestamp` are copied; those two are regenerated on
    /// [`finish`](Self::finish).
    pub fn derive(source: &Envelope) -> Self {
        let headers = source
            .headers()
            .iter()
            .filter(|(name, _)| name.as_str() != headers::ID && name.as_str() != headers::TIMESTAMP)
            .map(|(name, value)| (name.clone(), value.clone()))
            .collect();
        Self {
            payload: source.payload_arc(),
            headers,
        }
    }

    /// Sets a single header.
    pub fn header(mut self, name: impl Into<String>, value: impl Into<HeaderValue>) -> Self {
        let name = name.into();
        if is_read_only(&name) {
            trace!(header = %name, "ignoring write to an auto-stamped header");
            return self;
        }
        self.headers.insert(name, value.into());
        self
    }

    /// Sets every header in `entries`, replacing existing values.
    pub fn headers(mut self, entries: impl IntoIterator<Item = (String, HeaderValue)>) -> Self {
        for (name, value) in entries {
            if is_read_only(&name) {
                trace!(header = %name, "ignoring write to an auto-stamped header");
                continue;
            }
            self.headers.insert(name, value);
        }
        self
    }

    /// Sets every header in `entries` that is not already present.
    pub fn headers_if_absent(
        mut self,
        entries: impl IntoIterator<Item = (String, HeaderValue)>,
    ) -> Self {
        for (name, value) in entries {
            if is_read_only(&name) || self.headers.contains_key(&name) {
                continue;
            }
            self.headers.insert(name, value);
        }
        self
    }

    /// Removes a header, if present.
    pub fn remove_header(mut self, name: &str) -> Self {
        self.headers.remove(name);
        self
    }

    /// Stamps the sequence headers routers apply when fanning an envelope
    /// out to multiple destinations: `correlationId`, `sequenceNumber`
    /// (1-based), and `sequenceSize`.
    pub fn push_sequence_details(
        self,
        correlation_id: impl Into<HeaderValue>,
        sequence_number: i64,
        sequence_size: i64,
    ) -> Self {
        self.header(headers::CORRELATION_ID, correlation_id)
            .header(headers::SEQUENCE_NUMBER, sequence_number)
            .header(headers::SEQUENCE_SIZE, sequence_size)
    }

    /// Builds the envelope, stamping a fresh `id` and `timestamp`.
    pub fn finish(self) -> Envelope {
        let mut map: HeaderMap = self.headers.into_iter().collect();
        map.insert(headers::ID, HeaderValue::Uuid(Uuid::new_v4()));
        map.insert(headers::TIMESTAMP, HeaderValue::Int(now_millis()));
        Envelope::from_parts(self.payload, map)
    }
}

fn is_read_only(name: &str) -> bool {
    name == headers::ID || name == headers::TIMESTAMP
}

fn now_millis() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_millis() as i64)
        .unwrap_or_default()
}
