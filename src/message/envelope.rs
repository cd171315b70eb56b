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

use std::sync::Arc;

use static_assertions::assert_impl_all;
use uuid::Uuid;

use crate::message::headers::{self, HeaderMap, HeaderValue};
use crate::traits::Payload;

/// An immutable message: an opaque payload plus a header map.
///
/// Envelopes are structurally shared. Cloning an envelope, or deriving a
/// modified copy through [`EnvelopeBuilder::derive`], reuses the payload by
/// reference; only the header map of a derived envelope is rebuilt. The
/// headers of a constructed envelope never change.
///
/// Every envelope carries a unique `id` and a creation `timestamp`,
/// stamped by the builder.
///
/// [`EnvelopeBuilder::derive`]: crate::message::EnvelopeBuilder::derive
#[derive(Debug, Clone)]
pub struct Envelope {
    payload: Arc<dyn Payload>,
    headers: Arc<HeaderMap>,
}

impl Envelope {
    /// Creates an envelope around `payload` with only the auto-stamped
    /// `id` and `timestamp` headers.
    pub fn new(payload: impl Payload) -> Self {
        crate::message::EnvelopeBuilder::new(payload).finish()
    }

    pub(crate) fn from_parts(payload: Arc<dyn Payload>, headers: HeaderMap) -> Self {
        Self {
            payload,
            headers: Arc::new(headers),
        }
    }

    /// The payload carried by this envelope.
    pub fn payload(&self) -> &dyn Payload {
        self.payload.as_ref()
    }

    /// Downcasts the payload to a concrete type.
    pub fn payload_as<T: 'static>(&self) -> Option<&T> {
        self.payload.as_any().downcast_ref::<T>()
    }

    pub(crate) fn payload_arc(&self) -> Arc<dyn Payload> {
        self.payload.clone()
    }

    /// The envelope's headers.
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// The envelope's unique id.
    pub fn id(&self) -> Uuid {
        self.headers.id().unwrap_or_default()
    }

    /// The envelope's creation time in epoch milliseconds.
    pub fn timestamp(&self) -> i64 {
        self.headers.timestamp().unwrap_or_default()
    }

    /// Returns a sibling envelope with the priority-channel sequence header
    /// stamped. Id, timestamp, and payload are preserved; only the priority
    /// channel calls this, just before an envelope enters its heap.
    pub(crate) fn with_priority_sequence(&self, sequence: u64) -> Envelope {
        let mut headers = (*self.headers).clone();
        headers.insert(headers::PRIORITY_SEQUENCE, HeaderValue::Int(sequence as i64));
        Envelope {
            payload: self.payload.clone(),
            headers: Arc::new(headers),
        }
    }

    /// Reverses [`with_priority_sequence`](Self::with_priority_sequence),
    /// applied just after an envelope leaves the heap so the tiebreak header
    /// is never observed by consumers.
    pub(crate) fn without_priority_sequence(&self) -> Envelope {
        if !self.headers.contains(headers::PRIORITY_SEQUENCE) {
            return self.clone();
        }
        let mut headers = (*self.headers).clone();
        headers.remove(headers::PRIORITY_SEQUENCE);
        Envelope {
            payload: self.payload.clone(),
            headers: Arc::new(headers),
        }
    }
}

// Envelopes cross task boundaries freely.
assert_impl_all!(Envelope: Send, Sync);
