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

use std::fmt::Debug;
use std::time::Duration;

use async_trait::async_trait;

use crate::common::HandlerRef;
use crate::message::{Envelope, FlowError};

/// A named conduit that accepts envelopes.
///
/// Timeouts are the sole cancellation primitive: a send that cannot
/// complete within its timeout resolves to `Ok(false)` rather than an
/// error, as does a send on a closed channel. `Err` is reserved for
/// dispatch failures.
#[async_trait]
pub trait MessageChannel: Debug + Send + Sync {
    /// The channel's name, used for registry and resolver lookups.
    fn name(&self) -> &str;

    /// Sends `envelope`, waiting at most `timeout` for capacity or
    /// dispatch. `None` waits without bound.
    async fn send_timeout(
        &self,
        envelope: Envelope,
        timeout: Option<Duration>,
    ) -> Result<bool, FlowError>;

    /// Sends `envelope` with no time bound.
    async fn send(&self, envelope: Envelope) -> Result<bool, FlowError> {
        self.send_timeout(envelope, None).await
    }

    /// Narrows this channel to its subscribable capability, when supported.
    fn as_subscribable(&self) -> Option<&dyn SubscribableChannel> {
        None
    }

    /// Narrows this channel to its pollable capability, when supported.
    fn as_pollable(&self) -> Option<&dyn PollableChannel> {
        None
    }
}

/// A channel that dispatches synchronously to registered handlers.
pub trait SubscribableChannel: MessageChannel {
    /// Registers `handler`; dispatch considers handlers in subscription
    /// order.
    fn subscribe(&self, handler: HandlerRef) -> Subscription;

    /// Removes a previously registered handler. Returns `false` when the
    /// subscription is unknown.
    fn unsubscribe(&self, subscription: &Subscription) -> bool;
}

/// A channel producers deposit into and consumers poll from.
#[async_trait]
pub trait PollableChannel: MessageChannel {
    /// Receives the next envelope, waiting at most `timeout`. Returns
    /// `None` when the timeout expires or the channel is closed.
    async fn receive_timeout(&self, timeout: Option<Duration>) -> Option<Envelope>;

    /// Receives the next envelope with no time bound, or `None` once the
    /// channel is closed.
    async fn receive(&self) -> Option<Envelope> {
        self.receive_timeout(None).await
    }

    /// Closes the channel: pending and future receives return `None`,
    /// pending and future sends report `Ok(false)`.
    fn close(&self);
}

/// Token identifying a handler registration on a subscribable channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Subscription {
    id: u64,
}

impl Subscription {
    pub(crate) fn new(id: u64) -> Self {
        Self { id }
    }

    pub(crate) fn id(&self) -> u64 {
        self.id
    }
}
