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

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::RwLock;
use tracing::{instrument, trace, warn};

use crate::common::HandlerRef;
use crate::message::{Envelope, FlowError};
use crate::traits::{MessageChannel, SubscribableChannel, Subscription};

/// A subscribable channel that dispatches on the sending task.
///
/// Handlers are tried in subscription order until one accepts the envelope
/// without failure; a handler failure moves dispatch on to the next
/// subscriber. The send fails only when no subscriber accepts: with the
/// last handler error, or a delivery error when nobody is subscribed.
#[derive(Debug)]
pub struct DirectChannel {
    name: String,
    subscribers: RwLock<Vec<(Subscription, HandlerRef)>>,
    next_subscription: AtomicU64,
}

impl DirectChannel {
    /// Creates a direct channel named `name`.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            subscribers: RwLock::new(Vec::new()),
            next_subscription: AtomicU64::new(0),
        }
    }

    #[instrument(skip_all, fields(channel = %self.name))]
    async fn dispatch(&self, envelope: Envelope) -> Result<(), FlowError> {
        // Snapshot so concurrent (un)subscription cannot tear the iteration.
        let subscribers: Vec<HandlerRef> = self
            .subscribers
            .read()
            .iter()
            .map(|(_, handler)| handler.clone())
            .collect();

        if subscribers.is_empty() {
            return Err(FlowError::delivery(format!(
                "channel '{}' has no subscribers",
                self.name
            )));
        }

        let mut last_error = None;
        for handler in subscribers {
            match handler.handle(envelope.clone()).await {
                Ok(()) => {
                    trace!("handler accepted message");
                    return Ok(());
                }
                Err(error) => {
                    warn!(%error, "handler failed, trying next subscriber");
                    last_error = Some(error);
                }
            }
        }
        Err(last_error.unwrap_or_else(|| {
            FlowError::delivery(format!("all subscribers of '{}' failed", self.name))
        }))
    }
}

#[async_trait]
impl MessageChannel for DirectChannel {
    fn name(&self) -> &str {
        &self.name
    }

    async fn send_timeout(
        &self,
        envelope: Envelope,
        timeout: Option<Duration>,
    ) -> Result<bool, FlowError> {
        match timeout {
            None => self.dispatch(envelope).await.map(|_| true),
            Some(limit) => match tokio::time::timeout(limit, self.dispatch(envelope)).await {
                Ok(result) => result.map(|_| true),
                Err(_) => Ok(false),
            },
        }
    }

    fn as_subscribable(&self) -> Option<&dyn SubscribableChannel> {
        Some(self)
    }
}

impl SubscribableChannel for DirectChannel {
    fn subscribe(&self, handler: HandlerRef) -> Subscription {
        let subscription =
            Subscription::new(self.next_subscription.fetch_add(1, Ordering::Relaxed));
        trace!(channel = %self.name, subscription = subscription.id(), "adding subscriber");
        self.subscribers
            .write()
            .push((subscription.clone(), handler));
        subscription
    }

    fn unsubscribe(&self, subscription: &Subscription) -> bool {
        let mut subscribers = self.subscribers.write();
        let before = subscribers.len();
        subscribers.retain(|(registered, _)| registered != subscription);
        before != subscribers.len()
    }
}
