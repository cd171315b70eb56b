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
use std::time::Duration;

use async_trait::async_trait;
use dashmap::DashMap;
use futures::future::join_all;
use parking_lot::RwLock;
use tracing::{instrument, trace, warn};

use crate::channel::DirectChannel;
use crate::common::{ChannelRef, HandlerRef};
use crate::message::{Envelope, FlowError};
use crate::traits::{
    ChannelResolver, MessageChannel, MessageHandler, PollableChannel, SubscribableChannel,
    Subscription,
};

/// A name-indexed directory wiring inbound and outbound endpoints
/// together.
///
/// Each name owns a registry-internal shared channel. Binding an inbound
/// channel bridges the shared channel to it; binding an outbound channel
/// bridges the outbound channel into the shared one. Registering both
/// under one name therefore forms a bridge: whatever is sent on the
/// outbound side reaches the inbound side's subscribers. Taps observe the
/// shared channel: every message flowing through it is copied to each tap
/// before dispatch.
///
/// The registry is also a [`ChannelResolver`], resolving bound names to
/// their shared channels for external publishers.
#[derive(Debug, Default)]
pub struct ChannelRegistry {
    entries: DashMap<String, BindingEntry>,
}

#[derive(Debug)]
struct BindingEntry {
    shared: Arc<BindingChannel>,
    inbound: Option<ChannelRef>,
    outbound: Option<ChannelRef>,
    outbound_bridge: Option<Subscription>,
}

impl BindingEntry {
    fn new(name: &str) -> Self {
        Self {
            shared: Arc::new(BindingChannel::new(name)),
            inbound: None,
            outbound: None,
            outbound_bridge: None,
        }
    }
}

impl ChannelRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `channel` as the inbound endpoint for `name`: messages
    /// sent to the shared channel published under `name` are forwarded to
    /// `channel`. At most one inbound binding per name.
    #[instrument(skip(self, channel))]
    pub fn inbound(&self, name: &str, channel: ChannelRef) -> Result<(), FlowError> {
        let mut entry = self
            .entries
            .entry(name.to_string())
            .or_insert_with(|| BindingEntry::new(name));
        if entry.inbound.is_some() {
            return Err(FlowError::argument(format!(
                "an inbound channel is already bound under '{name}'"
            )));
        }
        trace!("binding inbound channel");
        entry
            .shared
            .subscribe(Arc::new(BridgeHandler::new(channel.clone())));
        entry.inbound = Some(channel);
        Ok(())
    }

    /// Registers `channel` as the outbound endpoint for `name`: messages
    /// the application sends on `channel` are forwarded to the shared
    /// channel published under `name`. The channel must be subscribable.
    /// At most one outbound binding per name.
    #[instrument(skip(self, channel))]
    pub fn outbound(&self, name: &str, channel: ChannelRef) -> Result<(), FlowError> {
        let mut entry = self
            .entries
            .entry(name.to_string())
            .or_insert_with(|| BindingEntry::new(name));
        if entry.outbound.is_some() {
            return Err(FlowError::argument(format!(
                "an outbound channel is already bound under '{name}'"
            )));
        }
        let bridge: ChannelRef = entry.shared.clone();
        let subscription = {
            let subscribable = channel.as_subscribable().ok_or_else(|| {
                FlowError::capability(format!(
                    "outbound binding for '{name}' requires a subscribable channel"
                ))
            })?;
            subscribable.subscribe(Arc::new(BridgeHandler::new(bridge)))
        };
        trace!("binding outbound channel");
        entry.outbound = Some(channel);
        entry.outbound_bridge = Some(subscription);
        Ok(())
    }

    /// Attaches `tap_channel` as an observer of `name`'s inbound binding:
    /// every message delivered to the inbound endpoint is also delivered
    /// to the tap. Fails when `name` has no inbound binding.
    #[instrument(skip(self, tap_channel))]
    pub fn tap(&self, name: &str, tap_channel: ChannelRef) -> Result<(), FlowError> {
        let entry = self
            .entries
            .get(name)
            .ok_or_else(|| FlowError::argument(format!("no channel bound under '{name}'")))?;
        if entry.inbound.is_none() {
            return Err(FlowError::argument(format!(
                "taps require an inbound binding, but '{name}' has none"
            )));
        }
        entry.shared.add_tap(tap_channel);
        Ok(())
    }

    /// Removes every binding under `name`, detaching bridges and closing
    /// the pollable channels that were bound. Returns `false` when the
    /// name is unknown.
    #[instrument(skip(self))]
    pub fn unregister(&self, name: &str) -> bool {
        let Some((_, entry)) = self.entries.remove(name) else {
            return false;
        };
        if let (Some(outbound), Some(subscription)) = (&entry.outbound, &entry.outbound_bridge) {
            if let Some(subscribable) = outbound.as_subscribable() {
                subscribable.unsubscribe(subscription);
            }
        }
        for channel in entry.inbound.iter().chain(entry.outbound.iter()) {
            if let Some(pollable) = channel.as_pollable() {
                pollable.close();
            }
        }
        true
    }

    /// Releases every binding.
    pub fn shutdown(&self) {
        let names: Vec<String> = self.entries.iter().map(|e| e.key().clone()).collect();
        for name in names {
            self.unregister(&name);
        }
    }

    /// Looks up the shared channel published under `name`.
    pub fn lookup(&self, name: &str) -> Option<ChannelRef> {
        self.entries
            .get(name)
            .map(|entry| entry.shared.clone() as ChannelRef)
    }
}

impl ChannelResolver for ChannelRegistry {
    fn resolve(&self, name: &str) -> Result<ChannelRef, FlowError> {
        self.lookup(name).ok_or_else(|| FlowError::resolution(name))
    }
}

/// The registry-internal shared channel behind each binding name: a direct
/// channel plus the tap list. Taps receive a copy of every message before
/// the main dispatch; tap failures are logged and never affect delivery.
#[derive(Debug)]
struct BindingChannel {
    inner: DirectChannel,
    taps: RwLock<Vec<ChannelRef>>,
}

impl BindingChannel {
    fn new(name: &str) -> Self {
        Self {
            inner: DirectChannel::new(name),
            taps: RwLock::new(Vec::new()),
        }
    }

    fn add_tap(&self, tap: ChannelRef) {
        trace!(channel = self.inner.name(), tap = tap.name(), "attaching tap");
        self.taps.write().push(tap);
    }
}

#[async_trait]
impl MessageChannel for BindingChannel {
    fn name(&self) -> &str {
        self.inner.name()
    }

    async fn send_timeout(
        &self,
        envelope: Envelope,
        timeout: Option<Duration>,
    ) -> Result<bool, FlowError> {
        let taps: Vec<ChannelRef> = self.taps.read().clone();
        if !taps.is_empty() {
            let sends = taps.iter().map(|tap| tap.send(envelope.clone()));
            for (tap, result) in taps.iter().zip(join_all(sends).await) {
                match result {
                    Ok(true) => {}
                    Ok(false) => warn!(tap = tap.name(), "tap did not accept message"),
                    Err(error) => warn!(tap = tap.name(), %error, "tap delivery failed"),
                }
            }
        }
        self.inner.send_timeout(envelope, timeout).await
    }

    fn as_subscribable(&self) -> Option<&dyn SubscribableChannel> {
        Some(self)
    }
}

impl SubscribableChannel for BindingChannel {
    fn subscribe(&self, handler: HandlerRef) -> Subscription {
        self.inner.subscribe(handler)
    }

    fn unsubscribe(&self, subscription: &Subscription) -> bool {
        self.inner.unsubscribe(subscription)
    }
}

/// Forwards everything it handles to a target channel. Used to wire a
/// binding's shared channel to the channels bound under it.
#[derive(Debug)]
struct BridgeHandler {
    target: ChannelRef,
}

impl BridgeHandler {
    fn new(target: ChannelRef) -> Self {
        Self { target }
    }
}

#[async_trait]
impl MessageHandler for BridgeHandler {
    async fn handle(&self, envelope: Envelope) -> Result<(), FlowError> {
        if self.target.send(envelope).await? {
            Ok(())
        } else {
            Err(FlowError::delivery(format!(
                "bridge target '{}' rejected the message",
                self.target.name()
            )))
        }
    }
}
