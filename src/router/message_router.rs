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
use std::fmt::Debug;
use std::time::Duration;

use async_trait::async_trait;
use dashmap::DashMap;
use tracing::{debug, instrument, trace};

use crate::common::{ChannelRef, ResolverRef, CONFIG};
use crate::message::{Envelope, EnvelopeBuilder, FlowError, HeaderValue};
use crate::traits::MessageHandler;

/// One destination key produced by a routing strategy.
///
/// Keys come in several shapes: a channel instance, a channel name (which
/// may be a comma-delimited list), collections of either, nested key
/// collections, or an arbitrary header value that is coerced to a name
/// when it has a textual form.
#[derive(Debug, Clone)]
pub enum ChannelKey {
    /// A channel to use directly.
    Channel(ChannelRef),
    /// Several channels to use directly.
    Channels(Vec<ChannelRef>),
    /// A mapping key or channel name; commas separate multiple names.
    Name(String),
    /// Several mapping keys or channel names.
    Names(Vec<String>),
    /// A nested collection of keys.
    Keys(Vec<ChannelKey>),
    /// An arbitrary value, coerced to a name when it has a textual form.
    Value(HeaderValue),
}

impl From<&str> for ChannelKey {
    fn from(value: &str) -> Self {
        ChannelKey::Name(value.to_string())
    }
}

impl From<String> for ChannelKey {
    fn from(value: String) -> Self {
        ChannelKey::Name(value)
    }
}

impl From<ChannelRef> for ChannelKey {
    fn from(value: ChannelRef) -> Self {
        ChannelKey::Channel(value)
    }
}

/// Supplies a router's destination keys and resolution policy.
///
/// The default policy is unlimited destinations with unmapped string keys
/// treated as channel names. Specializations override the policy methods:
/// the payload-type strategy caps destinations at one and drops keys
/// absent from the mapping dictionary.
pub trait RouteStrategy: Debug + Send + Sync {
    /// Computes the destination keys for `envelope`.
    fn channel_keys(&self, envelope: &Envelope) -> Vec<ChannelKey>;

    /// Upper bound on resolved destinations, `None` for unlimited.
    fn max_destinations(&self) -> Option<usize> {
        None
    }

    /// Whether a string key missing from the mapping dictionary is used
    /// as a channel name directly. When `false`, unmapped keys are
    /// silently dropped.
    fn fallback_to_channel_name_lookup(&self) -> bool {
        true
    }
}

/// Router configuration, fixed at construction.
#[derive(Debug, Clone)]
pub struct RouterConfig {
    /// Initial key-to-channel-name mappings.
    pub channel_mappings: HashMap<String, String>,
    /// Prefix applied to each channel name prior to resolution.
    pub prefix: Option<String>,
    /// Suffix applied to each channel name prior to resolution.
    pub suffix: Option<String>,
    /// Destination used when no channel resolves and no send succeeds.
    pub default_output_channel: Option<ChannelRef>,
    /// Whether a name that fails to resolve is an error (`true`, the
    /// default) or silently dropped.
    pub resolution_required: bool,
    /// Whether per-destination send failures are logged and skipped
    /// instead of aborting the route. Default `false`.
    pub ignore_send_failures: bool,
    /// Whether to stamp `correlationId`/`sequenceNumber`/`sequenceSize`
    /// on each outgoing envelope. Default `false`.
    pub apply_sequence: bool,
    /// Per-destination send timeout; `None` waits without bound.
    pub send_timeout: Option<Duration>,
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self {
            channel_mappings: HashMap::new(),
            prefix: None,
            suffix: None,
            default_output_channel: None,
            resolution_required: true,
            ignore_send_failures: false,
            apply_sequence: false,
            send_timeout: CONFIG.default_send_timeout(),
        }
    }
}

/// A message handler that computes zero or more destination channels per
/// envelope and forwards to each.
///
/// Destination keys come from the [`RouteStrategy`]; string keys pass
/// through the mapping dictionary, get the configured affixes applied, and
/// resolve to channels through the [`ChannelResolver`]. When the whole
/// route completes without a successful send, the envelope falls through
/// to the default output channel, or the route fails with a delivery
/// error when none is configured.
///
/// [`ChannelResolver`]: crate::traits::ChannelResolver
#[derive(Debug)]
pub struct MessageRouter {
    strategy: Box<dyn RouteStrategy>,
    resolver: ResolverRef,
    channel_mappings: DashMap<String, String>,
    prefix: Option<String>,
    suffix: Option<String>,
    default_output_channel: Option<ChannelRef>,
    resolution_required: bool,
    ignore_send_failures: bool,
    apply_sequence: bool,
    send_timeout: Option<Duration>,
}

impl MessageRouter {
    /// Creates a router around `strategy`, resolving channel names through
    /// `resolver`.
    pub fn new(strategy: Box<dyn RouteStrategy>, resolver: ResolverRef, config: RouterConfig) -> Self {
        Self {
            strategy,
            resolver,
            channel_mappings: config.channel_mappings.into_iter().collect(),
            prefix: config.prefix,
            suffix: config.suffix,
            default_output_channel: config.default_output_channel,
            resolution_required: config.resolution_required,
            ignore_send_failures: config.ignore_send_failures,
            apply_sequence: config.apply_sequence,
            send_timeout: config.send_timeout,
        }
    }

    /// Adds or replaces a mapping from `key` to `channel_name`.
    pub fn set_channel_mapping(&self, key: impl Into<String>, channel_name: impl Into<String>) {
        self.channel_mappings.insert(key.into(), channel_name.into());
    }

    /// Removes the mapping for `key`, if present.
    pub fn remove_channel_mapping(&self, key: &str) {
        self.channel_mappings.remove(key);
    }

    /// Resolves the destination channels for `envelope`.
    #[instrument(skip_all)]
    fn determine_target_channels(&self, envelope: &Envelope) -> Result<Vec<ChannelRef>, FlowError> {
        let mut keys = self.strategy.channel_keys(envelope);
        if !self.strategy.fallback_to_channel_name_lookup() {
            keys = keys
                .into_iter()
                .filter_map(|key| self.retain_mapped(key))
                .collect();
        }
        let mut channels = Vec::new();
        for key in &keys {
            self.add_key(&mut channels, key)?;
        }
        if let Some(max) = self.strategy.max_destinations() {
            channels.truncate(max);
        }
        trace!(destinations = channels.len(), "resolved destinations");
        Ok(channels)
    }

    /// Reduces a key to the parts present in the mapping dictionary, used
    /// by strategies that disallow direct channel-name lookups.
    fn retain_mapped(&self, key: ChannelKey) -> Option<ChannelKey> {
        match key {
            ChannelKey::Name(name) => {
                let kept: Vec<&str> = name
                    .split(',')
                    .map(str::trim)
                    .filter(|part| self.channel_mappings.contains_key(*part))
                    .collect();
                (!kept.is_empty()).then(|| ChannelKey::Name(kept.join(",")))
            }
            ChannelKey::Names(names) => {
                let kept: Vec<String> = names
                    .into_iter()
                    .filter(|name| self.channel_mappings.contains_key(name))
                    .collect();
                (!kept.is_empty()).then_some(ChannelKey::Names(kept))
            }
            ChannelKey::Keys(keys) => {
                let kept: Vec<ChannelKey> = keys
                    .into_iter()
                    .filter_map(|key| self.retain_mapped(key))
                    .collect();
                (!kept.is_empty()).then_some(ChannelKey::Keys(kept))
            }
            // Without name fallback only mapped string keys survive.
            ChannelKey::Channel(_) | ChannelKey::Channels(_) | ChannelKey::Value(_) => None,
        }
    }

    fn add_key(&self, channels: &mut Vec<ChannelRef>, key: &ChannelKey) -> Result<(), FlowError> {
        match key {
            ChannelKey::Channel(channel) => channels.push(channel.clone()),
            ChannelKey::Channels(list) => {
                self.check_for_ambiguity(channels.len(), list.len())?;
                channels.extend(list.iter().cloned());
            }
            ChannelKey::Name(name) => self.add_name(channels, name)?,
            ChannelKey::Names(names) => {
                for name in names {
                    self.add_name(channels, name)?;
                }
            }
            ChannelKey::Keys(keys) => {
                self.check_for_ambiguity(channels.len(), keys.len())?;
                for nested in keys {
                    self.add_key(channels, nested)?;
                }
            }
            ChannelKey::Value(value) => match value.coerce_string() {
                Some(name) => self.add_name(channels, &name)?,
                None => {
                    return Err(FlowError::conversion(format!(
                        "router key {value:?} has no textual form"
                    )))
                }
            },
        }
        Ok(())
    }

    fn add_name(&self, channels: &mut Vec<ChannelRef>, key: &str) -> Result<(), FlowError> {
        if key.contains(',') {
            let tokens: Vec<&str> = key
                .split(',')
                .map(str::trim)
                .filter(|token| !token.is_empty())
                .collect();
            self.check_for_ambiguity(channels.len(), tokens.len())?;
            for token in tokens {
                self.add_name(channels, token)?;
            }
            return Ok(());
        }

        // A mapped key routes to its mapped channel name; an unmapped key
        // is itself the channel name.
        let mut name = self
            .channel_mappings
            .get(key)
            .map(|entry| entry.value().clone())
            .unwrap_or_else(|| key.to_string());
        if let Some(prefix) = &self.prefix {
            name = format!("{prefix}{name}");
        }
        if let Some(suffix) = &self.suffix {
            name = format!("{name}{suffix}");
        }
        match self.resolver.resolve(&name) {
            Ok(channel) => {
                channels.push(channel);
                Ok(())
            }
            Err(error) => {
                if self.resolution_required {
                    Err(error)
                } else {
                    trace!(channel = %name, "dropping unresolvable channel name");
                    Ok(())
                }
            }
        }
    }

    /// The cap is checked against candidate additions before they resolve,
    /// so a candidate that later fails to resolve still counts.
    fn check_for_ambiguity(&self, existing: usize, additions: usize) -> Result<(), FlowError> {
        if let Some(max) = self.strategy.max_destinations() {
            if existing + additions > max {
                return Err(FlowError::ambiguity(format!(
                    "{} candidate destinations where at most {max} may match",
                    existing + additions
                )));
            }
        }
        Ok(())
    }

    async fn send_to(
        &self,
        channel: &ChannelRef,
        envelope: Envelope,
    ) -> Result<(), FlowError> {
        match channel.send_timeout(envelope, self.send_timeout).await? {
            true => Ok(()),
            false => Err(FlowError::delivery(format!(
                "send to channel '{}' timed out",
                channel.name()
            ))),
        }
    }
}

#[async_trait]
impl MessageHandler for MessageRouter {
    #[instrument(skip_all, fields(message_id = %envelope.id()))]
    async fn handle(&self, envelope: Envelope) -> Result<(), FlowError> {
        let channels = self.determine_target_channels(&envelope)?;
        let sequence_size = channels.len();
        let mut sent = false;
        for (index, channel) in channels.iter().enumerate() {
            let outgoing = if self.apply_sequence {
                EnvelopeBuilder::derive(&envelope)
                    .push_sequence_details(
                        envelope.id(),
                        (index + 1) as i64,
                        sequence_size as i64,
                    )
                    .finish()
            } else {
                envelope.clone()
            };
            match self.send_to(channel, outgoing).await {
                Ok(()) => sent = true,
                Err(error) if self.ignore_send_failures => {
                    debug!(channel = channel.name(), %error, "ignoring send failure");
                }
                Err(error) => return Err(error),
            }
        }
        if sent {
            return Ok(());
        }
        match &self.default_output_channel {
            Some(fallback) => {
                debug!(
                    channel = fallback.name(),
                    "no destination accepted the message, sending to default output channel"
                );
                self.send_to(fallback, envelope).await
            }
            None => Err(FlowError::delivery(
                "no channel resolved by router and no default output channel defined",
            )),
        }
    }
}
