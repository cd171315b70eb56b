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

use dashmap::DashMap;

use crate::common::ChannelRef;
use crate::message::FlowError;
use crate::traits::ChannelResolver;

/// A [`ChannelResolver`] backed by a plain name-to-channel map.
///
/// Useful where a full [`ChannelRegistry`](crate::common::ChannelRegistry)
/// is overkill: register channels under their own names and hand the
/// resolver to a router.
#[derive(Debug, Default)]
pub struct MapChannelResolver {
    channels: DashMap<String, ChannelRef>,
}

impl MapChannelResolver {
    /// Creates an empty resolver.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `channel` under its own name, replacing any previous
    /// registration.
    pub fn register(&self, channel: ChannelRef) {
        self.channels.insert(channel.name().to_string(), channel);
    }

    /// Removes the channel registered under `name`.
    pub fn unregister(&self, name: &str) -> Option<ChannelRef> {
        self.channels.remove(name).map(|(_, channel)| channel)
    }
}

impl ChannelResolver for MapChannelResolver {
    fn resolve(&self, name: &str) -> Result<ChannelRef, FlowError> {
        self.channels
            .get(name)
            .map(|entry| entry.value().clone())
            .ok_or_else(|| FlowError::resolution(name))
    }
}
