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

use crate::common::ChannelRef;
use crate::message::FlowError;

/// Resolves channel names to channel instances.
///
/// Routers depend on this capability rather than on a concrete directory,
/// which keeps the router/registry relationship acyclic: the registry (or
/// a [`MapChannelResolver`](crate::common::MapChannelResolver)) implements
/// resolution, routers only consume it.
pub trait ChannelResolver: Debug + Send + Sync {
    /// Resolves `name`, or fails with
    /// [`FlowError::ChannelResolution`](crate::message::FlowError::ChannelResolution).
    fn resolve(&self, name: &str) -> Result<ChannelRef, FlowError>;
}
