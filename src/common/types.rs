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

//! Shared type aliases. Centralized here so call sites stay readable and
//! the trait-object spellings live in one place.

use std::cmp::Ordering;
use std::sync::Arc;

use crate::message::Envelope;
use crate::traits::{ChannelResolver, MessageChannel, MessageHandler};

/// A shared reference to any channel.
pub type ChannelRef = Arc<dyn MessageChannel>;

/// A shared reference to a message handler.
pub type HandlerRef = Arc<dyn MessageHandler>;

/// A shared reference to a channel resolver.
pub type ResolverRef = Arc<dyn ChannelResolver>;

/// Ordering function for priority channels. `Less` means the first
/// envelope is dequeued earlier.
pub type EnvelopeComparator = Arc<dyn Fn(&Envelope, &Envelope) -> Ordering + Send + Sync>;
