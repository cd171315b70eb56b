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

#![forbid(unsafe_code)]

//! # Flowbus
//!
//! An embeddable, in-process integration bus: producers publish typed
//! messages onto named channels and consumers (handlers, routers,
//! gateways) process them. Messages travel as [`Envelope`]s carrying an
//! opaque payload plus an immutable header map used for correlation,
//! priority, sequence tracking, and adapter metadata.
//!
//! ## Key Concepts
//!
//! - **Envelopes ([`Envelope`], [`EnvelopeBuilder`])**: immutable messages
//!   with structurally shared payloads and auto-stamped `id`/`timestamp`
//!   headers.
//! - **Channels**: [`DirectChannel`] (synchronous fan-out to subscribed
//!   handlers), [`QueueChannel`] (pollable FIFO, bounded or unbounded),
//!   and [`PriorityChannel`] (comparator-ordered with FIFO tiebreak).
//! - **Routing ([`MessageRouter`], [`PayloadTypeRouter`])**: handlers that
//!   compute destination channels per envelope, with mapping dictionaries,
//!   affixes, sequence stamping, and payload-type-hierarchy selection.
//! - **Header mapping ([`ProtocolHeaderMapper`])**: bidirectional
//!   translation between envelope headers and a transport's native header
//!   model, with direction, prefix, and pattern rules.
//! - **Registry ([`ChannelRegistry`])**: a name-indexed directory wiring
//!   inbound and outbound endpoints together, with observer-style taps.
//!
//! Delivery is best effort within a single process address space; there is
//! no persistence and no cross-process coordination.
//!
//! [`Envelope`]: crate::prelude::Envelope
//! [`EnvelopeBuilder`]: crate::prelude::EnvelopeBuilder
//! [`DirectChannel`]: crate::prelude::DirectChannel
//! [`QueueChannel`]: crate::prelude::QueueChannel
//! [`PriorityChannel`]: crate::prelude::PriorityChannel
//! [`MessageRouter`]: crate::prelude::MessageRouter
//! [`PayloadTypeRouter`]: crate::prelude::PayloadTypeRouter
//! [`ProtocolHeaderMapper`]: crate::prelude::ProtocolHeaderMapper
//! [`ChannelRegistry`]: crate::prelude::ChannelRegistry

/// Internal utilities: configuration, the channel registry, resolvers, and
/// shared type aliases.
pub(crate) mod common;

/// Channel implementations: direct, queue, and priority.
pub(crate) mod channel;

/// Header-mapper framework for translating to and from transport headers.
pub(crate) mod mapper;

/// Envelope, builder, header map, and error types.
pub(crate) mod message;

/// The routing engine and its payload-type specialization.
pub(crate) mod router;

/// Capability traits used throughout the framework.
pub(crate) mod traits;

/// A prelude module for conveniently importing the most commonly used items.
pub mod prelude {
    pub use async_trait::async_trait;

    pub use crate::channel::{DirectChannel, PriorityChannel, QueueChannel};
    pub use crate::common::{
        ChannelRef, ChannelRegistry, EnvelopeComparator, FlowbusConfig, HandlerRef,
        MapChannelResolver, ResolverRef, CONFIG,
    };
    pub use crate::mapper::{
        HeaderDescriptor, MapperDirection, MapperOptions, ProtocolHeaderMapper, ProtocolHeaders,
        STANDARD_REPLY_HEADERS, STANDARD_REQUEST_HEADERS,
    };
    pub use crate::message::headers;
    pub use crate::message::{Envelope, EnvelopeBuilder, FlowError, HeaderMap, HeaderValue};
    pub use crate::router::{
        ChannelKey, MessageRouter, PayloadTypeRouter, PayloadTypeStrategy, RouteStrategy,
        RouterConfig,
    };
    pub use crate::traits::{
        handler_fn, ChannelResolver, HeaderMapper, MessageChannel, MessageHandler, Payload,
        PollableChannel, ReplyProducingHandler, SubscribableChannel, Subscription, TypeHierarchy,
        TypeLevel,
    };
}
