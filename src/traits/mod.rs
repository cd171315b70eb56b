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

//! Capability traits used throughout the framework.

pub use channel::{MessageChannel, PollableChannel, SubscribableChannel, Subscription};
pub use handler::{handler_fn, FnHandler, MessageHandler, ReplyProducingHandler};
pub use mapper::HeaderMapper;
pub use payload::{Payload, TypeHierarchy, TypeLevel};
pub use resolver::ChannelResolver;

mod channel;
mod handler;
mod mapper;
mod payload;
mod resolver;
