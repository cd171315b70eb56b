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
use std::sync::Arc;

use async_trait::async_trait;

use crate::common::HandlerRef;
use crate::message::{Envelope, FlowError};

/// A unit of work applied to each envelope a channel delivers.
#[async_trait]
pub trait MessageHandler: Debug + Send + Sync {
    /// Processes one envelope. An `Err` tells the dispatching channel that
    /// this handler did not accept the message.
    async fn handle(&self, envelope: Envelope) -> Result<(), FlowError>;
}

/// The reply-producing handler variant used by gateways: processing an
/// envelope may yield a reply envelope for the caller to forward.
#[async_trait]
pub trait ReplyProducingHandler: Debug + Send + Sync {
    /// Processes one envelope, optionally producing a reply.
    async fn handle_with_reply(&self, envelope: Envelope)
        -> Result<Option<Envelope>, FlowError>;
}

/// Wraps a closure as a [`MessageHandler`].
pub struct FnHandler<F> {
    f: F,
}

impl<F> Debug for FnHandler<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FnHandler").finish_non_exhaustive()
    }
}

#[async_trait]
impl<F> MessageHandler for FnHandler<F>
where
    F: Fn(Envelope) -> Result<(), FlowError> + Send + Sync + 'static,
{
    async fn handle(&self, envelope: Envelope) -> Result<(), FlowError> {
        (self.f)(envelope)
    }
}

/// Builds a handler from a closure.
///
/// ```
/// use flowbus::prelude::*;
///
/// let handler = handler_fn(|envelope: Envelope| {
///     println!("got {:?}", envelope.payload());
///     Ok(())
/// });
/// ```
pub fn handler_fn<F>(f: F) -> HandlerRef
where
    F: Fn(Envelope) -> Result<(), FlowError> + Send + Sync + 'static,
{
    Arc::new(FnHandler { f })
}
