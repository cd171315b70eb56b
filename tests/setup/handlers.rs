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

use parking_lot::Mutex;

use flowbus::prelude::*;

/// Test handler that records every envelope it receives.
#[derive(Debug, Default)]
pub struct Collector {
    received: Mutex<Vec<Envelope>>,
}

impl Collector {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn received(&self) -> Vec<Envelope> {
        self.received.lock().clone()
    }

    pub fn count(&self) -> usize {
        self.received.lock().len()
    }

    /// Payloads received so far, downcast to `String`.
    pub fn string_payloads(&self) -> Vec<String> {
        self.received
            .lock()
            .iter()
            .filter_map(|envelope| envelope.payload_as::<String>().cloned())
            .collect()
    }
}

#[async_trait]
impl MessageHandler for Collector {
    async fn handle(&self, envelope: Envelope) -> Result<(), FlowError> {
        self.received.lock().push(envelope);
        Ok(())
    }
}

/// Test handler that rejects everything.
#[derive(Debug, Default)]
pub struct RejectingHandler;

#[async_trait]
impl MessageHandler for RejectingHandler {
    async fn handle(&self, _envelope: Envelope) -> Result<(), FlowError> {
        Err(FlowError::Argument("handler rejects everything".into()))
    }
}
