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

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use tokio::sync::{Notify, Semaphore};
use tracing::trace;

use crate::common::CONFIG;
use crate::message::{Envelope, FlowError};
use crate::traits::{MessageChannel, PollableChannel};

/// A pollable FIFO channel decoupling producers from consumers.
///
/// A bounded queue blocks senders on a capacity semaphore; an unbounded
/// queue accepts immediately. Receivers block until an envelope arrives,
/// their timeout expires, or the channel is closed.
#[derive(Debug)]
pub struct QueueChannel {
    name: String,
    queue: Mutex<VecDeque<Envelope>>,
    capacity: Option<Arc<Semaphore>>,
    not_empty: Notify,
    closed: AtomicBool,
}

impl QueueChannel {
    /// Creates a queue channel with the configured default capacity
    /// (`limits.default_queue_capacity`; zero means unbounded).
    pub fn new(name: impl Into<String>) -> Self {
        match CONFIG.limits.default_queue_capacity {
            0 => Self::unbounded(name),
            capacity => Self::bounded(name, capacity),
        }
    }

    /// Creates an unbounded queue channel.
    pub fn unbounded(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            queue: Mutex::new(VecDeque::new()),
            capacity: None,
            not_empty: Notify::new(),
            closed: AtomicBool::new(false),
        }
    }

    /// Creates a queue channel holding at most `capacity` envelopes.
    pub fn bounded(name: impl Into<String>, capacity: usize) -> Self {
        Self {
            name: name.into(),
            queue: Mutex::new(VecDeque::with_capacity(capacity)),
            capacity: Some(Arc::new(Semaphore::new(capacity))),
            not_empty: Notify::new(),
            closed: AtomicBool::new(false),
        }
    }

    /// Number of envelopes currently queued.
    pub fn len(&self) -> usize {
        self.queue.lock().len()
    }

    /// Whether the queue currently holds no envelopes.
    pub fn is_empty(&self) -> bool {
        self.queue.lock().is_empty()
    }

    fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }
}

#[async_trait]
impl MessageChannel for QueueChannel {
    fn name(&self) -> &str {
        &self.name
    }

    async fn send_timeout(
        &self,
        envelope: Envelope,
        timeout: Option<Duration>,
    ) -> Result<bool, FlowError> {
        if self.is_closed() {
            return Ok(false);
        }
        if let Some(semaphore) = &self.capacity {
            let acquired = match timeout {
                None => semaphore.acquire().await,
                Some(limit) => match tokio::time::timeout(limit, semaphore.acquire()).await {
                    Ok(acquired) => acquired,
                    Err(_) => {
                        trace!(channel = %self.name, "send timed out waiting for capacity");
                        return Ok(false);
                    }
                },
            };
            match acquired {
                // The permit is restored when a receiver takes the envelope.
                Ok(permit) => permit.forget(),
                Err(_) => return Ok(false),
            }
        }
        if self.is_closed() {
            return Ok(false);
        }
        self.queue.lock().push_back(envelope);
        self.not_empty.notify_one();
        Ok(true)
    }

    fn as_pollable(&self) -> Option<&dyn PollableChannel> {
        Some(self)
    }
}

#[async_trait]
impl PollableChannel for QueueChannel {
    async fn receive_timeout(&self, timeout: Option<Duration>) -> Option<Envelope> {
        let deadline = timeout.map(|limit| tokio::time::Instant::now() + limit);
        loop {
            // Register for a wakeup before checking the queue, otherwise a
            // send landing between the check and the await would be missed.
            let notified = self.not_empty.notified();
            {
                let mut queue = self.queue.lock();
                if let Some(envelope) = queue.pop_front() {
                    if !queue.is_empty() {
                        // Pass any stored wakeup on to the next receiver.
                        self.not_empty.notify_one();
                    }
                    drop(queue);
                    if let Some(semaphore) = &self.capacity {
                        semaphore.add_permits(1);
                    }
                    return Some(envelope);
                }
            }
            if self.is_closed() {
                return None;
            }
            match deadline {
                None => notified.await,
                Some(deadline) => {
                    if tokio::time::timeout_at(deadline, notified).await.is_err() {
                        return None;
                    }
                }
            }
        }
    }

    fn close(&self) {
        self.closed.store(true, Ordering::Release);
        if let Some(semaphore) = &self.capacity {
            semaphore.close();
        }
        self.not_empty.notify_waiters();
    }
}
