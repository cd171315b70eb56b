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

use std::cmp::Ordering as CmpOrdering;
use std::collections::BinaryHeap;
use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use tokio::sync::{Notify, Semaphore};
use tracing::trace;

use crate::common::{EnvelopeComparator, CONFIG};
use crate::message::{Envelope, FlowError};
use crate::traits::{MessageChannel, PollableChannel};

/// A pollable channel that releases envelopes by priority.
///
/// The default comparator orders by the `priority` header, highest first,
/// treating a missing or non-numeric header as 0. Ties always fall back to
/// a monotonic sequence stamped at enqueue, so envelopes of equal priority
/// leave in arrival order. The sequence header is stripped before an
/// envelope is handed to a receiver.
pub struct PriorityChannel {
    name: String,
    heap: Mutex<BinaryHeap<QueuedEnvelope>>,
    comparator: EnvelopeComparator,
    upper_bound: Option<Arc<Semaphore>>,
    counter: AtomicU64,
    not_empty: Notify,
    closed: AtomicBool,
}

impl PriorityChannel {
    /// Creates an unbounded priority channel with the default comparator.
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_comparator(name, None, default_comparator())
    }

    /// Creates a priority channel holding at most `capacity` envelopes.
    pub fn bounded(name: impl Into<String>, capacity: usize) -> Self {
        Self::with_comparator(name, Some(capacity), default_comparator())
    }

    /// Creates a priority channel ordered by `comparator`, with `Less`
    /// meaning dequeued earlier. The sequence tiebreak still applies when
    /// the comparator reports equality. `capacity` of `None` is unbounded.
    pub fn with_comparator(
        name: impl Into<String>,
        capacity: Option<usize>,
        comparator: EnvelopeComparator,
    ) -> Self {
        Self {
            name: name.into(),
            heap: Mutex::new(BinaryHeap::with_capacity(
                CONFIG.limits.priority_heap_initial_capacity,
            )),
            comparator,
            upper_bound: capacity.map(|permits| Arc::new(Semaphore::new(permits))),
            counter: AtomicU64::new(0),
            not_empty: Notify::new(),
            closed: AtomicBool::new(false),
        }
    }

    /// Number of envelopes currently queued.
    pub fn len(&self) -> usize {
        self.heap.lock().len()
    }

    /// Whether the channel currently holds no envelopes.
    pub fn is_empty(&self) -> bool {
        self.heap.lock().is_empty()
    }

    fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }
}

impl fmt::Debug for PriorityChannel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PriorityChannel")
            .field("name", &self.name)
            .field("bounded", &self.upper_bound.is_some())
            .field("len", &self.len())
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl MessageChannel for PriorityChannel {
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
        if let Some(semaphore) = &self.upper_bound {
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
                // Released by `receive_timeout` once the envelope leaves.
                Ok(permit) => permit.forget(),
                Err(_) => return Ok(false),
            }
        }
        if self.is_closed() {
            return Ok(false);
        }
        let sequence = self.counter.fetch_add(1, Ordering::Relaxed) + 1;
        let stamped = envelope.with_priority_sequence(sequence);
        self.heap.lock().push(QueuedEnvelope {
            envelope: stamped,
            sequence,
            comparator: self.comparator.clone(),
        });
        self.not_empty.notify_one();
        Ok(true)
    }

    fn as_pollable(&self) -> Option<&dyn PollableChannel> {
        Some(self)
    }
}

#[async_trait]
impl PollableChannel for PriorityChannel {
    async fn receive_timeout(&self, timeout: Option<Duration>) -> Option<Envelope> {
        let deadline = timeout.map(|limit| tokio::time::Instant::now() + limit);
        loop {
            let notified = self.not_empty.notified();
            {
                let mut heap = self.heap.lock();
                if let Some(queued) = heap.pop() {
                    if !heap.is_empty() {
                        self.not_empty.notify_one();
                    }
                    drop(heap);
                    if let Some(semaphore) = &self.upper_bound {
                        semaphore.add_permits(1);
                    }
                    return Some(queued.envelope.without_priority_sequence());
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
        if let Some(semaphore) = &self.upper_bound {
            semaphore.close();
        }
        self.not_empty.notify_waiters();
    }
}

/// Heap entry: a sequence-stamped envelope plus the channel's comparator.
struct QueuedEnvelope {
    envelope: Envelope,
    sequence: u64,
    comparator: EnvelopeComparator,
}

impl QueuedEnvelope {
    /// Queue order: comparator first, then the enqueue sequence ascending,
    /// so equal-priority envelopes stay FIFO.
    fn queue_order(&self, other: &Self) -> CmpOrdering {
        (self.comparator)(&self.envelope, &other.envelope)
            .then_with(|| self.sequence.cmp(&other.sequence))
    }
}

impl fmt::Debug for QueuedEnvelope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QueuedEnvelope")
            .field("sequence", &self.sequence)
            .field("envelope", &self.envelope)
            .finish_non_exhaustive()
    }
}

impl Ord for QueuedEnvelope {
    fn cmp(&self, other: &Self) -> CmpOrdering {
        // BinaryHeap pops its greatest element; queue order wants the least
        // first, so the ordering is reversed here.
        self.queue_order(other).reverse()
    }
}

impl PartialOrd for QueuedEnvelope {
    fn partial_cmp(&self, other: &Self) -> Option<CmpOrdering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for QueuedEnvelope {
    fn eq(&self, other: &Self) -> bool {
        self.queue_order(other) == CmpOrdering::Equal
    }
}

impl Eq for QueuedEnvelope {}

fn default_comparator() -> EnvelopeComparator {
    Arc::new(|left, right| {
        let left_priority = left.headers().priority().unwrap_or(0);
        let right_priority = right.headers().priority().unwrap_or(0);
        // Descending: higher priority dequeues earlier.
        right_priority.cmp(&left_priority)
    })
}
