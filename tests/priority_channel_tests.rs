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

#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use flowbus::prelude::*;

use crate::setup::initialize_tracing;

mod setup;

fn prioritized(payload: &str, priority: i64) -> Envelope {
    EnvelopeBuilder::new(payload.to_string())
        .header(headers::PRIORITY, priority)
        .finish()
}

async fn drain(channel: &PriorityChannel) -> Vec<String> {
    let mut payloads = Vec::new();
    while let Some(envelope) = channel.receive_timeout(Some(Duration::from_millis(50))).await {
        payloads.push(envelope.payload_as::<String>().unwrap().clone());
    }
    payloads
}

#[tokio::test]
async fn envelopes_leave_in_priority_order() -> anyhow::Result<()> {
    initialize_tracing();
    let channel = PriorityChannel::new("triage");
    for (payload, priority) in [("a", 1), ("b", 9), ("c", 5), ("d", 9), ("e", 1)] {
        assert!(channel.send(prioritized(payload, priority)).await?);
    }
    assert_eq!(drain(&channel).await, vec!["b", "d", "c", "a", "e"]);
    Ok(())
}

#[tokio::test]
async fn equal_priorities_stay_fifo() -> anyhow::Result<()> {
    initialize_tracing();
    let channel = PriorityChannel::new("triage");
    for payload in ["first", "second", "third", "fourth"] {
        assert!(channel.send(prioritized(payload, 3)).await?);
    }
    assert_eq!(
        drain(&channel).await,
        vec!["first", "second", "third", "fourth"]
    );
    Ok(())
}

#[tokio::test]
async fn missing_priority_counts_as_zero() -> anyhow::Result<()> {
    initialize_tracing();
    let channel = PriorityChannel::new("triage");
    assert!(channel.send(Envelope::new("plain".to_string())).await?);
    assert!(channel.send(prioritized("urgent", 1)).await?);
    assert!(channel.send(prioritized("negative", -1)).await?);

    assert_eq!(drain(&channel).await, vec!["urgent", "plain", "negative"]);
    Ok(())
}

#[tokio::test]
async fn the_sequence_header_never_escapes() -> anyhow::Result<()> {
    initialize_tracing();
    let channel = PriorityChannel::new("triage");
    assert!(channel.send(prioritized("a", 2)).await?);
    assert!(channel.send(prioritized("b", 2)).await?);

    while let Some(envelope) = channel.receive_timeout(Some(Duration::from_millis(50))).await {
        assert!(!envelope.headers().contains("__priorityChannelSequence__"));
    }
    Ok(())
}

#[tokio::test]
async fn receiving_does_not_disturb_other_headers() -> anyhow::Result<()> {
    initialize_tracing();
    let channel = PriorityChannel::new("triage");
    let sent = EnvelopeBuilder::new("payload".to_string())
        .header("tenant", "acme")
        .header(headers::PRIORITY, 4i64)
        .finish();
    let sent_id = sent.id();
    assert!(channel.send(sent).await?);

    let received = channel
        .receive_timeout(Some(Duration::from_millis(50)))
        .await
        .unwrap();
    assert_eq!(received.id(), sent_id, "identity survives the queue");
    assert_eq!(
        received.headers().get("tenant").and_then(HeaderValue::as_str),
        Some("acme")
    );
    Ok(())
}

#[tokio::test]
async fn capacity_is_never_exceeded() -> anyhow::Result<()> {
    initialize_tracing();
    let channel = PriorityChannel::bounded("triage", 2);
    assert!(channel.send(prioritized("a", 1)).await?);
    assert!(channel.send(prioritized("b", 2)).await?);
    assert!(
        !channel
            .send_timeout(prioritized("c", 3), Some(Duration::from_millis(20)))
            .await?
    );

    // A receive releases one slot.
    assert!(channel.receive_timeout(Some(Duration::from_millis(50))).await.is_some());
    assert!(channel.send(prioritized("c", 3)).await?);
    Ok(())
}

#[tokio::test]
async fn a_blocked_sender_proceeds_once_capacity_frees() -> anyhow::Result<()> {
    initialize_tracing();
    let channel = Arc::new(PriorityChannel::bounded("triage", 1));
    assert!(channel.send(prioritized("a", 1)).await?);

    let sender = {
        let channel = channel.clone();
        tokio::spawn(async move { channel.send(prioritized("b", 1)).await })
    };

    tokio::time::sleep(Duration::from_millis(20)).await;
    assert!(channel.receive_timeout(Some(Duration::from_millis(50))).await.is_some());
    assert!(sender.await??);
    assert_eq!(drain(&channel).await, vec!["b"]);
    Ok(())
}

#[tokio::test]
async fn custom_comparators_control_the_order() -> anyhow::Result<()> {
    initialize_tracing();
    // Lowest priority first, the reverse of the default.
    let comparator: EnvelopeComparator = Arc::new(|left, right| {
        let left = left.headers().priority().unwrap_or(0);
        let right = right.headers().priority().unwrap_or(0);
        left.cmp(&right)
    });
    let channel = PriorityChannel::with_comparator("triage", None, comparator);
    for (payload, priority) in [("a", 5), ("b", 1), ("c", 3)] {
        assert!(channel.send(prioritized(payload, priority)).await?);
    }
    assert_eq!(drain(&channel).await, vec!["b", "c", "a"]);
    Ok(())
}
