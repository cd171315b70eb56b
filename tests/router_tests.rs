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

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use flowbus::prelude::*;

use crate::setup::initialize_tracing;

mod setup;

/// Strategy returning a fixed key list, the simplest router driver.
#[derive(Debug)]
struct FixedKeys(Vec<ChannelKey>);

impl RouteStrategy for FixedKeys {
    fn channel_keys(&self, _envelope: &Envelope) -> Vec<ChannelKey> {
        self.0.clone()
    }
}

/// Like [`FixedKeys`] but capped at a single destination.
#[derive(Debug)]
struct SingleFixed(Vec<ChannelKey>);

impl RouteStrategy for SingleFixed {
    fn channel_keys(&self, _envelope: &Envelope) -> Vec<ChannelKey> {
        self.0.clone()
    }

    fn max_destinations(&self) -> Option<usize> {
        Some(1)
    }
}

fn queue(name: &str) -> Arc<QueueChannel> {
    Arc::new(QueueChannel::unbounded(name))
}

fn resolver_with(channels: &[Arc<QueueChannel>]) -> ResolverRef {
    let resolver = MapChannelResolver::new();
    for channel in channels {
        resolver.register(channel.clone());
    }
    Arc::new(resolver)
}

async fn drain(channel: &QueueChannel) -> Vec<Envelope> {
    let mut envelopes = Vec::new();
    while let Some(envelope) = channel.receive_timeout(Some(Duration::from_millis(50))).await {
        envelopes.push(envelope);
    }
    envelopes
}

#[tokio::test]
async fn routes_by_name_through_the_resolver() -> anyhow::Result<()> {
    initialize_tracing();
    let orders = queue("orders");
    let router = MessageRouter::new(
        Box::new(FixedKeys(vec![ChannelKey::from("orders")])),
        resolver_with(&[orders.clone()]),
        RouterConfig::default(),
    );

    router.handle(Envelope::new("o-1".to_string())).await?;
    assert_eq!(drain(&orders).await.len(), 1);
    Ok(())
}

#[tokio::test]
async fn mapped_keys_route_to_their_mapped_names() -> anyhow::Result<()> {
    initialize_tracing();
    let orders = queue("orders");
    let config = RouterConfig {
        channel_mappings: HashMap::from([("incoming".to_string(), "orders".to_string())]),
        ..RouterConfig::default()
    };
    let router = MessageRouter::new(
        Box::new(FixedKeys(vec![ChannelKey::from("incoming")])),
        resolver_with(&[orders.clone()]),
        config,
    );

    router.handle(Envelope::new("o-1".to_string())).await?;
    assert_eq!(drain(&orders).await.len(), 1);
    Ok(())
}

#[tokio::test]
async fn affixes_apply_before_resolution() -> anyhow::Result<()> {
    initialize_tracing();
    let channel = queue("app.orders.queue");
    let config = RouterConfig {
        prefix: Some("app.".to_string()),
        suffix: Some(".queue".to_string()),
        ..RouterConfig::default()
    };
    let router = MessageRouter::new(
        Box::new(FixedKeys(vec![ChannelKey::from("orders")])),
        resolver_with(&[channel.clone()]),
        config,
    );

    router.handle(Envelope::new("o-1".to_string())).await?;
    assert_eq!(drain(&channel).await.len(), 1);
    Ok(())
}

#[tokio::test]
async fn comma_delimited_names_fan_out() -> anyhow::Result<()> {
    initialize_tracing();
    let billing = queue("billing");
    let shipping = queue("shipping");
    let router = MessageRouter::new(
        Box::new(FixedKeys(vec![ChannelKey::from("billing, shipping")])),
        resolver_with(&[billing.clone(), shipping.clone()]),
        RouterConfig::default(),
    );

    router.handle(Envelope::new("o-1".to_string())).await?;
    assert_eq!(drain(&billing).await.len(), 1);
    assert_eq!(drain(&shipping).await.len(), 1);
    Ok(())
}

#[tokio::test]
async fn duplicate_keys_deliver_twice() -> anyhow::Result<()> {
    initialize_tracing();
    let orders = queue("orders");
    let router = MessageRouter::new(
        Box::new(FixedKeys(vec![
            ChannelKey::from("orders"),
            ChannelKey::from("orders"),
        ])),
        resolver_with(&[orders.clone()]),
        RouterConfig::default(),
    );

    router.handle(Envelope::new("o-1".to_string())).await?;
    assert_eq!(drain(&orders).await.len(), 2);
    Ok(())
}

#[tokio::test]
async fn channel_instances_bypass_resolution() -> anyhow::Result<()> {
    initialize_tracing();
    let direct_target = queue("unregistered");
    let router = MessageRouter::new(
        Box::new(FixedKeys(vec![ChannelKey::Channel(direct_target.clone())])),
        Arc::new(MapChannelResolver::new()),
        RouterConfig::default(),
    );

    router.handle(Envelope::new("o-1".to_string())).await?;
    assert_eq!(drain(&direct_target).await.len(), 1);
    Ok(())
}

#[tokio::test]
async fn values_with_a_textual_form_act_as_names() -> anyhow::Result<()> {
    initialize_tracing();
    let channel = queue("7");
    let router = MessageRouter::new(
        Box::new(FixedKeys(vec![ChannelKey::Value(HeaderValue::Int(7))])),
        resolver_with(&[channel.clone()]),
        RouterConfig::default(),
    );

    router.handle(Envelope::new("o-1".to_string())).await?;
    assert_eq!(drain(&channel).await.len(), 1);
    Ok(())
}

#[tokio::test]
async fn values_without_a_textual_form_are_a_conversion_error() {
    initialize_tracing();
    let router = MessageRouter::new(
        Box::new(FixedKeys(vec![ChannelKey::Value(HeaderValue::Bytes(vec![1, 2]))])),
        Arc::new(MapChannelResolver::new()),
        RouterConfig::default(),
    );

    let result = router.handle(Envelope::new("o-1".to_string())).await;
    assert!(matches!(result, Err(FlowError::Conversion { .. })));
}

#[tokio::test]
async fn unresolvable_names_fail_when_resolution_is_required() {
    initialize_tracing();
    let router = MessageRouter::new(
        Box::new(FixedKeys(vec![ChannelKey::from("nowhere")])),
        Arc::new(MapChannelResolver::new()),
        RouterConfig::default(),
    );

    let result = router.handle(Envelope::new("o-1".to_string())).await;
    assert!(matches!(result, Err(FlowError::ChannelResolution { .. })));
}

#[tokio::test]
async fn unresolvable_names_are_dropped_when_resolution_is_optional() -> anyhow::Result<()> {
    initialize_tracing();
    let fallback = queue("fallback");
    let config = RouterConfig {
        resolution_required: false,
        default_output_channel: Some(fallback.clone()),
        ..RouterConfig::default()
    };
    let router = MessageRouter::new(
        Box::new(FixedKeys(vec![ChannelKey::from("nowhere")])),
        Arc::new(MapChannelResolver::new()),
        config,
    );

    router.handle(Envelope::new("o-1".to_string())).await?;
    assert_eq!(drain(&fallback).await.len(), 1);
    Ok(())
}

#[tokio::test]
async fn falls_back_to_the_default_output_channel() -> anyhow::Result<()> {
    initialize_tracing();
    let fallback = queue("fallback");
    let config = RouterConfig {
        default_output_channel: Some(fallback.clone()),
        ..RouterConfig::default()
    };
    let router = MessageRouter::new(
        Box::new(FixedKeys(Vec::new())),
        Arc::new(MapChannelResolver::new()),
        config,
    );

    router.handle(Envelope::new("o-1".to_string())).await?;
    assert_eq!(drain(&fallback).await.len(), 1);
    Ok(())
}

#[tokio::test]
async fn fails_with_a_delivery_error_without_a_default() {
    initialize_tracing();
    let router = MessageRouter::new(
        Box::new(FixedKeys(Vec::new())),
        Arc::new(MapChannelResolver::new()),
        RouterConfig::default(),
    );

    let result = router.handle(Envelope::new("o-1".to_string())).await;
    assert!(matches!(result, Err(FlowError::Delivery { .. })));
}

#[tokio::test]
async fn ignored_send_failures_let_the_route_continue() -> anyhow::Result<()> {
    initialize_tracing();
    // A direct channel without subscribers always fails its sends.
    let broken: ChannelRef = Arc::new(DirectChannel::new("broken"));
    let working = queue("working");
    let config = RouterConfig {
        ignore_send_failures: true,
        ..RouterConfig::default()
    };
    let router = MessageRouter::new(
        Box::new(FixedKeys(vec![
            ChannelKey::Channel(broken),
            ChannelKey::from("working"),
        ])),
        resolver_with(&[working.clone()]),
        config,
    );

    router.handle(Envelope::new("o-1".to_string())).await?;
    assert_eq!(drain(&working).await.len(), 1);
    Ok(())
}

#[tokio::test]
async fn send_failures_abort_the_route_by_default() {
    initialize_tracing();
    let broken: ChannelRef = Arc::new(DirectChannel::new("broken"));
    let router = MessageRouter::new(
        Box::new(FixedKeys(vec![ChannelKey::Channel(broken)])),
        Arc::new(MapChannelResolver::new()),
        RouterConfig::default(),
    );

    let result = router.handle(Envelope::new("o-1".to_string())).await;
    assert!(result.is_err());
}

#[tokio::test]
async fn all_sends_failing_falls_through_to_the_default() -> anyhow::Result<()> {
    initialize_tracing();
    let broken: ChannelRef = Arc::new(DirectChannel::new("broken"));
    let fallback = queue("fallback");
    let config = RouterConfig {
        ignore_send_failures: true,
        default_output_channel: Some(fallback.clone()),
        ..RouterConfig::default()
    };
    let router = MessageRouter::new(
        Box::new(FixedKeys(vec![ChannelKey::Channel(broken)])),
        Arc::new(MapChannelResolver::new()),
        config,
    );

    router.handle(Envelope::new("o-1".to_string())).await?;
    assert_eq!(drain(&fallback).await.len(), 1);
    Ok(())
}

#[tokio::test]
async fn apply_sequence_stamps_each_outgoing_envelope() -> anyhow::Result<()> {
    initialize_tracing();
    let first = queue("first");
    let second = queue("second");
    let third = queue("third");
    let config = RouterConfig {
        apply_sequence: true,
        ..RouterConfig::default()
    };
    let router = MessageRouter::new(
        Box::new(FixedKeys(vec![
            ChannelKey::from("first"),
            ChannelKey::from("second"),
            ChannelKey::from("third"),
        ])),
        resolver_with(&[first.clone(), second.clone(), third.clone()]),
        config,
    );

    let source = Envelope::new("o-1".to_string());
    let source_id = source.id();
    router.handle(source).await?;

    for (expected_number, channel) in [(1, &first), (2, &second), (3, &third)] {
        let envelope = drain(channel).await.remove(0);
        assert_eq!(envelope.headers().correlation_id(), Some(source_id));
        assert_eq!(envelope.headers().sequence_number(), Some(expected_number));
        assert_eq!(envelope.headers().sequence_size(), Some(3));
        assert_ne!(envelope.id(), source_id, "derived envelopes are restamped");
    }
    Ok(())
}

#[tokio::test]
async fn without_apply_sequence_the_envelope_passes_through_unchanged() -> anyhow::Result<()> {
    initialize_tracing();
    let orders = queue("orders");
    let router = MessageRouter::new(
        Box::new(FixedKeys(vec![ChannelKey::from("orders")])),
        resolver_with(&[orders.clone()]),
        RouterConfig::default(),
    );

    let source = Envelope::new("o-1".to_string());
    let source_id = source.id();
    router.handle(source).await?;

    let delivered = drain(&orders).await.remove(0);
    assert_eq!(delivered.id(), source_id);
    assert!(delivered.headers().sequence_number().is_none());
    Ok(())
}

#[tokio::test]
async fn a_multi_name_key_over_the_cap_is_ambiguous() {
    initialize_tracing();
    let first = queue("first");
    let second = queue("second");
    let router = MessageRouter::new(
        Box::new(SingleFixed(vec![ChannelKey::from("first,second")])),
        resolver_with(&[first, second]),
        RouterConfig::default(),
    );

    let result = router.handle(Envelope::new("o-1".to_string())).await;
    assert!(matches!(result, Err(FlowError::Ambiguity { .. })));
}

#[tokio::test]
async fn runtime_mapping_updates_take_effect() -> anyhow::Result<()> {
    initialize_tracing();
    let orders = queue("orders");
    let archive = queue("archive");
    let router = MessageRouter::new(
        Box::new(FixedKeys(vec![ChannelKey::from("incoming")])),
        resolver_with(&[orders.clone(), archive.clone()]),
        RouterConfig {
            channel_mappings: HashMap::from([("incoming".to_string(), "orders".to_string())]),
            ..RouterConfig::default()
        },
    );

    router.handle(Envelope::new("o-1".to_string())).await?;
    assert_eq!(drain(&orders).await.len(), 1);

    router.set_channel_mapping("incoming", "archive");
    router.handle(Envelope::new("o-2".to_string())).await?;
    assert_eq!(drain(&archive).await.len(), 1);

    // With the mapping removed the key falls back to a direct name lookup
    // and no channel named "incoming" exists.
    router.remove_channel_mapping("incoming");
    let result = router.handle(Envelope::new("o-3".to_string())).await;
    assert!(matches!(result, Err(FlowError::ChannelResolution { .. })));
    Ok(())
}
