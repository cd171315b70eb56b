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

use flowbus::prelude::*;

mod setup;

#[test]
fn build_stamps_id_and_timestamp() {
    setup::initialize_tracing();
    let envelope = Envelope::new("hello".to_string());
    assert!(envelope.headers().id().is_some());
    assert!(envelope.headers().timestamp().is_some());
    assert_eq!(envelope.payload_as::<String>().unwrap(), "hello");
}

#[test]
fn every_envelope_gets_a_unique_id() {
    let first = Envelope::new("a".to_string());
    let second = Envelope::new("a".to_string());
    assert_ne!(first.id(), second.id());
}

#[test]
fn timestamps_are_monotone_non_decreasing() {
    let first = Envelope::new("a".to_string());
    let second = Envelope::new("b".to_string());
    assert!(second.timestamp() >= first.timestamp());
}

#[test]
fn builder_headers_are_carried_into_the_envelope() {
    let envelope = EnvelopeBuilder::new("payload".to_string())
        .header("tenant", "acme")
        .header(headers::PRIORITY, 7i64)
        .finish();
    assert_eq!(
        envelope.headers().get("tenant").and_then(HeaderValue::as_str),
        Some("acme")
    );
    assert_eq!(envelope.headers().priority(), Some(7));
}

#[test]
fn writes_to_auto_stamped_headers_are_ignored() {
    let envelope = EnvelopeBuilder::new("payload".to_string())
        .header(headers::ID, "forged")
        .header(headers::TIMESTAMP, 12i64)
        .finish();
    // Both stamps are generated, not taken from the caller.
    assert!(envelope.headers().id().is_some());
    assert_ne!(envelope.headers().timestamp(), Some(12));
}

#[test]
fn derive_preserves_payload_and_plain_headers_but_restamps() {
    let original = EnvelopeBuilder::new("payload".to_string())
        .header("tenant", "acme")
        .header(headers::REPLY_CHANNEL, "replies")
        .finish();
    let derived = EnvelopeBuilder::derive(&original).finish();

    assert_eq!(derived.payload_as::<String>().unwrap(), "payload");
    assert_eq!(
        derived.headers().get("tenant").and_then(HeaderValue::as_str),
        Some("acme")
    );
    assert_eq!(derived.headers().reply_channel(), Some("replies"));
    assert_ne!(derived.id(), original.id());
    assert!(derived.timestamp() >= original.timestamp());
}

#[test]
fn derive_leaves_the_source_untouched() {
    let original = EnvelopeBuilder::new("payload".to_string())
        .header("tenant", "acme")
        .finish();
    let id_before = original.id();
    let _derived = EnvelopeBuilder::derive(&original)
        .header("tenant", "globex")
        .remove_header("tenant")
        .finish();
    assert_eq!(original.id(), id_before);
    assert_eq!(
        original.headers().get("tenant").and_then(HeaderValue::as_str),
        Some("acme")
    );
}

#[test]
fn headers_if_absent_does_not_replace() {
    let envelope = EnvelopeBuilder::new("payload".to_string())
        .header("tenant", "acme")
        .headers_if_absent(vec![
            ("tenant".to_string(), HeaderValue::from("globex")),
            ("region".to_string(), HeaderValue::from("eu-1")),
        ])
        .finish();
    assert_eq!(
        envelope.headers().get("tenant").and_then(HeaderValue::as_str),
        Some("acme")
    );
    assert_eq!(
        envelope.headers().get("region").and_then(HeaderValue::as_str),
        Some("eu-1")
    );
}

#[test]
fn remove_header_drops_the_value() {
    let envelope = EnvelopeBuilder::new("payload".to_string())
        .header("tenant", "acme")
        .remove_header("tenant")
        .finish();
    assert!(!envelope.headers().contains("tenant"));
}

#[test]
fn push_sequence_details_stamps_correlation_headers() {
    let source = Envelope::new("payload".to_string());
    let envelope = EnvelopeBuilder::derive(&source)
        .push_sequence_details(source.id(), 2, 5)
        .finish();
    assert_eq!(envelope.headers().correlation_id(), Some(source.id()));
    assert_eq!(envelope.headers().sequence_number(), Some(2));
    assert_eq!(envelope.headers().sequence_size(), Some(5));
}
