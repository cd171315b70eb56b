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
use std::marker::PhantomData;

use tracing::{debug, trace, warn};

use crate::mapper::patterns::simple_match;
use crate::mapper::protocol::{
    HeaderDescriptor, MapperDirection, ProtocolHeaders, STANDARD_REPLY_HEADERS,
    STANDARD_REQUEST_HEADERS,
};
use crate::message::headers::TRANSIENT_HEADER_NAMES;
use crate::message::{HeaderMap, HeaderValue};
use crate::traits::HeaderMapper;

/// Optional overrides for a [`ProtocolHeaderMapper`].
///
/// Header-name lists accept exact names, `*` glob patterns, and the
/// [`STANDARD_REQUEST_HEADERS`] / [`STANDARD_REPLY_HEADERS`] tokens.
/// Unset fields fall back to the direction-dependent defaults.
#[derive(Debug, Clone, Default)]
pub struct MapperOptions {
    /// Patterns for headers mapped from the transport into envelopes.
    pub inbound_header_names: Option<Vec<String>>,
    /// Patterns for headers mapped from envelopes onto the transport.
    pub outbound_header_names: Option<Vec<String>>,
    /// Prefix applied to user-defined header names (default empty).
    pub user_defined_header_prefix: Option<String>,
}

/// Bidirectional header mapper for a protocol described by `P`.
///
/// `to_headers` extracts the transport's standard and user-defined headers
/// into an envelope header map, filtering against the inbound pattern
/// list. `from_headers` populates a transport header model from envelope
/// headers, filtering against the outbound list. Transient envelope
/// headers (`id`, `timestamp`, `replyChannel`, `errorChannel`) never cross
/// in either direction, and an individual header failure is logged and
/// skipped without aborting the operation.
pub struct ProtocolHeaderMapper<P: ProtocolHeaders> {
    direction: MapperDirection,
    descriptor: &'static HeaderDescriptor,
    inbound_header_names: Vec<String>,
    outbound_header_names: Vec<String>,
    user_defined_header_prefix: String,
    _protocol: PhantomData<fn(P)>,
}

impl<P: ProtocolHeaders> Debug for ProtocolHeaderMapper<P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProtocolHeaderMapper")
            .field("direction", &self.direction)
            .field("standard_prefix", &self.descriptor.prefix)
            .field("inbound_header_names", &self.inbound_header_names)
            .field("outbound_header_names", &self.outbound_header_names)
            .field("user_defined_header_prefix", &self.user_defined_header_prefix)
            .finish()
    }
}

impl<P: ProtocolHeaders> ProtocolHeaderMapper<P> {
    /// Creates a mapper with direction-dependent defaults: the standard
    /// request names flow toward the transport's request side and the
    /// standard reply names back.
    pub fn new(direction: MapperDirection) -> Self {
        Self::with_options(direction, MapperOptions::default())
    }

    /// Creates a mapper, overriding defaults with `options`.
    pub fn with_options(direction: MapperDirection, options: MapperOptions) -> Self {
        let descriptor = P::descriptor();
        let (inbound_default, outbound_default) = match direction {
            MapperDirection::Inbound => {
                (descriptor.request_header_names, descriptor.reply_header_names)
            }
            MapperDirection::Outbound => {
                (descriptor.reply_header_names, descriptor.request_header_names)
            }
        };
        Self {
            direction,
            descriptor,
            inbound_header_names: options
                .inbound_header_names
                .unwrap_or_else(|| to_owned(inbound_default)),
            outbound_header_names: options
                .outbound_header_names
                .unwrap_or_else(|| to_owned(outbound_default)),
            user_defined_header_prefix: options.user_defined_header_prefix.unwrap_or_default(),
            _protocol: PhantomData,
        }
    }

    /// Which side of the transport this mapper serves.
    pub fn direction(&self) -> MapperDirection {
        self.direction
    }

    fn should_map(&self, name: &str, patterns: &[String]) -> bool {
        if name.is_empty() || TRANSIENT_HEADER_NAMES.contains(&name) {
            return false;
        }
        let lowered = name.to_lowercase();
        for pattern in patterns {
            if simple_match(&pattern.to_lowercase(), &lowered) {
                debug!(header = %name, %pattern, "header will be mapped");
                return true;
            }
            if pattern == STANDARD_REQUEST_HEADERS
                && contains_ignore_case(self.descriptor.request_header_names, name)
            {
                debug!(header = %name, %pattern, "header will be mapped");
                return true;
            }
            if pattern == STANDARD_REPLY_HEADERS
                && contains_ignore_case(self.descriptor.reply_header_names, name)
            {
                debug!(header = %name, %pattern, "header will be mapped");
                return true;
            }
        }
        debug!(header = %name, "header will not be mapped");
        false
    }

    fn is_standard(&self, name: &str) -> bool {
        contains_ignore_case(self.descriptor.request_header_names, name)
            || contains_ignore_case(self.descriptor.reply_header_names, name)
    }

    fn copy_extracted(
        &self,
        prefix: &str,
        entries: Vec<(String, HeaderValue)>,
        target: &mut HeaderMap,
    ) {
        for (name, value) in entries {
            let full_name = add_prefix_if_necessary(prefix, &name);
            if self.should_map(&full_name, &self.inbound_header_names) {
                target.insert(full_name, value);
            }
        }
    }
}

impl<P: ProtocolHeaders> HeaderMapper<P> for ProtocolHeaderMapper<P> {
    fn to_headers(&self, source: &P) -> HeaderMap {
        let mut headers = HeaderMap::new();
        self.copy_extracted(
            self.descriptor.prefix,
            source.extract_standard_headers(),
            &mut headers,
        );
        self.copy_extracted(
            &self.user_defined_header_prefix,
            source.extract_user_headers(),
            &mut headers,
        );
        trace!(mapped = headers.len(), "extracted headers from transport");
        headers
    }

    fn from_headers(&self, headers: &HeaderMap, target: &mut P) {
        for (name, value) in headers.iter() {
            if !self.should_map(name, &self.outbound_header_names) {
                continue;
            }
            let result = if self.is_standard(name) {
                target.populate_standard_header(name, value)
            } else {
                let prefixed =
                    add_prefix_if_necessary(&self.user_defined_header_prefix, name);
                target.populate_user_header(&prefixed, value)
            };
            if let Err(error) = result {
                warn!(header = %name, %error, "failed to map header to target, skipping");
            }
        }
    }
}

fn add_prefix_if_necessary(prefix: &str, name: &str) -> String {
    if prefix.is_empty() || name.starts_with(prefix) {
        name.to_string()
    } else {
        format!("{prefix}{name}")
    }
}

fn contains_ignore_case(names: &[&str], candidate: &str) -> bool {
    names.iter().any(|name| name.eq_ignore_ascii_case(candidate))
}

fn to_owned(names: &[&str]) -> Vec<String> {
    names.iter().map(|name| name.to_string()).collect()
}
