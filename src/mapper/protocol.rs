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

use crate::message::{FlowError, HeaderValue};

/// Pattern token selecting every header on a protocol's standard request
/// list.
pub const STANDARD_REQUEST_HEADERS: &str = "STANDARD_REQUEST_HEADERS";

/// Pattern token selecting every header on a protocol's standard reply
/// list.
pub const STANDARD_REPLY_HEADERS: &str = "STANDARD_REPLY_HEADERS";

/// A protocol's header constants: its namespace prefix and the names it
/// reserves for requests and replies.
///
/// Adapters declare one `static` descriptor per protocol; the mapper reads
/// it once at construction. Names are listed in full, prefix included.
#[derive(Debug, Clone, Copy)]
pub struct HeaderDescriptor {
    /// The protocol's namespace for its own reserved names, e.g. `amqp_`.
    pub prefix: &'static str,
    /// Standard header names used on requests.
    pub request_header_names: &'static [&'static str],
    /// Standard header names used on replies.
    pub reply_header_names: &'static [&'static str],
}

/// Which side of a transport an adapter sits on.
///
/// The direction decides which standard list seeds which pattern default:
/// an inbound adapter maps requests in and replies out, an outbound
/// adapter the reverse.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MapperDirection {
    /// The adapter receives requests from the transport.
    Inbound,
    /// The adapter sends requests to the transport.
    Outbound,
}

/// The adapter seam between the mapper core and a transport's native
/// header model.
///
/// Implementations extract and populate headers one at a time; the mapper
/// core owns direction, pattern, prefix, and transient-name policy.
pub trait ProtocolHeaders: Debug {
    /// The protocol's header descriptor.
    fn descriptor() -> &'static HeaderDescriptor
    where
        Self: Sized;

    /// Extracts the protocol-defined headers present on this instance.
    fn extract_standard_headers(&self) -> Vec<(String, HeaderValue)>;

    /// Extracts the user-defined headers present on this instance.
    fn extract_user_headers(&self) -> Vec<(String, HeaderValue)>;

    /// Sets one protocol-defined header. An `Err` makes the mapper log
    /// and skip this header only.
    fn populate_standard_header(
        &mut self,
        name: &str,
        value: &HeaderValue,
    ) -> Result<(), FlowError>;

    /// Sets one user-defined header. An `Err` makes the mapper log and
    /// skip this header only.
    fn populate_user_header(&mut self, name: &str, value: &HeaderValue) -> Result<(), FlowError>;
}
