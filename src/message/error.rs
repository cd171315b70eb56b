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

use thiserror::Error;

/// Errors surfaced by channels, routers, mappers, and the registry.
///
/// Routers recover from `ChannelResolution` when resolution is not
/// required and from `Delivery` when send failures are ignored;
/// `HeaderMapping` is always recovered locally by the mapper (logged and
/// skipped). Everything else propagates to the caller.
#[derive(Debug, Error)]
pub enum FlowError {
    /// A channel name could not be resolved to a channel instance.
    #[error("failed to resolve channel name '{name}'")]
    ChannelResolution {
        /// The name that failed to resolve.
        name: String,
    },

    /// A message could not be delivered to any destination.
    #[error("message delivery failed: {detail}")]
    Delivery {
        /// What went wrong.
        detail: String,
    },

    /// A router key could not be coerced to a channel or channel name.
    #[error("unsupported router key: {detail}")]
    Conversion {
        /// Description of the offending key.
        detail: String,
    },

    /// Adding destination candidates would exceed a router's cap.
    #[error("unresolvable ambiguity while selecting destination channels: {detail}")]
    Ambiguity {
        /// Description of the conflicting candidates.
        detail: String,
    },

    /// A component was used with invalid arguments.
    #[error("{0}")]
    Argument(String),

    /// An operation was requested of a channel whose subtype does not
    /// support it.
    #[error("channel capability not supported: {detail}")]
    Capability {
        /// The missing capability.
        detail: String,
    },

    /// A single header failed to map across a transport boundary.
    #[error("failed to map header '{name}': {detail}")]
    HeaderMapping {
        /// The header that failed.
        name: String,
        /// Why mapping failed.
        detail: String,
    },
}

impl FlowError {
    pub(crate) fn resolution(name: impl Into<String>) -> Self {
        FlowError::ChannelResolution { name: name.into() }
    }

    pub(crate) fn delivery(detail: impl Into<String>) -> Self {
        FlowError::Delivery {
            detail: detail.into(),
        }
    }

    pub(crate) fn conversion(detail: impl Into<String>) -> Self {
        FlowError::Conversion {
            detail: detail.into(),
        }
    }

    pub(crate) fn ambiguity(detail: impl Into<String>) -> Self {
        FlowError::Ambiguity {
            detail: detail.into(),
        }
    }

    pub(crate) fn argument(detail: impl Into<String>) -> Self {
        FlowError::Argument(detail.into())
    }

    pub(crate) fn capability(detail: impl Into<String>) -> Self {
        FlowError::Capability {
            detail: detail.into(),
        }
    }

    /// Builds a per-header mapping error. Adapters use this from their
    /// population hooks; the mapper core logs and skips it.
    pub fn header_mapping(name: impl Into<String>, detail: impl Into<String>) -> Self {
        FlowError::HeaderMapping {
            name: name.into(),
            detail: detail.into(),
        }
    }
}
