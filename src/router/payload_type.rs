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

use std::ops::{Deref, DerefMut};

use async_trait::async_trait;

use crate::common::ResolverRef;
use crate::message::{Envelope, FlowError};
use crate::router::message_router::{ChannelKey, MessageRouter, RouteStrategy, RouterConfig};
use crate::traits::MessageHandler;

const ARRAY_SUFFIX: &str = "[]";

/// Routing strategy that selects a destination by walking the payload's
/// type lineage.
///
/// Mapping keys are type names. Candidates are emitted level by level,
/// the type at each level before the traits directly implemented there,
/// which yields the selection order: exact type, then direct traits, then
/// the parent type, then its traits, and so on. The trait names of one
/// level fold into a single comma-delimited candidate, so two mapped
/// traits at the same level surface as an ambiguity rather than an
/// arbitrary pick. At most one destination; keys absent from the mapping
/// dictionary never act as channel names.
#[derive(Debug, Default, Clone, Copy)]
pub struct PayloadTypeStrategy;

impl RouteStrategy for PayloadTypeStrategy {
    fn channel_keys(&self, envelope: &Envelope) -> Vec<ChannelKey> {
        let hierarchy = envelope.payload().type_hierarchy();
        let is_array = hierarchy.is_array();
        let mut type_candidates: Vec<Vec<String>> = Vec::new();
        let mut trait_candidates: Vec<Vec<String>> = Vec::new();
        for level in hierarchy.levels() {
            if let Some(type_name) = &level.type_name {
                add_candidate(vec![type_name.clone()], is_array, &mut type_candidates);
            }
            if !level.trait_names.is_empty() {
                add_candidate(level.trait_names.clone(), is_array, &mut trait_candidates);
            }
        }
        let depth = type_candidates.len().max(trait_candidates.len());
        let mut all = Vec::new();
        for level in 0..depth {
            if let Some(group) = type_candidates.get(level) {
                all.extend(group.iter().filter(|name| !name.is_empty()).cloned());
            }
            if let Some(group) = trait_candidates.get(level) {
                all.extend(group.iter().filter(|name| !name.is_empty()).cloned());
            }
        }
        all.into_iter().map(ChannelKey::Name).collect()
    }

    fn max_destinations(&self) -> Option<usize> {
        Some(1)
    }

    fn fallback_to_channel_name_lookup(&self) -> bool {
        false
    }
}

/// Folds one level's names into a candidate group, suffixing array
/// candidates and skipping names already present at an earlier level.
fn add_candidate(names: Vec<String>, is_array: bool, candidates: &mut Vec<Vec<String>>) {
    if !is_array {
        let joined = names.join(",");
        if !contains_candidate(&joined, candidates) {
            candidates.push(vec![joined]);
        }
        return;
    }
    let keepers: Vec<String> = names
        .into_iter()
        .map(|name| format!("{name}{ARRAY_SUFFIX}"))
        .filter(|name| !contains_candidate(name, candidates))
        .collect();
    if !keepers.is_empty() && !contains_candidate(&keepers.join(","), candidates) {
        candidates.push(keepers);
    }
}

fn contains_candidate(candidate: &str, existing: &[Vec<String>]) -> bool {
    existing
        .iter()
        .flatten()
        .any(|entry| entry.split(',').any(|part| part.trim() == candidate))
}

/// A router that selects one channel by the payload's type lineage.
///
/// Thin wrapper around a [`MessageRouter`] configured with
/// [`PayloadTypeStrategy`]; it dereferences to the inner router for
/// mapping management.
#[derive(Debug)]
pub struct PayloadTypeRouter {
    inner: MessageRouter,
}

impl PayloadTypeRouter {
    /// Creates a payload-type router resolving channel names through
    /// `resolver`.
    pub fn new(resolver: ResolverRef, config: RouterConfig) -> Self {
        Self {
            inner: MessageRouter::new(Box::new(PayloadTypeStrategy), resolver, config),
        }
    }
}

impl Deref for PayloadTypeRouter {
    type Target = MessageRouter;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

impl DerefMut for PayloadTypeRouter {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.inner
    }
}

#[async_trait]
impl MessageHandler for PayloadTypeRouter {
    async fn handle(&self, envelope: Envelope) -> Result<(), FlowError> {
        self.inner.handle(envelope).await
    }
}
