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

//! Payload types with explicit type lineages for payload-type routing
//! tests. The lineages model a small collections/documents domain.

use std::any::Any;

use flowbus::prelude::*;

/// A plain leaf type with no parents or traits.
#[derive(Debug, Clone)]
pub struct PlainText(pub String);

impl Payload for PlainText {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn type_hierarchy(&self) -> TypeHierarchy {
        TypeHierarchy::of("text::PlainText")
    }
}

/// A counter whose lineage has a numeric parent type.
#[derive(Debug, Clone)]
pub struct SmallCount(pub i32);

impl Payload for SmallCount {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn type_hierarchy(&self) -> TypeHierarchy {
        TypeHierarchy::of("num::SmallCount").parent("num::Numeric")
    }
}

/// A list type implementing a trait at its own level and descending from
/// an abstract base: the analog of a concrete list in a collections
/// hierarchy.
#[derive(Debug, Clone)]
pub struct GrowableList(pub Vec<String>);

impl Payload for GrowableList {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn type_hierarchy(&self) -> TypeHierarchy {
        TypeHierarchy::of("coll::GrowableList")
            .with_traits(["coll::List"])
            .parent("coll::AbstractCollection")
            .with_traits(["coll::Iterable"])
    }
}

/// A batch of growable lists: the array form of [`GrowableList`].
#[derive(Debug, Clone)]
pub struct GrowableListBatch(pub Vec<GrowableList>);

impl Payload for GrowableListBatch {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn type_hierarchy(&self) -> TypeHierarchy {
        TypeHierarchy::of("coll::GrowableList")
            .with_traits(["coll::List"])
            .parent("coll::AbstractCollection")
            .array()
    }
}

/// A type implementing two traits at the same level, used to provoke
/// routing ambiguity when both are mapped.
#[derive(Debug, Clone)]
pub struct TwoFaced;

impl Payload for TwoFaced {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn type_hierarchy(&self) -> TypeHierarchy {
        TypeHierarchy::of("dual::TwoFaced").with_traits(["dual::Reader", "dual::Writer"])
    }
}
