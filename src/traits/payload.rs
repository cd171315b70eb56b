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

use std::any::Any;
use std::fmt::Debug;

/// The capability required of envelope payloads.
///
/// Payloads are opaque to the framework: any `Any + Debug + Send + Sync`
/// value qualifies. `as_any` enables downcasting back to the concrete type
/// at the consuming end.
///
/// [`type_hierarchy`](Self::type_hierarchy) exists for payload-type
/// routing. The default is a single level named after the concrete type,
/// which is all a payload needs unless it passes through a
/// [`PayloadTypeRouter`](crate::router::PayloadTypeRouter) and wants
/// supertype or trait-level mappings to apply; such payloads override it
/// with an explicit lineage.
pub trait Payload: Any + Debug + Send + Sync {
    /// Returns the payload as a dynamic [`Any`] for downcasting.
    fn as_any(&self) -> &dyn Any;

    /// The payload's type lineage, used by payload-type routing to produce
    /// destination candidates from most to least specific.
    fn type_hierarchy(&self) -> TypeHierarchy {
        TypeHierarchy::of(std::any::type_name_of_val(self))
    }
}

/// One level of a payload's type lineage: the type at that level plus the
/// traits directly implemented there.
#[derive(Debug, Clone)]
pub struct TypeLevel {
    /// The type name at this level, if any.
    pub type_name: Option<String>,
    /// Names of the traits directly implemented at this level.
    pub trait_names: Vec<String>,
}

/// An ordered, sender-supplied description of a payload's type lineage.
///
/// Level 0 is the concrete type itself; each later level is a supertype.
/// A hierarchy flagged as an array routes on the element lineage with a
/// `[]` suffix appended to every candidate.
///
/// ```
/// use flowbus::prelude::TypeHierarchy;
///
/// let lineage = TypeHierarchy::of("orders::RushOrder")
///     .with_traits(["orders::Expedited"])
///     .parent("orders::Order")
///     .with_traits(["orders::Auditable"]);
/// assert_eq!(lineage.levels().len(), 2);
/// ```
#[derive(Debug, Clone)]
pub struct TypeHierarchy {
    array: bool,
    levels: Vec<TypeLevel>,
}

impl TypeHierarchy {
    /// Starts a lineage at the concrete type `name`.
    pub fn of(name: impl Into<String>) -> Self {
        Self {
            array: false,
            levels: vec![TypeLevel {
                type_name: Some(name.into()),
                trait_names: Vec::new(),
            }],
        }
    }

    /// Appends a supertype level.
    pub fn parent(mut self, name: impl Into<String>) -> Self {
        self.levels.push(TypeLevel {
            type_name: Some(name.into()),
            trait_names: Vec::new(),
        });
        self
    }

    /// Declares the traits directly implemented at the most recently added
    /// level.
    pub fn with_traits<I, S>(mut self, traits: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        if let Some(level) = self.levels.last_mut() {
            level.trait_names.extend(traits.into_iter().map(Into::into));
        }
        self
    }

    /// Marks the payload as an array of the described element type.
    pub fn array(mut self) -> Self {
        self.array = true;
        self
    }

    /// Whether the payload is an array of the described element type.
    pub fn is_array(&self) -> bool {
        self.array
    }

    /// The lineage levels, most specific first.
    pub fn levels(&self) -> &[TypeLevel] {
        &self.levels
    }
}

macro_rules! impl_payload {
    ($($ty:ty),* $(,)?) => {
        $(
            impl Payload for $ty {
                fn as_any(&self) -> &dyn Any {
                    self
                }
            }
        )*
    };
}

impl_payload!(String, &'static str, i32, i64, u32, u64, f64, bool, Vec<u8>);
