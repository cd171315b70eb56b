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

use crate::message::HeaderMap;

/// Bidirectional translation between envelope headers and a transport's
/// native header model `T`.
///
/// Neither direction fails: individual header problems are logged and the
/// header skipped, so one bad value never aborts a whole map operation.
pub trait HeaderMapper<T>: Send + Sync {
    /// Extracts headers from a transport-native `source` into an envelope
    /// header map.
    fn to_headers(&self, source: &T) -> HeaderMap;

    /// Populates a transport-native `target` from envelope headers.
    fn from_headers(&self, headers: &HeaderMap, target: &mut T);
}
