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

use std::sync::Once;

use tracing::Level;
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

// Re-export handlers and payloads for easy access within tests.
pub use handlers::*;
pub use payloads::*;

// Declare the submodules.
mod handlers;
mod payloads;

// Ensures tracing initialization happens only once across all tests.
static INIT: Once = Once::new();

/// Initializes the global tracing subscriber for tests.
///
/// Uses `std::sync::Once` so the subscriber is installed exactly once no
/// matter how many tests call this.
pub fn initialize_tracing() {
    INIT.call_once(|| {
        let filter = EnvFilter::new("")
            .add_directive("flowbus::channel::direct=warn".parse().unwrap())
            .add_directive("flowbus::channel::queue=warn".parse().unwrap())
            .add_directive("flowbus::router=debug".parse().unwrap())
            .add_directive("flowbus::mapper=warn".parse().unwrap())
            .add_directive("flowbus::common::registry=debug".parse().unwrap())
            .add_directive("router_tests=debug".parse().unwrap())
            .add_directive("registry_tests=debug".parse().unwrap())
            .add_directive(tracing_subscriber::filter::LevelFilter::ERROR.into());

        let subscriber = FmtSubscriber::builder()
            .with_span_events(FmtSpan::NONE)
            .with_max_level(Level::TRACE)
            .compact()
            .with_line_number(true)
            .without_time()
            .with_target(true)
            .with_env_filter(filter)
            .finish();

        tracing::subscriber::set_global_default(subscriber)
            .expect("setting default subscriber failed");
    });
}
