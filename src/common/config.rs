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

use std::time::Duration;

use lazy_static::lazy_static;
use serde::{Deserialize, Serialize};

/// Configuration for the Flowbus framework, loaded from TOML files in
/// XDG-compliant directories.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct FlowbusConfig {
    /// Timeout configuration.
    pub timeouts: TimeoutConfig,
    /// Limits and capacity configuration.
    pub limits: LimitsConfig,
}

/// Timeout-related configuration values.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimeoutConfig {
    /// Default router send timeout in milliseconds. Zero means unbounded.
    pub default_send_timeout_ms: u64,
}

/// Limits and capacity configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LimitsConfig {
    /// Capacity used by `QueueChannel::new`. Zero means unbounded.
    pub default_queue_capacity: usize,
    /// Initial heap allocation for priority channels.
    pub priority_heap_initial_capacity: usize,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            default_send_timeout_ms: 0,
        }
    }
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            default_queue_capacity: 0,
            priority_heap_initial_capacity: 11,
        }
    }
}

impl FlowbusConfig {
    /// The default router send timeout, `None` when unbounded.
    pub fn default_send_timeout(&self) -> Option<Duration> {
        match self.timeouts.default_send_timeout_ms {
            0 => None,
            ms => Some(Duration::from_millis(ms)),
        }
    }

    /// Load configuration from XDG-compliant locations.
    ///
    /// Looks for `flowbus/config.toml` under the XDG config directories.
    /// If no configuration file is found, returns the default
    /// configuration. If a configuration file exists but is malformed,
    /// logs an error and uses defaults.
    pub fn load() -> Self {
        use tracing::{error, info};

        let xdg_dirs = match xdg::BaseDirectories::with_prefix("flowbus") {
            Ok(dirs) => dirs,
            Err(e) => {
                error!("Failed to initialize XDG directories: {}", e);
                return Self::default();
            }
        };

        let config_path = xdg_dirs.find_config_file("config.toml");

        if let Some(path) = config_path {
            info!("Loading configuration from: {}", path.display());
            match std::fs::read_to_string(&path) {
                Ok(config_str) => match toml::from_str::<Self>(&config_str) {
                    Ok(config) => config,
                    Err(e) => {
                        error!("Failed to parse configuration file {}: {}", path.display(), e);
                        Self::default()
                    }
                },
                Err(e) => {
                    error!("Failed to read configuration file {}: {}", path.display(), e);
                    Self::default()
                }
            }
        } else {
            Self::default()
        }
    }
}

lazy_static! {
    /// Global configuration instance loaded from XDG-compliant locations.
    pub static ref CONFIG: FlowbusConfig = FlowbusConfig::load();
}
