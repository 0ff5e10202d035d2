// Copyright 2023-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use std::env;

/// Process configuration read from the environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamingConfig {
    /// Log level or filter directive (e.g., trace, debug, info, warn, error)
    pub log_level: String,
    /// Whether the local pipeline writes summaries in leaderboard order
    pub ranked: bool,
}

impl Default for StreamingConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            ranked: false,
        }
    }
}

impl StreamingConfig {
    /// Create configuration from environment variables
    pub fn from_env() -> Self {
        let defaults = Self::default();
        let log_level = env::var("LEADERBOARD_LOG_LEVEL")
            .map(|val| val.trim().to_lowercase())
            .ok()
            .filter(|val| !val.is_empty())
            .unwrap_or(defaults.log_level);
        let ranked = env::var("LEADERBOARD_RANKED")
            .map(|val| matches!(val.trim().to_lowercase().as_str(), "true" | "1"))
            .unwrap_or(defaults.ranked);

        Self { log_level, ranked }
    }
}
