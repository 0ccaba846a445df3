// Copyright 2026 BadCompany
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use crate::engine_core::constants::config as env_names;
use crate::engine_core::constants::store;
use crate::engine_core::errors::GuardError;
use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub policy_path: Option<PathBuf>,
    pub audit_log_path: PathBuf,
    pub listen_addr: String,
    pub log_level: String,
    pub log_format: String, // "json" or "text"
    pub max_chunks_per_session: usize,
}

impl Config {
    pub fn from_env() -> Result<Self, GuardError> {
        let max_chunks_per_session = match env::var(env_names::ENV_MAX_CHUNKS_PER_SESSION) {
            Ok(raw) => raw.parse().map_err(|_| {
                GuardError::ConfigurationError(format!(
                    "{} must be a positive integer, got '{}'",
                    env_names::ENV_MAX_CHUNKS_PER_SESSION,
                    raw
                ))
            })?,
            Err(_) => store::MAX_CHUNKS_PER_SESSION,
        };

        Ok(Self {
            policy_path: env::var(env_names::ENV_POLICY_PATH).ok().map(PathBuf::from),
            audit_log_path: env::var(env_names::ENV_AUDIT_LOG_PATH)
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from(env_names::DEFAULT_AUDIT_LOG_PATH)),
            listen_addr: env::var(env_names::ENV_LISTEN_ADDR)
                .unwrap_or_else(|_| env_names::DEFAULT_LISTEN_ADDR.to_string()),
            log_level: env::var(env_names::ENV_LOG_LEVEL).unwrap_or_else(|_| "info".to_string()),
            log_format: env::var(env_names::ENV_LOG_FORMAT)
                .unwrap_or_else(|_| "text".to_string()),
            max_chunks_per_session,
        })
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            policy_path: None,
            audit_log_path: PathBuf::from(env_names::DEFAULT_AUDIT_LOG_PATH),
            listen_addr: env_names::DEFAULT_LISTEN_ADDR.to_string(),
            log_level: "info".to_string(),
            log_format: "text".to_string(),
            max_chunks_per_session: store::MAX_CHUNKS_PER_SESSION,
        }
    }
}
