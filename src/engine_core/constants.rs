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

//! egress-guard Constants - Single source of truth for all configuration values.
//!
//! This module centralizes all magic numbers, defaults, and environment
//! variable names to ensure consistency and maintainability.

/// Chunk store and audit log constants
pub mod store {
    /// Default number of chunks returned by a recent-chunks lookup
    pub const RECENT_LIMIT: usize = 20;
    /// Default number of audit events returned by a log query
    pub const EVENTS_LIMIT: usize = 200;
    /// Default per-session retention window (oldest chunks evicted beyond this)
    pub const MAX_CHUNKS_PER_SESSION: usize = 256;
    /// Capacity of the in-memory audit event ring
    pub const EVENTS_CAPACITY: usize = 4096;
    /// Prefix of every generated chunk identifier
    pub const CHUNK_ID_PREFIX: &str = "chunk_";
    /// Number of UUID hex characters appended to the chunk id prefix
    pub const CHUNK_ID_HEX_LEN: usize = 10;
}

/// Provenance evaluation constants
pub mod provenance {
    /// Shingle width, in whitespace tokens, for overlap computation
    pub const SHINGLE_TOKENS: usize = 6;
}

/// DLP scanning constants
pub mod dlp {
    /// Replacement text for redacted spans
    pub const REDACTION_PLACEHOLDER: &str = "[REDACTED]";
}

/// Policy defaults
pub mod policy {
    /// Maximum tolerated overlap ratio with untrusted content when the
    /// policy document omits one
    pub const DEFAULT_MAX_OVERLAP_RATIO: f64 = 0.2;
}

/// Configuration Environment Variables
pub mod config {
    pub const ENV_POLICY_PATH: &str = "EGRESS_GUARD_POLICY_PATH";
    pub const ENV_AUDIT_LOG_PATH: &str = "EGRESS_GUARD_AUDIT_LOG";
    pub const ENV_LISTEN_ADDR: &str = "EGRESS_GUARD_LISTEN";
    pub const ENV_LOG_LEVEL: &str = "LOG_LEVEL";
    pub const ENV_LOG_FORMAT: &str = "LOG_FORMAT";
    pub const ENV_MAX_CHUNKS_PER_SESSION: &str = "EGRESS_GUARD_MAX_CHUNKS_PER_SESSION";

    pub const DEFAULT_AUDIT_LOG_PATH: &str = "/tmp/egress_guard_audit.jsonl";
    pub const DEFAULT_LISTEN_ADDR: &str = "127.0.0.1:8000";
}
