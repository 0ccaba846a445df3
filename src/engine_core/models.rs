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

//! Domain models for the egress guard.
//!
//! This module contains pure data structures representing chunks, policies,
//! requests, and decisions. It is designed to be free of I/O side effects.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

use crate::engine_core::constants;
use crate::engine_core::errors::GuardError;

/// Provenance class of ingested content.
///
/// Trusted content comes from the operator or first-party systems; untrusted
/// content is anything read from the outside world (web pages, inbound email,
/// third-party documents).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrustZone {
    Trusted,
    Untrusted,
}

impl std::fmt::Display for TrustZone {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TrustZone::Trusted => write!(f, "trusted"),
            TrustZone::Untrusted => write!(f, "untrusted"),
        }
    }
}

/// A single piece of content the agent has ingested, stamped with provenance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Chunk {
    pub chunk_id: String,
    pub session_id: String,
    pub text: String,
    pub trust_zone: TrustZone,
    pub source: String,
    pub language: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Lexical data classes the DLP scanner knows about.
///
/// Ordered so findings maps serialize with a stable key order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DlpCategory {
    ApiKey,
    Email,
    Jwt,
    Otp,
    Phone,
}

impl DlpCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            DlpCategory::ApiKey => "api_key",
            DlpCategory::Email => "email",
            DlpCategory::Jwt => "jwt",
            DlpCategory::Otp => "otp",
            DlpCategory::Phone => "phone",
        }
    }
}

impl std::fmt::Display for DlpCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for DlpCategory {
    type Err = GuardError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "api_key" => Ok(DlpCategory::ApiKey),
            "email" => Ok(DlpCategory::Email),
            "jwt" => Ok(DlpCategory::Jwt),
            "otp" => Ok(DlpCategory::Otp),
            "phone" => Ok(DlpCategory::Phone),
            other => Err(GuardError::PolicyLoad(format!(
                "unknown DLP category '{}'",
                other
            ))),
        }
    }
}

/// Request body for content ingestion.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngestRequest {
    pub session_id: String,
    pub text: String,
    pub trust_zone: TrustZone,
    pub source: String,
    #[serde(default)]
    pub language: Option<String>,
}

/// Chunk ids the caller claims justify parts of an outbound request.
///
/// Accepted as-is; the ids are surfaced to operators but never verified
/// against the store.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Evidence {
    #[serde(default)]
    pub chunk_ids: Vec<String>,
}

/// Request body for an outbound email send.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SendEmailRequest {
    pub session_id: String,
    pub to: String,
    #[serde(default)]
    pub subject: String,
    pub body: String,
    #[serde(default)]
    pub evidence_to: Evidence,
    #[serde(default)]
    pub evidence_body: Evidence,
}

/// Terminal outcome of a send evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Decision {
    Allow,
    AllowWithRedaction,
    RequireConfirmation,
    Block,
}

impl std::fmt::Display for Decision {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Decision::Allow => write!(f, "ALLOW"),
            Decision::AllowWithRedaction => write!(f, "ALLOW_WITH_REDACTION"),
            Decision::RequireConfirmation => write!(f, "REQUIRE_CONFIRMATION"),
            Decision::Block => write!(f, "BLOCK"),
        }
    }
}

/// Raw provenance measurements over a session's untrusted chunks.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProvenanceSignals {
    pub untrusted_chunk_ids: Vec<String>,
    pub to_tainted_by_untrusted: bool,
    pub body_overlap_ratio_with_untrusted: f64,
}

/// Everything the engine measured while deciding, echoed to callers and
/// recorded in the audit trail.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecisionSignals {
    /// Lower-cased recipient domain; empty when the address has no `@`.
    pub to_domain: String,
    pub untrusted_chunk_ids: Vec<String>,
    pub to_tainted_by_untrusted: bool,
    pub body_overlap_ratio_with_untrusted: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dlp_block_findings: Option<BTreeMap<DlpCategory, usize>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dlp_redact_findings: Option<BTreeMap<DlpCategory, usize>>,
}

/// Full response to a send request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecisionResponse {
    pub decision: Decision,
    pub reason: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub redacted_body: Option<String>,
    pub signals: DecisionSignals,
}

/// Destination policy for outbound email.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EmailPolicy {
    /// Domains that may receive mail. Empty means any domain not blocked.
    #[serde(default)]
    pub allowed_domains: Vec<String>,
    /// Domains that must never receive mail. Takes precedence over the
    /// allowlist.
    #[serde(default)]
    pub blocked_domains: Vec<String>,
    /// When set, a recipient address found inside untrusted content blocks
    /// the send.
    #[serde(default)]
    pub require_confirmation_on_untrusted_provenance: bool,
}

fn default_max_overlap() -> f64 {
    constants::policy::DEFAULT_MAX_OVERLAP_RATIO
}

/// DLP policy: which categories hard-block a send, which are redacted, and
/// the overlap threshold above which a body is treated as exfiltration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DlpPolicy {
    #[serde(default)]
    pub block_on: Vec<DlpCategory>,
    #[serde(default)]
    pub redact_on: Vec<DlpCategory>,
    #[serde(default = "default_max_overlap")]
    pub max_untrusted_overlap_ratio: f64,
}

impl Default for DlpPolicy {
    fn default() -> Self {
        Self {
            block_on: Vec::new(),
            redact_on: Vec::new(),
            max_untrusted_overlap_ratio: default_max_overlap(),
        }
    }
}

/// Top-level policy document.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PolicyDefinition {
    #[serde(default)]
    pub email: EmailPolicy,
    #[serde(default)]
    pub dlp: DlpPolicy,
}

impl PolicyDefinition {
    /// Load a policy document from a YAML file.
    pub fn load(path: &Path) -> Result<Self, GuardError> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            GuardError::PolicyLoad(format!("cannot read {}: {}", path.display(), e))
        })?;
        serde_yaml_ng::from_str(&content).map_err(|e| {
            GuardError::PolicyLoad(format!("cannot parse {}: {}", path.display(), e))
        })
    }
}
