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

//! Decision engine.
//!
//! Evaluates outbound sends against destination policy, DLP, and provenance
//! as a precedence-ordered sequence of checks. The first matching check is
//! terminal. Every outcome is recorded in the audit trail before it is
//! returned.

use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::engine::{dlp::DlpScanner, provenance};
use crate::engine_core::audit::AuditEvent;
use crate::engine_core::constants;
use crate::engine_core::models::{
    Chunk, Decision, DecisionResponse, DecisionSignals, IngestRequest, PolicyDefinition,
    SendEmailRequest,
};
use crate::engine_core::store::ChunkStore;

/// Outbound delivery collaborator. Invoked only on ALLOW and
/// ALLOW_WITH_REDACTION; failures are logged, never retried.
#[async_trait]
pub trait Deliverer: Send + Sync {
    async fn deliver(&self, to: &str, subject: &str, body: &str) -> anyhow::Result<()>;
}

/// Logs the message instead of sending it. No real email leaves the process.
pub struct SimulatedDeliverer;

#[async_trait]
impl Deliverer for SimulatedDeliverer {
    async fn deliver(&self, to: &str, subject: &str, body: &str) -> anyhow::Result<()> {
        info!(to, subject, body, "simulated email send");
        Ok(())
    }
}

/// Lower-cased domain of an email address; empty when there is no `@`.
pub fn recipient_domain(email: &str) -> String {
    match email.trim().split_once('@') {
        Some((_, domain)) => domain.to_lowercase().trim().to_string(),
        None => String::new(),
    }
}

pub struct DecisionEngine {
    store: Arc<ChunkStore>,
    policy: Arc<PolicyDefinition>,
    dlp: DlpScanner,
    deliverer: Arc<dyn Deliverer>,
}

impl DecisionEngine {
    pub fn new(
        store: Arc<ChunkStore>,
        policy: Arc<PolicyDefinition>,
        dlp: DlpScanner,
        deliverer: Arc<dyn Deliverer>,
    ) -> Self {
        Self {
            store,
            policy,
            dlp,
            deliverer,
        }
    }

    /// Store one chunk of ingested content.
    pub fn ingest(&self, req: &IngestRequest) -> Chunk {
        self.store.ingest(req)
    }

    /// Recent audit events, oldest first.
    pub fn audit_events(&self, limit: usize) -> Vec<AuditEvent> {
        self.store.events(limit)
    }

    /// Evaluate one outbound send against the policy.
    ///
    /// Checks run in fixed precedence order; the first match is terminal:
    /// blocked domain, allowlist, DLP hard-block, tainted recipient, body
    /// overlap, redaction, allow.
    pub async fn decide_send_email(&self, req: &SendEmailRequest) -> DecisionResponse {
        let recent = self
            .store
            .recent(&req.session_id, constants::store::RECENT_LIMIT);
        let prov = provenance::evaluate(&req.to, &req.body, &recent);
        let domain = recipient_domain(&req.to);

        if !req.evidence_to.chunk_ids.is_empty() || !req.evidence_body.chunk_ids.is_empty() {
            debug!(
                session_id = %req.session_id,
                evidence_to = ?req.evidence_to.chunk_ids,
                evidence_body = ?req.evidence_body.chunk_ids,
                "caller-claimed evidence (unverified)"
            );
        }

        let mut signals = DecisionSignals {
            to_domain: domain.clone(),
            untrusted_chunk_ids: prov.untrusted_chunk_ids,
            to_tainted_by_untrusted: prov.to_tainted_by_untrusted,
            body_overlap_ratio_with_untrusted: prov.body_overlap_ratio_with_untrusted,
            dlp_block_findings: None,
            dlp_redact_findings: None,
        };

        // Destination policy
        if self.policy.email.blocked_domains.iter().any(|d| d == &domain) {
            let reason = format!("BLOCK: recipient domain '{}' is blocked", domain);
            return self.finish(req, Decision::Block, reason, None, signals);
        }

        let allowed = &self.policy.email.allowed_domains;
        if !allowed.is_empty() && !allowed.iter().any(|d| d == &domain) {
            let reason = format!("BLOCK: recipient domain '{}' is not in allowlist", domain);
            return self.finish(req, Decision::Block, reason, None, signals);
        }

        // DLP hard blocks
        let dlp_block = self.dlp.detect(&req.body, &self.policy.dlp.block_on);
        if !dlp_block.is_empty() {
            let categories: Vec<_> = dlp_block.keys().copied().collect();
            let reason = format!(
                "BLOCK: DLP detected high-risk data types: {}",
                format_category_list(&categories)
            );
            signals.dlp_block_findings = Some(dlp_block);
            return self.finish(req, Decision::Block, reason, None, signals);
        }

        // Provenance/taint enforcement
        if signals.to_tainted_by_untrusted
            && self.policy.email.require_confirmation_on_untrusted_provenance
        {
            let reason =
                "BLOCK: recipient address appears to come from untrusted content".to_string();
            return self.finish(req, Decision::Block, reason, None, signals);
        }

        // Overlap threshold: copying large parts of untrusted content out is
        // treated as exfiltration
        if signals.body_overlap_ratio_with_untrusted
            >= self.policy.dlp.max_untrusted_overlap_ratio
        {
            let reason = format!(
                "BLOCK: outbound body overlaps heavily with untrusted content (ratio={:.3})",
                signals.body_overlap_ratio_with_untrusted
            );
            return self.finish(req, Decision::Block, reason, None, signals);
        }

        // Redaction pass
        let redaction = self.dlp.scan_and_redact(&req.body, &self.policy.dlp.redact_on);
        if !redaction.matched.is_empty() {
            let mut matched = redaction.matched.clone();
            matched.sort();
            let reason = format!(
                "ALLOW_WITH_REDACTION: redacted {}",
                format_category_list(&matched)
            );
            signals.dlp_redact_findings = Some(redaction.findings);
            self.deliver(&req.to, &req.subject, &redaction.redacted_text)
                .await;
            return self.finish(
                req,
                Decision::AllowWithRedaction,
                reason,
                Some(redaction.redacted_text),
                signals,
            );
        }

        let reason = "ALLOW: passed destination, DLP, and provenance checks".to_string();
        self.deliver(&req.to, &req.subject, &req.body).await;
        self.finish(req, Decision::Allow, reason, None, signals)
    }

    fn finish(
        &self,
        req: &SendEmailRequest,
        decision: Decision,
        reason: String,
        redacted_body: Option<String>,
        signals: DecisionSignals,
    ) -> DecisionResponse {
        self.store
            .log_decision(&req.session_id, &req.to, decision, &reason, &signals);
        DecisionResponse {
            decision,
            reason,
            redacted_body,
            signals,
        }
    }

    async fn deliver(&self, to: &str, subject: &str, body: &str) {
        if let Err(e) = self.deliverer.deliver(to, subject, body).await {
            warn!(error = %e, to, "delivery failed");
        }
    }
}

// Reason strings are part of the audit contract; keep the single-quoted,
// sorted list form downstream consumers already parse.
fn format_category_list(categories: &[crate::engine_core::models::DlpCategory]) -> String {
    let items: Vec<String> = categories.iter().map(|c| format!("'{}'", c)).collect();
    format!("[{}]", items.join(", "))
}
