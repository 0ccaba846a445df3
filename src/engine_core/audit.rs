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

//! Audit event schema and durable sinks.
//!
//! Every ingest and every send decision produces one [`AuditEvent`]. The wire
//! shape of serialized events is a stable contract consumed by downstream
//! tooling; do not rename or reorder fields.

use serde::{Deserialize, Serialize};
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::Path;
use std::sync::Mutex;
use tracing::info;

use crate::engine_core::models::{Decision, DecisionSignals, TrustZone};

/// A single audit record, tagged by event type.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AuditEvent {
    Ingest {
        ts: f64,
        session_id: String,
        chunk_id: String,
        trust_zone: TrustZone,
        source: String,
        /// Serialized even when absent so readers see an explicit null.
        language: Option<String>,
        chars: usize,
    },
    SendEmail {
        ts: f64,
        session_id: String,
        decision: Decision,
        reason: String,
        signals: DecisionSignals,
        to: String,
    },
}

impl AuditEvent {
    pub fn session_id(&self) -> &str {
        match self {
            AuditEvent::Ingest { session_id, .. } => session_id,
            AuditEvent::SendEmail { session_id, .. } => session_id,
        }
    }

    /// Emit the event on the `audit` log target so operators can tail
    /// decisions without reading the durable file.
    pub fn mirror_to_log(&self) {
        let payload = serde_json::to_string(self).unwrap_or_default();
        info!(target: "audit", payload = %payload, "AUDIT_EVENT");
    }
}

/// Destination for durable audit lines.
///
/// Appends are at-most-once and must never block the decision path for long;
/// callers treat failures as droppable and count them.
pub trait DurableSink: Send + Sync {
    fn append(&self, line: &str) -> std::io::Result<()>;
}

/// Appends JSONL records to a file, holding an exclusive advisory lock for
/// the duration of each write so concurrent guard processes sharing the file
/// cannot interleave partial lines.
pub struct JsonlSink {
    file: Mutex<File>,
}

impl JsonlSink {
    pub fn open(path: &Path) -> std::io::Result<Self> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self {
            file: Mutex::new(file),
        })
    }
}

impl DurableSink for JsonlSink {
    fn append(&self, line: &str) -> std::io::Result<()> {
        let mut file = self
            .file
            .lock()
            .map_err(|_| std::io::Error::other("audit sink mutex poisoned"))?;
        fs2::FileExt::lock_exclusive(&*file)?;
        let result = writeln!(file, "{}", line).and_then(|_| file.flush());
        let unlock = fs2::FileExt::unlock(&*file);
        result?;
        unlock
    }
}
