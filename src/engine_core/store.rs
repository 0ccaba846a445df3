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

//! In-memory chunk store and audit trail.
//!
//! The store holds per-session ordered chunk sequences and a bounded ring of
//! audit events. An optional durable sink receives each event as a JSONL
//! line; sink failures never fail the caller, they are counted and logged.

use chrono::Utc;
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;
use tracing::warn;
use uuid::Uuid;

use crate::engine_core::audit::{AuditEvent, DurableSink};
use crate::engine_core::constants;
use crate::engine_core::models::{Chunk, Decision, DecisionSignals, IngestRequest};
use crate::utils::time;

struct StoreInner {
    /// Per-session chunks in ingestion order, windowed to the retention cap.
    chunks: HashMap<String, Vec<Chunk>>,
    events: VecDeque<AuditEvent>,
}

pub struct ChunkStore {
    inner: Mutex<StoreInner>,
    sink: Option<Box<dyn DurableSink>>,
    dropped_writes: AtomicU64,
    max_chunks_per_session: usize,
}

impl ChunkStore {
    pub fn new(max_chunks_per_session: usize) -> Self {
        Self {
            inner: Mutex::new(StoreInner {
                chunks: HashMap::new(),
                events: VecDeque::new(),
            }),
            sink: None,
            dropped_writes: AtomicU64::new(0),
            max_chunks_per_session,
        }
    }

    pub fn with_sink(mut self, sink: Box<dyn DurableSink>) -> Self {
        self.sink = Some(sink);
        self
    }

    /// Store one ingested chunk and record the matching audit event.
    ///
    /// Returns the stored chunk, including its generated id.
    pub fn ingest(&self, req: &IngestRequest) -> Chunk {
        let chunk = Chunk {
            chunk_id: new_chunk_id(),
            session_id: req.session_id.clone(),
            text: req.text.clone(),
            trust_zone: req.trust_zone,
            source: req.source.clone(),
            language: req.language.clone(),
            created_at: Utc::now(),
        };

        let event = AuditEvent::Ingest {
            ts: time::now(),
            session_id: chunk.session_id.clone(),
            chunk_id: chunk.chunk_id.clone(),
            trust_zone: chunk.trust_zone,
            source: chunk.source.clone(),
            language: chunk.language.clone(),
            chars: chunk.text.chars().count(),
        };

        {
            let mut inner = self.lock_inner();
            let session = inner
                .chunks
                .entry(chunk.session_id.clone())
                .or_default();
            session.push(chunk.clone());
            let excess = session.len().saturating_sub(self.max_chunks_per_session);
            if excess > 0 {
                session.drain(..excess);
            }
            Self::push_event(&mut inner.events, event.clone());
        }
        self.write_durable(&event);
        event.mirror_to_log();

        chunk
    }

    /// The most recent `limit` chunks for a session, oldest first.
    pub fn recent(&self, session_id: &str, limit: usize) -> Vec<Chunk> {
        let inner = self.lock_inner();
        match inner.chunks.get(session_id) {
            Some(chunks) => {
                let start = chunks.len().saturating_sub(limit);
                chunks[start..].to_vec()
            }
            None => Vec::new(),
        }
    }

    /// Record the terminal outcome of a send evaluation.
    pub fn log_decision(
        &self,
        session_id: &str,
        to: &str,
        decision: Decision,
        reason: &str,
        signals: &DecisionSignals,
    ) {
        let event = AuditEvent::SendEmail {
            ts: time::now(),
            session_id: session_id.to_string(),
            decision,
            reason: reason.to_string(),
            signals: signals.clone(),
            to: to.to_string(),
        };

        {
            let mut inner = self.lock_inner();
            Self::push_event(&mut inner.events, event.clone());
        }
        self.write_durable(&event);
        event.mirror_to_log();
    }

    /// The most recent `limit` audit events, oldest first.
    pub fn events(&self, limit: usize) -> Vec<AuditEvent> {
        let inner = self.lock_inner();
        let start = inner.events.len().saturating_sub(limit);
        inner.events.iter().skip(start).cloned().collect()
    }

    /// Number of durable audit lines dropped due to sink failures.
    pub fn dropped_writes(&self) -> u64 {
        self.dropped_writes.load(Ordering::Relaxed)
    }

    fn push_event(events: &mut VecDeque<AuditEvent>, event: AuditEvent) {
        if events.len() >= constants::store::EVENTS_CAPACITY {
            events.pop_front();
        }
        events.push_back(event);
    }

    // Durable appends happen outside the store lock so a slow disk cannot
    // stall ingestion.
    fn write_durable(&self, event: &AuditEvent) {
        let Some(sink) = &self.sink else {
            return;
        };
        let line = match serde_json::to_string(event) {
            Ok(line) => line,
            Err(e) => {
                self.dropped_writes.fetch_add(1, Ordering::Relaxed);
                warn!(error = %e, "failed to serialize audit event, dropping");
                return;
            }
        };
        if let Err(e) = sink.append(&line) {
            self.dropped_writes.fetch_add(1, Ordering::Relaxed);
            warn!(error = %e, "failed to append audit event, dropping");
        }
    }

    fn lock_inner(&self) -> std::sync::MutexGuard<'_, StoreInner> {
        match self.inner.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

fn new_chunk_id() -> String {
    let hex = Uuid::new_v4().simple().to_string();
    format!(
        "{}{}",
        constants::store::CHUNK_ID_PREFIX,
        &hex[..constants::store::CHUNK_ID_HEX_LEN]
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine_core::models::TrustZone;

    fn ingest_req(session: &str, text: &str) -> IngestRequest {
        IngestRequest {
            session_id: session.to_string(),
            text: text.to_string(),
            trust_zone: TrustZone::Untrusted,
            source: "test".to_string(),
            language: None,
        }
    }

    #[test]
    fn chunk_ids_have_prefix_and_length() {
        let store = ChunkStore::new(256);
        let chunk = store.ingest(&ingest_req("s1", "hello"));
        assert!(chunk.chunk_id.starts_with("chunk_"));
        assert_eq!(chunk.chunk_id.len(), "chunk_".len() + 10);
    }

    #[test]
    fn recent_returns_tail_oldest_first() {
        let store = ChunkStore::new(256);
        for i in 0..5 {
            store.ingest(&ingest_req("s1", &format!("chunk {}", i)));
        }
        let recent = store.recent("s1", 3);
        assert_eq!(recent.len(), 3);
        assert_eq!(recent[0].text, "chunk 2");
        assert_eq!(recent[2].text, "chunk 4");
    }

    #[test]
    fn sessions_are_isolated() {
        let store = ChunkStore::new(256);
        store.ingest(&ingest_req("s1", "one"));
        store.ingest(&ingest_req("s2", "two"));
        assert_eq!(store.recent("s1", 20).len(), 1);
        assert_eq!(store.recent("s2", 20).len(), 1);
        assert!(store.recent("s3", 20).is_empty());
    }

    #[test]
    fn retention_window_evicts_oldest() {
        let store = ChunkStore::new(3);
        for i in 0..5 {
            store.ingest(&ingest_req("s1", &format!("chunk {}", i)));
        }
        let all = store.recent("s1", 100);
        assert_eq!(all.len(), 3);
        assert_eq!(all[0].text, "chunk 2");
    }

    #[test]
    fn events_records_ingest_and_decisions() {
        let store = ChunkStore::new(256);
        store.ingest(&ingest_req("s1", "hello"));
        store.log_decision(
            "s1",
            "a@example.com",
            Decision::Allow,
            "ALLOW: passed destination, DLP, and provenance checks",
            &DecisionSignals {
                to_domain: "example.com".into(),
                untrusted_chunk_ids: vec![],
                to_tainted_by_untrusted: false,
                body_overlap_ratio_with_untrusted: 0.0,
                dlp_block_findings: None,
                dlp_redact_findings: None,
            },
        );
        let events = store.events(200);
        assert_eq!(events.len(), 2);
        assert!(matches!(events[0], AuditEvent::Ingest { .. }));
        assert!(matches!(events[1], AuditEvent::SendEmail { .. }));
    }

    #[test]
    fn events_limit_returns_tail() {
        let store = ChunkStore::new(256);
        for i in 0..10 {
            store.ingest(&ingest_req("s1", &format!("chunk {}", i)));
        }
        let events = store.events(4);
        assert_eq!(events.len(), 4);
    }

    struct FailingSink;

    impl DurableSink for FailingSink {
        fn append(&self, _line: &str) -> std::io::Result<()> {
            Err(std::io::Error::other("disk gone"))
        }
    }

    #[test]
    fn sink_failures_are_counted_not_propagated() {
        let store = ChunkStore::new(256).with_sink(Box::new(FailingSink));
        store.ingest(&ingest_req("s1", "hello"));
        store.ingest(&ingest_req("s1", "world"));
        assert_eq!(store.dropped_writes(), 2);
        // in-memory trail is intact
        assert_eq!(store.events(200).len(), 2);
    }
}
