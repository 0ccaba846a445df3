//! Durable audit log schema tests.
//!
//! The JSONL record shapes are a contract with downstream log consumers and
//! must not drift.

use std::sync::Arc;

use egress_guard::engine::decision::{DecisionEngine, SimulatedDeliverer};
use egress_guard::engine::dlp::DlpScanner;
use egress_guard::engine_core::audit::JsonlSink;
use egress_guard::engine_core::models::{
    IngestRequest, PolicyDefinition, SendEmailRequest, TrustZone,
};
use egress_guard::engine_core::store::ChunkStore;

fn engine_with_sink(path: &std::path::Path) -> DecisionEngine {
    let sink = JsonlSink::open(path).unwrap();
    let store = ChunkStore::new(256).with_sink(Box::new(sink));
    DecisionEngine::new(
        Arc::new(store),
        Arc::new(PolicyDefinition::default()),
        DlpScanner::new().unwrap(),
        Arc::new(SimulatedDeliverer),
    )
}

#[tokio::test]
async fn durable_log_carries_the_full_event_schema() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("audit.jsonl");
    let engine = engine_with_sink(&path);

    let chunk_id = engine
        .ingest(&IngestRequest {
            session_id: "s1".to_string(),
            text: "नमस्ते from an untrusted page".to_string(),
            trust_zone: TrustZone::Untrusted,
            source: "https://example.org/page".to_string(),
            language: None,
        })
        .chunk_id;

    engine
        .decide_send_email(&SendEmailRequest {
            session_id: "s1".to_string(),
            to: "peer@example.com".to_string(),
            subject: "".to_string(),
            body: "unrelated outbound note".to_string(),
            evidence_to: Default::default(),
            evidence_body: Default::default(),
        })
        .await;

    let content = std::fs::read_to_string(&path).unwrap();
    let lines: Vec<&str> = content.lines().collect();
    assert_eq!(lines.len(), 2);

    let ingest: serde_json::Value = serde_json::from_str(lines[0]).unwrap();
    assert_eq!(ingest["type"], "ingest");
    assert!(ingest["ts"].as_f64().unwrap() > 0.0);
    assert_eq!(ingest["session_id"], "s1");
    assert_eq!(ingest["chunk_id"], chunk_id);
    assert_eq!(ingest["trust_zone"], "untrusted");
    assert_eq!(ingest["source"], "https://example.org/page");
    // language is always present, null when not given
    assert!(ingest["language"].is_null());
    // chars counts Unicode scalars, not bytes
    assert_eq!(
        ingest["chars"].as_u64().unwrap() as usize,
        "नमस्ते from an untrusted page".chars().count()
    );

    let send: serde_json::Value = serde_json::from_str(lines[1]).unwrap();
    assert_eq!(send["type"], "send_email");
    assert!(send["ts"].as_f64().unwrap() > 0.0);
    assert_eq!(send["session_id"], "s1");
    assert_eq!(send["decision"], "ALLOW");
    assert_eq!(
        send["reason"],
        "ALLOW: passed destination, DLP, and provenance checks"
    );
    assert_eq!(send["to"], "peer@example.com");
    let signals = &send["signals"];
    assert_eq!(signals["to_domain"], "example.com");
    assert_eq!(signals["untrusted_chunk_ids"][0], chunk_id);
    assert_eq!(signals["to_tainted_by_untrusted"], false);
    assert_eq!(signals["body_overlap_ratio_with_untrusted"], 0.0);
    // absent findings are omitted entirely
    assert!(signals.get("dlp_block_findings").is_none());
    assert!(signals.get("dlp_redact_findings").is_none());
}

#[tokio::test]
async fn in_memory_trail_matches_durable_lines() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("audit.jsonl");
    let engine = engine_with_sink(&path);

    for i in 0..3 {
        engine.ingest(&IngestRequest {
            session_id: "s1".to_string(),
            text: format!("chunk number {}", i),
            trust_zone: TrustZone::Trusted,
            source: "test".to_string(),
            language: Some("en".to_string()),
        });
    }

    let content = std::fs::read_to_string(&path).unwrap();
    let durable: Vec<serde_json::Value> = content
        .lines()
        .map(|l| serde_json::from_str(l).unwrap())
        .collect();
    let in_memory: Vec<serde_json::Value> = engine
        .audit_events(200)
        .iter()
        .map(|e| serde_json::to_value(e).unwrap())
        .collect();

    assert_eq!(durable, in_memory);
}
