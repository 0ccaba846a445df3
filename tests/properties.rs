use chrono::Utc;
use egress_guard::engine::dlp::DlpScanner;
use egress_guard::engine::provenance;
use egress_guard::engine_core::models::{Chunk, DlpCategory, TrustZone};
use proptest::prelude::*;

fn chunk(text: &str, zone: TrustZone) -> Chunk {
    Chunk {
        chunk_id: "chunk_0000000000".to_string(),
        session_id: "s1".to_string(),
        text: text.to_string(),
        trust_zone: zone,
        source: "test".to_string(),
        language: None,
        created_at: Utc::now(),
    }
}

proptest! {
    #[test]
    fn overlap_ratio_stays_within_unit_interval(
        body in "\\PC{0,300}",
        chunk_text in "\\PC{0,300}"
    ) {
        let c = chunk(&chunk_text, TrustZone::Untrusted);
        let ratio = provenance::body_overlap_ratio(&body, &[&c]);
        prop_assert!((0.0..=1.0).contains(&ratio));
    }

    #[test]
    fn short_bodies_always_score_zero(
        words in proptest::collection::vec("[a-z]{1,8}", 0..5),
        chunk_text in "\\PC{0,300}"
    ) {
        let body = words.join(" ");
        let c = chunk(&chunk_text, TrustZone::Untrusted);
        prop_assert_eq!(provenance::body_overlap_ratio(&body, &[&c]), 0.0);
    }

    #[test]
    fn body_copied_from_untrusted_scores_one(
        words in proptest::collection::vec("[a-z]{1,8}", 6..40)
    ) {
        let body = words.join(" ");
        let c = chunk(&body, TrustZone::Untrusted);
        let ratio = provenance::body_overlap_ratio(&body, &[&c]);
        prop_assert!((ratio - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn normalize_is_idempotent(s in "\\PC{0,300}") {
        let once = provenance::normalize(&s);
        prop_assert_eq!(provenance::normalize(&once), once.clone());
    }

    #[test]
    fn trusted_chunks_never_taint(
        to in "[a-z]{1,10}@[a-z]{1,10}\\.[a-z]{2,4}",
        texts in proptest::collection::vec("\\PC{0,100}", 0..5)
    ) {
        // Seed the address into every chunk so only the zone matters
        let chunks: Vec<Chunk> = texts
            .iter()
            .map(|t| chunk(&format!("{} {}", t, to), TrustZone::Trusted))
            .collect();
        let signals = provenance::evaluate(&to, "body", &chunks);
        prop_assert!(!signals.to_tainted_by_untrusted);
        prop_assert!(signals.untrusted_chunk_ids.is_empty());
    }

    #[test]
    fn redaction_counts_and_removes_all_matches(
        codes in proptest::collection::vec(100000u32..1000000, 1..6)
    ) {
        let scanner = DlpScanner::new().unwrap();
        let body = codes
            .iter()
            .map(|c| format!("code {}", c))
            .collect::<Vec<_>>()
            .join(" then ");
        let result = scanner.scan_and_redact(&body, &[DlpCategory::Otp]);
        prop_assert_eq!(
            result.findings.get(&DlpCategory::Otp).copied(),
            Some(codes.len())
        );
        // No six-digit run survives redaction
        let remaining = scanner.detect(&result.redacted_text, &[DlpCategory::Otp]);
        prop_assert!(remaining.is_empty());
    }
}
