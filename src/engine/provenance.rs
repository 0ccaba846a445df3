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

//! Provenance evaluation over a session's recent chunks.
//!
//! Measures whether the recipient address appears inside untrusted content
//! and how much of the outbound body is copied from it. Both checks are
//! lexical; shingle overlap catches the common exfiltration shape where the
//! agent forwards large parts of what it just read.

use std::collections::HashSet;

use crate::engine_core::constants::provenance::SHINGLE_TOKENS;
use crate::engine_core::models::{Chunk, ProvenanceSignals, TrustZone};

/// Lowercase and collapse all whitespace runs to single spaces.
pub fn normalize(s: &str) -> String {
    s.to_lowercase().split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Fraction of the body's distinct 6-token shingles found verbatim in the
/// untrusted text. Bodies shorter than one shingle score 0.0.
pub fn body_overlap_ratio(body: &str, untrusted_chunks: &[&Chunk]) -> f64 {
    let body_n = normalize(body);
    if body_n.is_empty() {
        return 0.0;
    }

    let tokens: Vec<&str> = body_n.split(' ').collect();
    if tokens.len() < SHINGLE_TOKENS {
        return 0.0;
    }

    let shingles: HashSet<String> = tokens
        .windows(SHINGLE_TOKENS)
        .map(|w| w.join(" "))
        .collect();
    if shingles.is_empty() {
        return 0.0;
    }

    let untrusted_text = normalize(
        &untrusted_chunks
            .iter()
            .map(|c| c.text.as_str())
            .collect::<Vec<_>>()
            .join("\n"),
    );

    let hits = shingles
        .iter()
        .filter(|sh| untrusted_text.contains(sh.as_str()))
        .count();
    hits as f64 / shingles.len() as f64
}

/// Evaluate provenance signals for one outbound send.
pub fn evaluate(to_email: &str, body: &str, recent_chunks: &[Chunk]) -> ProvenanceSignals {
    let untrusted: Vec<&Chunk> = recent_chunks
        .iter()
        .filter(|c| c.trust_zone == TrustZone::Untrusted)
        .collect();
    let untrusted_chunk_ids = untrusted.iter().map(|c| c.chunk_id.clone()).collect();

    let to_lower = to_email.to_lowercase();
    let to_tainted_by_untrusted = !to_lower.is_empty()
        && untrusted
            .iter()
            .any(|c| c.text.to_lowercase().contains(&to_lower));

    let body_overlap_ratio_with_untrusted = body_overlap_ratio(body, &untrusted);

    ProvenanceSignals {
        untrusted_chunk_ids,
        to_tainted_by_untrusted,
        body_overlap_ratio_with_untrusted,
    }
}
