//! Decision engine.
//!
//! This module contains the logic for scanning outbound content, deriving
//! provenance signals, and evaluating sends against the loaded policy.

pub mod decision;
pub mod dlp;
pub mod provenance;
