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

//! egress-guard: a provenance-aware egress firewall.
//!
//! This library provides the core logic for the egress guard, which mediates
//! an autonomous agent's outbound email against the content the agent
//! previously ingested, enforcing trust-zone isolation, DLP redaction, and
//! taint-based blocking.

pub mod config;
pub mod engine;
pub mod engine_core;
pub mod server;
pub mod utils;
