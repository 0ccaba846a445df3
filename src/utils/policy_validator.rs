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

// Policy validation - fail-fast at config load time

use crate::engine_core::errors::GuardError;
use crate::engine_core::models::PolicyDefinition;

/// Validates policy documents for structural correctness and semantic
/// consistency
pub struct PolicyValidator;

impl PolicyValidator {
    /// Validate a policy document - call after loading from YAML
    pub fn validate(policy: &PolicyDefinition) -> Result<(), GuardError> {
        Self::validate_domains(&policy.email.blocked_domains, "email.blocked_domains")?;
        Self::validate_domains(&policy.email.allowed_domains, "email.allowed_domains")?;
        Self::validate_ratio(policy.dlp.max_untrusted_overlap_ratio)?;
        Ok(())
    }

    fn validate_domains(domains: &[String], field: &str) -> Result<(), GuardError> {
        for (idx, domain) in domains.iter().enumerate() {
            let context = format!("{}[{}]", field, idx);

            if domain.is_empty() {
                return Err(GuardError::ConfigurationError(format!(
                    "{}: domain cannot be empty",
                    context
                )));
            }
            if domain.contains('@') {
                return Err(GuardError::ConfigurationError(format!(
                    "{}: '{}' looks like a full address, expected a bare domain",
                    context, domain
                )));
            }
            if domain.chars().any(char::is_whitespace) {
                return Err(GuardError::ConfigurationError(format!(
                    "{}: '{}' contains whitespace",
                    context, domain
                )));
            }
            // Recipient domains are lower-cased before comparison, so
            // mixed-case entries would never match.
            if domain.chars().any(|c| c.is_ascii_uppercase()) {
                return Err(GuardError::ConfigurationError(format!(
                    "{}: '{}' must be lowercase",
                    context, domain
                )));
            }
        }
        Ok(())
    }

    fn validate_ratio(ratio: f64) -> Result<(), GuardError> {
        if !(0.0..=1.0).contains(&ratio) || ratio.is_nan() {
            return Err(GuardError::ConfigurationError(format!(
                "dlp.max_untrusted_overlap_ratio must be within [0.0, 1.0], got {}",
                ratio
            )));
        }
        Ok(())
    }
}
