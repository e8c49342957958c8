// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::entity::Budget;
use crate::error::DomainError;
use crate::workflow::{EntityKind, JustificationPolicy};

/// Maximum length of an entity code, in characters.
pub const MAX_CODE_LENGTH: usize = 32;

/// Validates a justification against a transition's policy.
///
/// # Arguments
///
/// * `justification` - The raw text supplied with the request, if any
/// * `policy` - The policy of the transition being attempted
///
/// # Returns
///
/// * `Ok(Some(text))` with the trimmed text when one should be recorded
/// * `Ok(None)` when nothing should be recorded
///
/// # Errors
///
/// Returns an error if the policy is `Required` and the justification is
/// missing or blank after trimming.
pub fn validate_justification(
    justification: Option<&str>,
    policy: JustificationPolicy,
) -> Result<Option<String>, DomainError> {
    let trimmed: Option<&str> = justification.map(str::trim).filter(|s| !s.is_empty());

    match policy {
        JustificationPolicy::NotApplicable => Ok(None),
        JustificationPolicy::Optional => Ok(trimmed.map(String::from)),
        JustificationPolicy::Required => trimmed
            .map(String::from)
            .map(Some)
            .ok_or(DomainError::MissingJustification),
    }
}

/// Validates and normalizes an entity code.
///
/// Codes are trimmed, non-empty, at most [`MAX_CODE_LENGTH`] characters, and
/// made of ASCII letters, digits, `-` and `_`.
///
/// # Errors
///
/// Returns an error if the code breaks any of those rules.
pub fn validate_entity_code(code: &str) -> Result<String, DomainError> {
    let trimmed: &str = code.trim();

    if trimmed.is_empty() {
        return Err(DomainError::InvalidCode(String::from(
            "Code cannot be empty",
        )));
    }

    let length: usize = trimmed.chars().count();
    if length > MAX_CODE_LENGTH {
        return Err(DomainError::InvalidCode(format!(
            "Code must be at most {MAX_CODE_LENGTH} characters (got {length})"
        )));
    }

    if let Some(bad) = trimmed
        .chars()
        .find(|c| !(c.is_ascii_alphanumeric() || *c == '-' || *c == '_'))
    {
        return Err(DomainError::InvalidCode(format!(
            "Code contains invalid character '{bad}'"
        )));
    }

    Ok(trimmed.to_string())
}

/// Validates and trims an entity name.
///
/// # Errors
///
/// Returns an error if the name is blank.
pub fn validate_name(name: &str) -> Result<String, DomainError> {
    let trimmed: &str = name.trim();
    if trimmed.is_empty() {
        return Err(DomainError::InvalidName(String::from(
            "Name cannot be empty",
        )));
    }
    Ok(trimmed.to_string())
}

/// Validates and trims an institution name.
///
/// # Errors
///
/// Returns an error if the institution is blank.
pub fn validate_institution(institution: &str) -> Result<String, DomainError> {
    let trimmed: &str = institution.trim();
    if trimmed.is_empty() {
        return Err(DomainError::InvalidInstitution(String::from(
            "Institution cannot be empty",
        )));
    }
    Ok(trimmed.to_string())
}

/// Checks that a budget is only supplied where the kind allows one.
///
/// # Errors
///
/// Returns an error if an objective is given a budget.
pub const fn validate_budget_for_kind(
    kind: EntityKind,
    budget: Option<&Budget>,
) -> Result<(), DomainError> {
    match (kind, budget) {
        (EntityKind::Objective, Some(_)) => Err(DomainError::BudgetNotAllowed { kind }),
        _ => Ok(()),
    }
}
