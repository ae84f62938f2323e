//! Rubric (duty type) naming rules.
//!
//! Rubrics are plain unique names. Duties reference them by exact,
//! case-sensitive string.

use super::ModelValidationError;

/// Rubrics seeded into a fresh database, in display order.
pub const DEFAULT_RUBRICS: [&str; 5] = [
    "Primary On-Call",
    "Secondary On-Call",
    "Operations",
    "Support",
    "Maintenance",
];

/// Trims a rubric name and rejects blanks. Case is preserved.
pub fn normalize_rubric_name(name: &str) -> Result<String, ModelValidationError> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(ModelValidationError::BlankRubric);
    }
    Ok(trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::normalize_rubric_name;
    use crate::model::ModelValidationError;

    #[test]
    fn normalize_trims_and_keeps_case() {
        assert_eq!(normalize_rubric_name("  Support ").unwrap(), "Support");
        assert_eq!(normalize_rubric_name("ops").unwrap(), "ops");
        assert_eq!(
            normalize_rubric_name("   "),
            Err(ModelValidationError::BlankRubric)
        );
    }
}
