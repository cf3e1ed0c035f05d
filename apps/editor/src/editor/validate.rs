use crate::errors::EditorError;
use crate::models::{Category, FieldPatch};

/// The minimal field set a direct-created item of each category must carry.
pub fn required_fields(category: Category) -> &'static [&'static str] {
    match category {
        Category::Experience => &["title", "organization"],
        Category::Education => &["institution", "degree"],
        Category::Certification => &["name", "issuer"],
        Category::Skill => &["name"],
    }
}

/// Local required-field check run before any remote create call. Values must
/// be present and non-blank after trimming.
pub fn validate_draft(category: Category, draft: &FieldPatch) -> Result<(), EditorError> {
    let missing: Vec<&str> = required_fields(category)
        .iter()
        .copied()
        .filter(|field| {
            draft
                .get_str(field)
                .map(str::trim)
                .filter(|value| !value.is_empty())
                .is_none()
        })
        .collect();

    if missing.is_empty() {
        Ok(())
    } else {
        Err(EditorError::Validation(format!(
            "{category} requires: {}",
            missing.join(", ")
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_required_field_is_rejected() {
        let mut draft = FieldPatch::new();
        draft.set("title", "Engineer");

        let err = validate_draft(Category::Experience, &draft).unwrap_err();
        assert!(matches!(err, EditorError::Validation(_)));
        assert!(err.to_string().contains("organization"));
    }

    #[test]
    fn test_blank_value_counts_as_missing() {
        let mut draft = FieldPatch::new();
        draft.set("title", "   ");
        draft.set("organization", "Acme");

        let err = validate_draft(Category::Experience, &draft).unwrap_err();
        assert!(err.to_string().contains("title"));
    }

    #[test]
    fn test_complete_draft_passes() {
        let mut draft = FieldPatch::new();
        draft.set("name", "AWS Solutions Architect");
        draft.set("issuer", "AWS");

        assert!(validate_draft(Category::Certification, &draft).is_ok());
    }

    #[test]
    fn test_skill_requires_only_a_name() {
        let mut draft = FieldPatch::new();
        draft.set("name", "Rust");

        assert!(validate_draft(Category::Skill, &draft).is_ok());
    }
}
