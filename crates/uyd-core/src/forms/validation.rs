use std::collections::BTreeMap;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

// Letters and spaces only, 3 to 50 of them
static NAME_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-zA-Z\s]{3,50}$").expect("name pattern is valid"));

static EMAIL_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern is valid"));

// Tanzanian mobile: +255 or 0, then 6 or 7, then 8 digits
static PHONE_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\+255|0)[67][0-9]{8}$").expect("phone pattern is valid"));

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FormField {
    Name,
    Email,
    Phone,
}

impl FormField {
    fn pattern(&self) -> &'static Regex {
        match self {
            FormField::Name => &NAME_PATTERN,
            FormField::Email => &EMAIL_PATTERN,
            FormField::Phone => &PHONE_PATTERN,
        }
    }

    pub fn message(&self) -> &'static str {
        match self {
            FormField::Name => {
                "Name must be at least 3 characters and contain only letters and spaces"
            }
            FormField::Email => "Please enter a valid email address",
            FormField::Phone => {
                "Please enter a valid Tanzanian phone number (e.g., +255712345678 or 0712345678)"
            }
        }
    }
}

impl std::fmt::Display for FormField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FormField::Name => write!(f, "name"),
            FormField::Email => write!(f, "email"),
            FormField::Phone => write!(f, "phone"),
        }
    }
}

/// A field whose value does not match its pattern
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationError {
    pub field: FormField,
    pub message: &'static str,
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Check `value` (trimmed) against the pattern for `field`
pub fn validate_field(field: FormField, value: &str) -> Result<(), ValidationError> {
    if field.pattern().is_match(value.trim()) {
        Ok(())
    } else {
        Err(ValidationError {
            field,
            message: field.message(),
        })
    }
}

/// Inline error messages currently shown next to form fields
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FormFeedback {
    errors: BTreeMap<FormField, &'static str>,
}

impl FormFeedback {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn error(&self, field: FormField) -> Option<&'static str> {
        self.errors.get(&field).copied()
    }

    pub fn is_clean(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn show(&mut self, error: &ValidationError) {
        self.errors.insert(error.field, error.message);
    }

    pub fn clear(&mut self, field: FormField) {
        self.errors.remove(&field);
    }

    /// Record the outcome of validating `field` on submit
    pub fn record(&mut self, field: FormField, result: &Result<(), ValidationError>) {
        match result {
            Ok(()) => self.clear(field),
            Err(e) => self.show(e),
        }
    }

    /// Leaving a field: flag it only if something invalid was typed
    pub fn on_blur(&mut self, field: FormField, value: &str) {
        match validate_field(field, value) {
            Err(ref e) if !value.trim().is_empty() => self.show(e),
            _ => self.clear(field),
        }
    }

    /// Typing into a flagged field: clear the flag once it becomes valid
    pub fn on_input(&mut self, field: FormField, value: &str) {
        if self.errors.contains_key(&field) && validate_field(field, value).is_ok() {
            self.clear(field);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_phone_validation() {
        assert!(validate_field(FormField::Phone, "0712345678").is_ok());
        assert!(validate_field(FormField::Phone, "+255712345678").is_ok());
        assert!(validate_field(FormField::Phone, "0612345678").is_ok());
        assert!(validate_field(FormField::Phone, " 0712345678 ").is_ok());

        assert!(validate_field(FormField::Phone, "0812345678").is_err());
        assert!(validate_field(FormField::Phone, "071234567").is_err());
        assert!(validate_field(FormField::Phone, "07123456789").is_err());
        assert!(validate_field(FormField::Phone, "255712345678").is_err());
        assert!(validate_field(FormField::Phone, "07١٢٣٤٥٦٧٨").is_err());
    }

    #[test]
    fn test_name_validation() {
        assert!(validate_field(FormField::Name, "Asha Mrema").is_ok());
        assert!(validate_field(FormField::Name, "Ali").is_ok());
        assert!(validate_field(FormField::Name, &"a".repeat(50)).is_ok());

        assert!(validate_field(FormField::Name, "Al").is_err());
        assert!(validate_field(FormField::Name, &"a".repeat(51)).is_err());
        assert!(validate_field(FormField::Name, "O'Brien").is_err());
        assert!(validate_field(FormField::Name, "Agent 007").is_err());
    }

    #[test]
    fn test_email_validation() {
        assert!(validate_field(FormField::Email, "asha@example.org").is_ok());
        assert!(validate_field(FormField::Email, "a.b+c@mail.co.tz").is_ok());

        assert!(validate_field(FormField::Email, "asha@example").is_err());
        assert!(validate_field(FormField::Email, "asha example@x.org").is_err());
        assert!(validate_field(FormField::Email, "@example.org").is_err());
        assert!(validate_field(FormField::Email, "a@@example.org").is_err());
    }

    #[test]
    fn test_error_carries_field_message() {
        let err = validate_field(FormField::Email, "nope").unwrap_err();
        assert_eq!(err.field, FormField::Email);
        assert_eq!(err.message, "Please enter a valid email address");
    }

    #[test]
    fn test_blur_ignores_empty_values() {
        let mut feedback = FormFeedback::new();
        feedback.on_blur(FormField::Name, "   ");
        assert!(feedback.is_clean());

        feedback.on_blur(FormField::Name, "A1");
        assert_eq!(feedback.error(FormField::Name), Some(FormField::Name.message()));
    }

    #[test]
    fn test_input_clears_once_valid() {
        let mut feedback = FormFeedback::new();
        feedback.on_blur(FormField::Phone, "0712");
        feedback.on_input(FormField::Phone, "07123");
        assert!(feedback.error(FormField::Phone).is_some());

        feedback.on_input(FormField::Phone, "0712345678");
        assert!(feedback.is_clean());
    }

    #[test]
    fn test_input_does_not_flag_unflagged_field() {
        let mut feedback = FormFeedback::new();
        feedback.on_input(FormField::Email, "partial@");
        assert!(feedback.is_clean());
    }
}
