use crate::api::{ApiError, DEFAULT_SUBSCRIPTION_TYPE};
use crate::data::DataManager;
use crate::models::SubscriptionResponse;

use super::validation::{validate_field, FormFeedback, FormField, ValidationError};

/// Values typed into the newsletter sign-up form
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewsletterForm {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub interests: Vec<String>,
}

impl NewsletterForm {
    pub fn new(email: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            ..Self::default()
        }
    }

    /// Only the email is required
    pub fn validate(&self, feedback: &mut FormFeedback) -> Option<ValidationError> {
        let result = validate_field(FormField::Email, &self.email);
        feedback.record(FormField::Email, &result);
        result.err()
    }

    /// List to subscribe to: the first ticked interest, or the general list
    pub fn subscription_type(&self) -> &str {
        self.interests
            .iter()
            .map(|s| s.trim())
            .find(|s| !s.is_empty())
            .unwrap_or(DEFAULT_SUBSCRIPTION_TYPE)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NewsletterOutcome {
    Invalid(ValidationError),
    Subscribed(SubscriptionResponse),
}

/// Validate the form and subscribe through `manager`, which pushes the
/// success or failure notification. Transport errors are returned.
pub async fn submit_newsletter(
    manager: &DataManager,
    form: &NewsletterForm,
    feedback: &mut FormFeedback,
) -> Result<NewsletterOutcome, ApiError> {
    if let Some(problem) = form.validate(feedback) {
        return Ok(NewsletterOutcome::Invalid(problem));
    }
    manager
        .subscribe_newsletter_to(form.email.trim(), form.subscription_type())
        .await
        .map(NewsletterOutcome::Subscribed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_subscription_type_defaults_to_general() {
        let mut form = NewsletterForm::new("asha@example.org");
        assert_eq!(form.subscription_type(), "general");

        form.interests = vec![" ".into(), "events".into(), "programs".into()];
        assert_eq!(form.subscription_type(), "events");
    }

    #[test]
    fn test_validate_only_checks_email() {
        let mut feedback = FormFeedback::new();
        let form = NewsletterForm {
            first_name: "A".into(),
            ..NewsletterForm::new("asha@example.org")
        };
        assert!(form.validate(&mut feedback).is_none());

        let form = NewsletterForm::new("asha");
        assert_eq!(form.validate(&mut feedback).map(|e| e.field), Some(FormField::Email));
        assert!(feedback.error(FormField::Email).is_some());
    }
}
