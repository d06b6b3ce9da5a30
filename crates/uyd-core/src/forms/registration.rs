use std::sync::Arc;

use reqwest::StatusCode;
use tracing::{info, warn};

use crate::api::{ApiClient, ApiError};
use crate::models::EventRegistration;
use crate::notify::{Notification, Notifier};

use super::validation::{validate_field, FormFeedback, FormField, ValidationError};

const REGISTERED_MESSAGE: &str = "Successfully registered for the event!";
const ALREADY_REGISTERED_MESSAGE: &str = "You are already registered for this event";
const FAILED_MESSAGE: &str = "Registration failed. Please try again.";
const CONNECTION_MESSAGE: &str = "An error occurred. Please check your connection and try again.";
const MISSING_EVENT_MESSAGE: &str = "Event ID not found";

/// Substring of the backend's `detail` for a duplicate registration
const ALREADY_REGISTERED_MARKER: &str = "already registered";

/// Pull the event id out of a page query string such as `?id=12`
pub fn event_id_from_query(query: &str) -> Option<i64> {
    url::form_urlencoded::parse(query.trim_start_matches('?').as_bytes())
        .find(|(key, _)| key == "id")
        .and_then(|(_, value)| value.trim().parse().ok())
}

/// Values typed into the registration form
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RegistrationForm {
    pub name: String,
    pub email: String,
    pub phone: String,
}

impl RegistrationForm {
    pub fn new(name: impl Into<String>, email: impl Into<String>, phone: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
            phone: phone.into(),
        }
    }

    fn entries(&self) -> [(FormField, &str); 3] {
        [
            (FormField::Name, self.name.as_str()),
            (FormField::Email, self.email.as_str()),
            (FormField::Phone, self.phone.as_str()),
        ]
    }

    /// Validate every field, updating `feedback` as the user would see it.
    /// Returns the problems found, in form order.
    pub fn validate(&self, feedback: &mut FormFeedback) -> Vec<ValidationError> {
        self.entries()
            .into_iter()
            .filter_map(|(field, value)| {
                let result = validate_field(field, value);
                feedback.record(field, &result);
                result.err()
            })
            .collect()
    }

    pub fn to_registration(&self, event_id: i64) -> EventRegistration {
        EventRegistration {
            event_id,
            user_name: self.name.trim().to_string(),
            user_email: self.email.trim().to_string(),
            user_mobile_number: self.phone.trim().to_string(),
        }
    }
}

/// What happened to a registration submit
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistrationOutcome {
    /// Nothing was sent; the listed fields need fixing
    Invalid(Vec<ValidationError>),
    /// The page has no event id to register for
    MissingEvent,
    Registered { message: String },
    AlreadyRegistered,
    Failed { message: String },
}

impl RegistrationOutcome {
    /// Toast shown for this outcome, if any
    pub fn notification(&self) -> Option<Notification> {
        match self {
            RegistrationOutcome::Invalid(_) => None,
            RegistrationOutcome::MissingEvent => Some(Notification::danger(MISSING_EVENT_MESSAGE)),
            RegistrationOutcome::Registered { message } => Some(Notification::success(message)),
            RegistrationOutcome::AlreadyRegistered => {
                Some(Notification::warning(ALREADY_REGISTERED_MESSAGE))
            }
            RegistrationOutcome::Failed { message } => Some(Notification::danger(message)),
        }
    }

    pub fn is_registered(&self) -> bool {
        matches!(self, RegistrationOutcome::Registered { .. })
    }

    fn from_error(err: &ApiError) -> Self {
        match err {
            ApiError::Status { status, .. } => {
                let detail = err.detail();
                if *status == StatusCode::BAD_REQUEST
                    && detail.is_some_and(|d| d.contains(ALREADY_REGISTERED_MARKER))
                {
                    RegistrationOutcome::AlreadyRegistered
                } else {
                    RegistrationOutcome::Failed {
                        message: detail.unwrap_or(FAILED_MESSAGE).to_string(),
                    }
                }
            }
            _ => RegistrationOutcome::Failed {
                message: CONNECTION_MESSAGE.to_string(),
            },
        }
    }
}

/// Submits the event registration form. Bypasses the response cache.
#[derive(Clone)]
pub struct RegistrationHandler {
    api: ApiClient,
    notifier: Arc<dyn Notifier>,
}

impl RegistrationHandler {
    pub fn new(api: ApiClient, notifier: Arc<dyn Notifier>) -> Self {
        Self { api, notifier }
    }

    /// Validate and send the form for `event_id`.
    ///
    /// Field errors land in `feedback` and stop the submit. Every other
    /// outcome is also pushed to the notifier.
    pub async fn submit(
        &self,
        event_id: Option<i64>,
        form: &RegistrationForm,
        feedback: &mut FormFeedback,
    ) -> RegistrationOutcome {
        let outcome = self.run(event_id, form, feedback).await;
        if let Some(notification) = outcome.notification() {
            self.notifier.notify(notification);
        }
        outcome
    }

    async fn run(
        &self,
        event_id: Option<i64>,
        form: &RegistrationForm,
        feedback: &mut FormFeedback,
    ) -> RegistrationOutcome {
        let Some(event_id) = event_id else {
            return RegistrationOutcome::MissingEvent;
        };

        let problems = form.validate(feedback);
        if !problems.is_empty() {
            return RegistrationOutcome::Invalid(problems);
        }

        match self.api.register_for_event(&form.to_registration(event_id)).await {
            Ok(response) => {
                info!(event_id, "Event registration accepted");
                RegistrationOutcome::Registered {
                    message: response
                        .message
                        .unwrap_or_else(|| REGISTERED_MESSAGE.to_string()),
                }
            }
            Err(e) => {
                warn!(event_id, error = %e, "Event registration failed");
                RegistrationOutcome::from_error(&e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::MemoryStore;
    use crate::notify::{NotificationLevel, NotificationLog};

    use serde_json::json;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn valid_form() -> RegistrationForm {
        RegistrationForm::new("Asha Mrema", "asha@example.org", "0712345678")
    }

    fn handler_for(server: &MockServer) -> (RegistrationHandler, Arc<NotificationLog>) {
        let api = ApiClient::new(&server.uri(), Arc::new(MemoryStore::new())).unwrap();
        let log = Arc::new(NotificationLog::new());
        (RegistrationHandler::new(api, log.clone()), log)
    }

    #[test]
    fn test_event_id_from_query() {
        assert_eq!(event_id_from_query("?id=12"), Some(12));
        assert_eq!(event_id_from_query("ref=home&id=7"), Some(7));
        assert_eq!(event_id_from_query("?id=abc"), None);
        assert_eq!(event_id_from_query(""), None);
    }

    #[test]
    fn test_validate_reports_each_bad_field() {
        let mut feedback = FormFeedback::new();
        let form = RegistrationForm::new("Al", "asha@example.org", "0812345678");
        let problems = form.validate(&mut feedback);

        let fields: Vec<_> = problems.iter().map(|p| p.field).collect();
        assert_eq!(fields, vec![FormField::Name, FormField::Phone]);
        assert!(feedback.error(FormField::Name).is_some());
        assert!(feedback.error(FormField::Email).is_none());
    }

    #[test]
    fn test_to_registration_trims() {
        let form = RegistrationForm::new(" Asha ", "asha@example.org ", " 0712345678");
        let body = form.to_registration(4);
        assert_eq!(body.user_name, "Asha");
        assert_eq!(body.user_email, "asha@example.org");
        assert_eq!(body.user_mobile_number, "0712345678");
    }

    #[tokio::test]
    async fn test_submit_success_uses_server_message() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/events/register"))
            .and(body_json(json!({
                "event_id": 3,
                "user_name": "Asha Mrema",
                "user_email": "asha@example.org",
                "user_mobile_number": "0712345678"
            })))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({"message": "See you there"})))
            .expect(1)
            .mount(&server)
            .await;

        let (handler, log) = handler_for(&server);
        let outcome = handler.submit(Some(3), &valid_form(), &mut FormFeedback::new()).await;

        assert_eq!(outcome, RegistrationOutcome::Registered { message: "See you there".into() });
        let notes = log.snapshot();
        assert_eq!(notes.len(), 1);
        assert_eq!(notes[0].level, NotificationLevel::Success);
    }

    #[tokio::test]
    async fn test_submit_success_default_message() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/events/register"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
            .mount(&server)
            .await;

        let (handler, _log) = handler_for(&server);
        let outcome = handler.submit(Some(3), &valid_form(), &mut FormFeedback::new()).await;
        assert_eq!(outcome, RegistrationOutcome::Registered { message: REGISTERED_MESSAGE.into() });
    }

    #[tokio::test]
    async fn test_already_registered_is_a_warning() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/events/register"))
            .respond_with(ResponseTemplate::new(400).set_body_json(json!({
                "detail": "User already registered for this event"
            })))
            .mount(&server)
            .await;

        let (handler, log) = handler_for(&server);
        let outcome = handler.submit(Some(3), &valid_form(), &mut FormFeedback::new()).await;

        assert_eq!(outcome, RegistrationOutcome::AlreadyRegistered);
        let notes = log.snapshot();
        assert_eq!(notes[0].level, NotificationLevel::Warning);
        assert_eq!(notes[0].message, ALREADY_REGISTERED_MESSAGE);
    }

    #[tokio::test]
    async fn test_other_failures_show_detail_or_default() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/events/register"))
            .respond_with(ResponseTemplate::new(400).set_body_json(json!({"detail": "Event is full"})))
            .mount(&server)
            .await;

        let (handler, log) = handler_for(&server);
        let outcome = handler.submit(Some(3), &valid_form(), &mut FormFeedback::new()).await;
        assert_eq!(outcome, RegistrationOutcome::Failed { message: "Event is full".into() });
        assert_eq!(log.snapshot()[0].level, NotificationLevel::Danger);

        server.reset().await;
        Mock::given(method("POST"))
            .and(path("/api/events/register"))
            .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
            .mount(&server)
            .await;
        let outcome = handler.submit(Some(3), &valid_form(), &mut FormFeedback::new()).await;
        assert_eq!(outcome, RegistrationOutcome::Failed { message: FAILED_MESSAGE.into() });
    }

    #[tokio::test]
    async fn test_invalid_form_sends_nothing() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let (handler, log) = handler_for(&server);
        let mut feedback = FormFeedback::new();
        let form = RegistrationForm::new("Asha", "asha@example.org", "071234567");
        let outcome = handler.submit(Some(3), &form, &mut feedback).await;

        assert!(matches!(outcome, RegistrationOutcome::Invalid(ref p) if p.len() == 1));
        assert!(feedback.error(FormField::Phone).is_some());
        assert!(log.snapshot().is_empty());
    }

    #[tokio::test]
    async fn test_missing_event_id() {
        let server = MockServer::start().await;
        let (handler, log) = handler_for(&server);
        let outcome = handler.submit(None, &valid_form(), &mut FormFeedback::new()).await;

        assert_eq!(outcome, RegistrationOutcome::MissingEvent);
        assert_eq!(log.snapshot()[0].message, MISSING_EVENT_MESSAGE);
    }

    #[tokio::test]
    async fn test_unreachable_backend_reports_connection_problem() {
        let api = ApiClient::new("http://127.0.0.1:9", Arc::new(MemoryStore::new())).unwrap();
        let log = Arc::new(NotificationLog::new());
        let handler = RegistrationHandler::new(api, log.clone());

        let outcome = handler.submit(Some(3), &valid_form(), &mut FormFeedback::new()).await;
        assert_eq!(outcome, RegistrationOutcome::Failed { message: CONNECTION_MESSAGE.into() });
    }
}
