use serde::{Deserialize, Serialize};

/// Body of `POST /api/events/register`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventRegistration {
    pub event_id: i64,
    pub user_name: String,
    pub user_email: String,
    pub user_mobile_number: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistrationResponse {
    pub message: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubscriptionResponse {
    #[serde(default)]
    pub success: bool,
    pub message: Option<String>,
}
