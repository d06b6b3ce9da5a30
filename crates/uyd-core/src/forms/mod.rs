//! Form handling: field validation, event registration and newsletter
//! sign-up.
//!
//! Validation problems are returned as values and shown inline next to the
//! field; they never become request errors. Submissions go straight to the
//! API client and bypass the response cache.

pub mod newsletter;
pub mod registration;
pub mod validation;

pub use newsletter::{submit_newsletter, NewsletterForm, NewsletterOutcome};
pub use registration::{event_id_from_query, RegistrationForm, RegistrationHandler, RegistrationOutcome};
pub use validation::{validate_field, FormFeedback, FormField, ValidationError};
