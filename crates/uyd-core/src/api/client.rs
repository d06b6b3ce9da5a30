//! API client for communicating with the UYD backend.
//!
//! This module provides the `ApiClient` struct: a thin wrapper over
//! `reqwest` that attaches the bearer token, normalizes error handling and
//! exposes one call per backend resource.

use std::sync::{Arc, PoisonError, RwLock};
use std::time::Duration;

use reqwest::{header, Client, Method};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::{json, Map, Value};
use tracing::{debug, error, info, warn};
use url::Url;

use crate::auth::{TokenStore, ACCESS_TOKEN_KEY, REFRESH_TOKEN_KEY};
use crate::models::{
    Event, EventRegistration, Listing, NewsArticle, Program, RegistrationResponse, SiteStats,
    SubscriptionResponse,
};

use super::ApiError;

// ============================================================================
// Constants
// ============================================================================

/// Backend address used when nothing is configured
pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:8000";

/// HTTP request timeout in seconds.
const REQUEST_TIMEOUT_SECS: u64 = 30;

const STATS_PATH: &str = "/api/core/stats/";
const PROGRAMS_PATH: &str = "/api/programs/";
const FEATURED_PROGRAMS_PATH: &str = "/api/programs/featured/";
const EVENTS_PATH: &str = "/api/events/";
const UPCOMING_EVENTS_PATH: &str = "/api/events/upcoming/";
const EVENT_REGISTER_PATH: &str = "/api/events/register";
const NEWS_PATH: &str = "/api/news/";
const FEATURED_NEWS_PATH: &str = "/api/news/featured/";
const LATEST_NEWS_PATH: &str = "/api/news/latest/";
const TOKEN_PATH: &str = "/token/";
const TOKEN_REFRESH_PATH: &str = "/token/refresh/";

/// Default newsletter list when the caller does not pick one
pub const DEFAULT_SUBSCRIPTION_TYPE: &str = "general";

// ============================================================================
// Request / response types
// ============================================================================

/// Per-call options for `ApiClient::request`.
#[derive(Debug, Clone)]
pub struct RequestOptions {
    pub method: Method,
    pub body: Option<Value>,
    /// Attach the bearer token when one is held
    pub include_auth: bool,
    /// Extra headers, applied over the defaults
    pub headers: header::HeaderMap,
}

impl Default for RequestOptions {
    fn default() -> Self {
        Self {
            method: Method::GET,
            body: None,
            include_auth: true,
            headers: header::HeaderMap::new(),
        }
    }
}

impl RequestOptions {
    pub fn with_method(method: Method) -> Self {
        Self {
            method,
            ..Self::default()
        }
    }

    pub fn body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    pub fn without_auth(mut self) -> Self {
        self.include_auth = false;
        self
    }

    pub fn header(mut self, name: header::HeaderName, value: header::HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }
}

/// Successful response body: parsed JSON when the server declared JSON,
/// raw text otherwise.
#[derive(Debug, Clone, PartialEq)]
pub enum ApiResponse {
    Json(Value),
    Text(String),
}

impl ApiResponse {
    /// Decode a JSON body into `T`
    pub fn decode<T: DeserializeOwned>(self) -> Result<T, ApiError> {
        match self {
            ApiResponse::Json(value) => serde_json::from_value(value)
                .map_err(|e| ApiError::InvalidResponse(e.to_string())),
            ApiResponse::Text(text) => Err(ApiError::InvalidResponse(format!(
                "expected JSON, got text: {}",
                text.chars().take(80).collect::<String>()
            ))),
        }
    }

    /// Decode a JSON body into `T`, falling back to `T::default()` for
    /// non-JSON bodies.
    pub fn decode_or_default<T: DeserializeOwned + Default>(self) -> Result<T, ApiError> {
        match self {
            ApiResponse::Json(_) => self.decode(),
            ApiResponse::Text(_) => Ok(T::default()),
        }
    }
}

/// Response of the token endpoints. Unknown fields are kept in `extra`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TokenResponse {
    pub access: Option<String>,
    pub refresh: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

// ============================================================================
// Client
// ============================================================================

/// API client for the UYD backend.
/// Clone is cheap - reqwest::Client and the token slot are shared.
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
    store: Arc<dyn TokenStore>,
    token: Arc<RwLock<Option<String>>>,
    newsletter_endpoint: Option<String>,
}

impl ApiClient {
    /// Create a client for `base_url`, picking up any access token already
    /// held in `store`.
    pub fn new(base_url: &str, store: Arc<dyn TokenStore>) -> Result<Self, ApiError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;

        let token = match store.get(ACCESS_TOKEN_KEY) {
            Ok(token) => token,
            Err(e) => {
                warn!(error = %e, "Failed to read stored token, continuing without one");
                None
            }
        };
        debug!(has_token = token.is_some(), base_url, "API client created");

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            store,
            token: Arc::new(RwLock::new(token)),
            newsletter_endpoint: None,
        })
    }

    /// Post newsletter subscriptions to `path` instead of acknowledging
    /// them locally.
    pub fn with_newsletter_endpoint(mut self, path: Option<String>) -> Self {
        self.newsletter_endpoint = path;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    // ===== Session credential =====

    /// Current access token, if any
    pub fn token(&self) -> Option<String> {
        self.token.read().unwrap_or_else(PoisonError::into_inner).clone()
    }

    /// Set and persist the access token
    pub fn set_token(&self, token: &str) -> Result<(), ApiError> {
        // Only a persisted token is ever sent
        self.store.set(ACCESS_TOKEN_KEY, token)?;
        *self.token.write().unwrap_or_else(PoisonError::into_inner) = Some(token.to_string());
        Ok(())
    }

    /// Forget and unpersist the access token
    pub fn remove_token(&self) -> Result<(), ApiError> {
        self.store.remove(ACCESS_TOKEN_KEY)?;
        *self.token.write().unwrap_or_else(PoisonError::into_inner) = None;
        Ok(())
    }

    /// Persist the refresh token returned by `login`
    pub fn set_refresh_token(&self, token: &str) -> Result<(), ApiError> {
        self.store.set(REFRESH_TOKEN_KEY, token)?;
        Ok(())
    }

    fn headers(&self, include_auth: bool) -> Result<header::HeaderMap, ApiError> {
        let mut headers = header::HeaderMap::new();
        headers.insert(
            header::CONTENT_TYPE,
            header::HeaderValue::from_static("application/json"),
        );
        if include_auth {
            if let Some(token) = self.token() {
                let value = header::HeaderValue::from_str(&format!("Bearer {}", token))
                    .map_err(|e| ApiError::InvalidResponse(format!("unusable token: {}", e)))?;
                headers.insert(header::AUTHORIZATION, value);
            }
        }
        Ok(headers)
    }

    fn url(&self, path: &str) -> Result<Url, ApiError> {
        Ok(Url::parse(&format!("{}{}", self.base_url, path))?)
    }

    // ===== Transport primitives =====

    /// Issue a request to `base_url + path`.
    pub async fn request(&self, path: &str, options: RequestOptions) -> Result<ApiResponse, ApiError> {
        let url = self.url(path)?;
        self.execute(url, options).await
    }

    async fn execute(&self, url: Url, options: RequestOptions) -> Result<ApiResponse, ApiError> {
        let result = self.send(url.clone(), options).await;
        if let Err(ref e) = result {
            error!(url = %url, error = %e, "API request failed");
        }
        result
    }

    async fn send(&self, url: Url, options: RequestOptions) -> Result<ApiResponse, ApiError> {
        let mut headers = self.headers(options.include_auth)?;
        // Caller headers replace defaults of the same name
        headers.extend(options.headers);
        let mut builder = self.client.request(options.method, url).headers(headers);
        if let Some(ref body) = options.body {
            builder = builder.body(serde_json::to_vec(body).map_err(|e| {
                ApiError::InvalidResponse(format!("unserializable request body: {}", e))
            })?);
        }

        let response = builder.send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ApiError::from_status(status, &body));
        }

        let is_json = response
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .is_some_and(|ct| ct.contains("application/json"));

        if is_json {
            let value = response
                .json::<Value>()
                .await
                .map_err(|e| ApiError::InvalidResponse(e.to_string()))?;
            Ok(ApiResponse::Json(value))
        } else {
            Ok(ApiResponse::Text(response.text().await?))
        }
    }

    /// GET with `params` serialized into the query string
    pub async fn get(&self, path: &str, params: &[(&str, &str)]) -> Result<ApiResponse, ApiError> {
        let mut url = self.url(path)?;
        if !params.is_empty() {
            url.query_pairs_mut().extend_pairs(params);
        }
        self.execute(url, RequestOptions::default()).await
    }

    pub async fn post<B: Serialize>(&self, path: &str, data: &B) -> Result<ApiResponse, ApiError> {
        self.request(path, RequestOptions::with_method(Method::POST).body(Self::to_body(data)?))
            .await
    }

    pub async fn put<B: Serialize>(&self, path: &str, data: &B) -> Result<ApiResponse, ApiError> {
        self.request(path, RequestOptions::with_method(Method::PUT).body(Self::to_body(data)?))
            .await
    }

    pub async fn delete(&self, path: &str) -> Result<ApiResponse, ApiError> {
        self.request(path, RequestOptions::with_method(Method::DELETE)).await
    }

    fn to_body<B: Serialize>(data: &B) -> Result<Value, ApiError> {
        serde_json::to_value(data)
            .map_err(|e| ApiError::InvalidResponse(format!("unserializable request body: {}", e)))
    }

    // ===== Site =====

    pub async fn get_site_stats(&self) -> Result<SiteStats, ApiError> {
        self.get(STATS_PATH, &[]).await?.decode()
    }

    // ===== Programs =====

    pub async fn get_programs(&self, params: &[(&str, &str)]) -> Result<Listing<Program>, ApiError> {
        self.get(PROGRAMS_PATH, params).await?.decode()
    }

    pub async fn get_featured_programs(&self) -> Result<Listing<Program>, ApiError> {
        self.get(FEATURED_PROGRAMS_PATH, &[]).await?.decode()
    }

    pub async fn get_program(&self, id: i64) -> Result<Program, ApiError> {
        self.get(&format!("{}{}", PROGRAMS_PATH, id), &[]).await?.decode()
    }

    // ===== Events =====

    pub async fn get_events(&self, params: &[(&str, &str)]) -> Result<Listing<Event>, ApiError> {
        self.get(EVENTS_PATH, params).await?.decode()
    }

    pub async fn get_upcoming_events(&self) -> Result<Listing<Event>, ApiError> {
        self.get(UPCOMING_EVENTS_PATH, &[]).await?.decode()
    }

    pub async fn get_event(&self, id: i64) -> Result<Event, ApiError> {
        self.get(&format!("{}{}", EVENTS_PATH, id), &[]).await?.decode()
    }

    /// Register an attendee. Sent without the bearer token.
    pub async fn register_for_event(
        &self,
        registration: &EventRegistration,
    ) -> Result<RegistrationResponse, ApiError> {
        let options = RequestOptions::with_method(Method::POST)
            .body(Self::to_body(registration)?)
            .without_auth();
        self.request(EVENT_REGISTER_PATH, options)
            .await?
            .decode_or_default()
    }

    // ===== News =====

    pub async fn get_news(&self, params: &[(&str, &str)]) -> Result<Listing<NewsArticle>, ApiError> {
        self.get(NEWS_PATH, params).await?.decode()
    }

    pub async fn get_featured_news(&self) -> Result<Listing<NewsArticle>, ApiError> {
        self.get(FEATURED_NEWS_PATH, &[]).await?.decode()
    }

    pub async fn get_latest_news(&self) -> Result<Listing<NewsArticle>, ApiError> {
        self.get(LATEST_NEWS_PATH, &[]).await?.decode()
    }

    pub async fn get_news_article(&self, id: i64) -> Result<NewsArticle, ApiError> {
        self.get(&format!("{}{}", NEWS_PATH, id), &[]).await?.decode()
    }

    // ===== Newsletter =====

    /// Subscribe `email` to a newsletter list.
    ///
    /// The backend has no subscription endpoint yet, so unless one was set
    /// with `with_newsletter_endpoint` the request is acknowledged locally.
    pub async fn subscribe(
        &self,
        email: &str,
        subscription_type: &str,
    ) -> Result<SubscriptionResponse, ApiError> {
        match self.newsletter_endpoint {
            Some(ref path) => {
                let body = json!({ "email": email, "subscription_type": subscription_type });
                let response: SubscriptionResponse =
                    self.post(path, &body).await?.decode_or_default()?;
                Ok(SubscriptionResponse {
                    success: true,
                    ..response
                })
            }
            None => {
                info!(email, subscription_type, "Newsletter subscription acknowledged locally");
                Ok(SubscriptionResponse {
                    success: true,
                    message: None,
                })
            }
        }
    }

    // ===== Authentication =====

    /// Exchange credentials for tokens. The access token is persisted; the
    /// refresh token is returned for the caller to persist.
    pub async fn login(&self, email: &str, password: &str) -> Result<TokenResponse, ApiError> {
        let options = RequestOptions::with_method(Method::POST)
            .body(json!({ "email": email, "password": password }))
            .without_auth();
        let response: TokenResponse = self.request(TOKEN_PATH, options).await?.decode()?;

        if let Some(ref access) = response.access {
            self.set_token(access)?;
            info!("Login successful");
        }
        Ok(response)
    }

    /// Trade the stored refresh token for a new access token.
    pub async fn refresh_token(&self) -> Result<TokenResponse, ApiError> {
        let refresh = self
            .store
            .get(REFRESH_TOKEN_KEY)?
            .ok_or(ApiError::MissingCredential)?;

        let options = RequestOptions::with_method(Method::POST)
            .body(json!({ "refresh": refresh }))
            .without_auth();
        let response: TokenResponse = self.request(TOKEN_REFRESH_PATH, options).await?.decode()?;

        if let Some(ref access) = response.access {
            self.set_token(access)?;
            debug!("Access token refreshed");
        }
        Ok(response)
    }

    /// Drop both tokens. No network call is made.
    /// Both removals are attempted even if the first fails.
    pub fn logout(&self) -> Result<(), ApiError> {
        let access = self.remove_token();
        let refresh = self.store.remove(REFRESH_TOKEN_KEY).map_err(ApiError::from);
        access.and(refresh)?;
        info!("Logged out");
        Ok(())
    }
}

// ============================================================================
// Tests
// ============================================================================
