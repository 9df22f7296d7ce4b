//! Backend REST client
//!
//! Talks to the hosted backend: password-grant auth under `/auth/v1` and
//! PostgREST tables under `/rest/v1`. All calls are blocking and meant to
//! run on the app's background threads.

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{json, Value};
use tracing::{debug, warn};

use crate::config::AppConfig;
use crate::error::ApiError;
use crate::models::{
    AuthSession, AuthUser, Channel, DashboardStats, Match, NewPaymentRequest, PaymentRequest,
    PaymentStatus, Profile, Slideshow, UserRole,
};
use crate::subscription::{activation_expiry, SubscriptionState};

type HttpResponse = ureq::http::Response<ureq::Body>;

/// PostgREST query string, built as key/value pairs
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Query {
    pairs: Vec<(String, String)>,
}

impl Default for Query {
    fn default() -> Self {
        Self::new()
    }
}

impl Query {
    pub fn new() -> Self {
        Self {
            pairs: vec![("select".to_string(), "*".to_string())],
        }
    }

    /// Query with only filters, for PATCH and DELETE
    pub fn filter() -> Self {
        Self { pairs: Vec::new() }
    }

    pub fn select(mut self, columns: &str) -> Self {
        self.pairs.retain(|(k, _)| k != "select");
        self.pairs.push(("select".to_string(), columns.to_string()));
        self
    }

    pub fn eq(mut self, column: &str, value: impl std::fmt::Display) -> Self {
        self.pairs.push((column.to_string(), format!("eq.{}", value)));
        self
    }

    pub fn order(mut self, column: &str, ascending: bool) -> Self {
        let dir = if ascending { "asc" } else { "desc" };
        self.pairs.push(("order".to_string(), format!("{}.{}", column, dir)));
        self
    }

    pub fn limit(mut self, n: usize) -> Self {
        self.pairs.push(("limit".to_string(), n.to_string()));
        self
    }

    pub fn pairs(&self) -> &[(String, String)] {
        &self.pairs
    }
}

/// Total from a `Content-Range` header such as `0-24/3573` or `*/0`
pub fn parse_content_range(header: &str) -> Option<u64> {
    header.rsplit_once('/')?.1.trim().parse().ok()
}

/// Pull a readable message out of an auth error body
fn auth_message(body: &str) -> String {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|v| {
            ["error_description", "msg", "message", "error"]
                .iter()
                .find_map(|k| v.get(*k).and_then(Value::as_str).map(str::to_string))
        })
        .unwrap_or_else(|| body.trim().to_string())
}

#[derive(Clone)]
pub struct BackendClient {
    base_url: String,
    anon_key: String,
    access_token: Option<String>,
    agent: ureq::Agent,
}

impl BackendClient {
    pub fn new(base_url: &str, anon_key: &str) -> Self {
        let agent = ureq::Agent::config_builder()
            .timeout_global(Some(Duration::from_secs(30)))
            .timeout_connect(Some(Duration::from_secs(10)))
            .http_status_as_error(false)
            .build()
            .new_agent();

        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            anon_key: anon_key.to_string(),
            access_token: None,
            agent,
        }
    }

    pub fn from_config(config: &AppConfig) -> Result<Self, ApiError> {
        if !config.backend_configured() {
            return Err(ApiError::NotConfigured);
        }
        Ok(Self::new(&config.backend_url, &config.backend_anon_key))
    }

    /// Act as a signed-in user instead of anonymously
    pub fn with_token(mut self, token: &str) -> Self {
        self.access_token = Some(token.to_string());
        self
    }

    pub fn clear_token(&mut self) {
        self.access_token = None;
    }

    fn rest_url(&self, table: &str) -> String {
        format!("{}/rest/v1/{}", self.base_url, table)
    }

    fn bearer(&self) -> String {
        format!("Bearer {}", self.access_token.as_deref().unwrap_or(&self.anon_key))
    }

    fn read(mut response: HttpResponse) -> Result<String, ApiError> {
        let status = response.status().as_u16();
        let body = response.body_mut().read_to_string()?;
        if !(200..300).contains(&status) {
            return Err(ApiError::Status { status, body });
        }
        Ok(body)
    }

    fn decode<T: DeserializeOwned>(body: &str) -> Result<T, ApiError> {
        Ok(serde_json::from_str(body)?)
    }

    // ------------------------------------------------------------------
    // Auth
    // ------------------------------------------------------------------

    fn auth_post(&self, path: &str, body: &Value) -> Result<String, ApiError> {
        let url = format!("{}/auth/v1/{}", self.base_url, path);
        let response = self
            .agent
            .post(&url)
            .header("apikey", &self.anon_key)
            .header("Content-Type", "application/json")
            .send(body.to_string())?;
        Self::read(response).map_err(|e| match e {
            ApiError::Status { status, body } if (400..500).contains(&status) => {
                ApiError::Auth(auth_message(&body))
            }
            other => other,
        })
    }

    pub fn sign_in(&self, email: &str, password: &str) -> Result<AuthSession, ApiError> {
        debug!(%email, "signing in");
        let body = self.auth_post(
            "token?grant_type=password",
            &json!({ "email": email, "password": password }),
        )?;
        Self::decode(&body)
    }

    /// Returns a session unless the backend wants the email confirmed first
    pub fn sign_up(
        &self,
        email: &str,
        password: &str,
        full_name: &str,
        phone: &str,
    ) -> Result<Option<AuthSession>, ApiError> {
        debug!(%email, "registering");
        let body = self.auth_post(
            "signup",
            &json!({
                "email": email,
                "password": password,
                "data": { "full_name": full_name, "phone": phone },
            }),
        )?;
        let value: Value = serde_json::from_str(&body)?;
        if value.get("access_token").is_some() {
            Ok(Some(serde_json::from_value(value)?))
        } else {
            let _user: AuthUser = serde_json::from_value(value)?;
            Ok(None)
        }
    }

    // ------------------------------------------------------------------
    // Generic table access
    // ------------------------------------------------------------------

    pub fn select<T: DeserializeOwned>(&self, table: &str, query: &Query) -> Result<Vec<T>, ApiError> {
        let mut request = self
            .agent
            .get(&self.rest_url(table))
            .header("apikey", &self.anon_key)
            .header("Authorization", &self.bearer());
        for (k, v) in query.pairs() {
            request = request.query(k, v);
        }
        let body = Self::read(request.call()?)?;
        Self::decode(&body)
    }

    pub fn insert<B: Serialize, T: DeserializeOwned>(&self, table: &str, row: &B) -> Result<T, ApiError> {
        let payload = serde_json::to_string(row)?;
        let response = self
            .agent
            .post(&self.rest_url(table))
            .header("apikey", &self.anon_key)
            .header("Authorization", &self.bearer())
            .header("Content-Type", "application/json")
            .header("Prefer", "return=representation")
            .send(payload)?;
        let body = Self::read(response)?;
        let mut rows: Vec<T> = Self::decode(&body)?;
        if rows.is_empty() {
            return Err(ApiError::NotFound(format!("inserted {} row", table)));
        }
        Ok(rows.remove(0))
    }

    pub fn update<B: Serialize>(&self, table: &str, filter: &Query, changes: &B) -> Result<(), ApiError> {
        let payload = serde_json::to_string(changes)?;
        let mut request = self
            .agent
            .patch(&self.rest_url(table))
            .header("apikey", &self.anon_key)
            .header("Authorization", &self.bearer())
            .header("Content-Type", "application/json");
        for (k, v) in filter.pairs() {
            request = request.query(k, v);
        }
        Self::read(request.send(payload)?)?;
        Ok(())
    }

    pub fn delete(&self, table: &str, filter: &Query) -> Result<(), ApiError> {
        let mut request = self
            .agent
            .delete(&self.rest_url(table))
            .header("apikey", &self.anon_key)
            .header("Authorization", &self.bearer());
        for (k, v) in filter.pairs() {
            request = request.query(k, v);
        }
        Self::read(request.call()?)?;
        Ok(())
    }

    /// Exact row count for `query`
    pub fn count(&self, table: &str, query: &Query) -> Result<u64, ApiError> {
        let mut request = self
            .agent
            .get(&self.rest_url(table))
            .header("apikey", &self.anon_key)
            .header("Authorization", &self.bearer())
            .header("Prefer", "count=exact")
            .header("Range", "0-0");
        for (k, v) in query.pairs() {
            request = request.query(k, v);
        }
        let response = request.call()?;
        let total = response
            .headers()
            .get("Content-Range")
            .and_then(|v| v.to_str().ok())
            .and_then(parse_content_range);
        Self::read(response)?;
        match total {
            Some(n) => Ok(n),
            None => {
                warn!(%table, "count requested but no Content-Range returned");
                Ok(0)
            }
        }
    }

    fn first<T: DeserializeOwned>(&self, table: &str, query: &Query, what: &str) -> Result<T, ApiError> {
        self.select::<T>(table, query)?
            .into_iter()
            .next()
            .ok_or_else(|| ApiError::NotFound(what.to_string()))
    }

    // ------------------------------------------------------------------
    // Viewer
    // ------------------------------------------------------------------

    pub fn get_profile(&self, user_id: &str) -> Result<Profile, ApiError> {
        self.first("profiles", &Query::new().eq("id", user_id), "profile")
    }

    pub fn is_admin(&self, user_id: &str) -> Result<bool, ApiError> {
        let roles: Vec<UserRole> = self.select(
            "user_roles",
            &Query::new().eq("user_id", user_id).eq("role", "admin"),
        )?;
        Ok(!roles.is_empty())
    }

    /// Active channels in display order
    pub fn list_channels(&self, category: Option<&str>, limit: Option<usize>) -> Result<Vec<Channel>, ApiError> {
        let mut query = Query::new().eq("is_active", true);
        if let Some(category) = category {
            query = query.eq("category", category);
        }
        query = query.order("order_index", true);
        if let Some(limit) = limit {
            query = query.limit(limit);
        }
        self.select("channels", &query)
    }

    pub fn get_channel(&self, id: &str) -> Result<Channel, ApiError> {
        self.first("channels", &Query::new().eq("id", id), "channel")
    }

    pub fn list_matches(&self, featured_only: bool, limit: Option<usize>) -> Result<Vec<Match>, ApiError> {
        let mut query = Query::new();
        if featured_only {
            query = query.eq("is_featured", true);
        }
        query = query.order("match_time", true);
        if let Some(limit) = limit {
            query = query.limit(limit);
        }
        self.select("matches", &query)
    }

    pub fn list_slideshows(&self, active_only: bool) -> Result<Vec<Slideshow>, ApiError> {
        let mut query = Query::new();
        if active_only {
            query = query.eq("is_active", true);
        }
        self.select("slideshows", &query.order("order_index", true))
    }

    pub fn create_payment_request(&self, request: &NewPaymentRequest) -> Result<PaymentRequest, ApiError> {
        self.insert("payment_requests", request)
    }

    pub fn my_payment_requests(&self, user_id: &str) -> Result<Vec<PaymentRequest>, ApiError> {
        self.select(
            "payment_requests",
            &Query::new().eq("user_id", user_id).order("created_at", false),
        )
    }

    // ------------------------------------------------------------------
    // Admin
    // ------------------------------------------------------------------

    pub fn dashboard_stats(&self) -> Result<DashboardStats, ApiError> {
        let ids = Query::new().select("id");
        Ok(DashboardStats {
            channels: self.count("channels", &ids)?,
            matches: self.count("matches", &ids)?,
            users: self.count("profiles", &ids)?,
            pending_payments: self.count("payment_requests", &ids.clone().eq("status", "pending"))?,
        })
    }

    pub fn list_payment_requests(&self) -> Result<Vec<PaymentRequest>, ApiError> {
        self.select("payment_requests", &Query::new().order("created_at", false))
    }

    pub fn list_profiles(&self) -> Result<Vec<Profile>, ApiError> {
        self.select("profiles", &Query::new().order("created_at", false))
    }

    pub fn list_all_channels(&self) -> Result<Vec<Channel>, ApiError> {
        self.select("channels", &Query::new().order("order_index", true))
    }

    pub fn list_all_matches(&self) -> Result<Vec<Match>, ApiError> {
        self.select("matches", &Query::new().order("match_time", false))
    }

    /// Mark the payment approved and activate the payer for one period
    pub fn approve_payment(
        &self,
        payment: &PaymentRequest,
        admin_id: &str,
        now: DateTime<Utc>,
    ) -> Result<(), ApiError> {
        self.update(
            "payment_requests",
            &Query::filter().eq("id", &payment.id),
            &json!({
                "status": PaymentStatus::Approved,
                "approved_at": now,
                "approved_by": admin_id,
            }),
        )?;
        self.update(
            "profiles",
            &Query::filter().eq("id", &payment.user_id),
            &json!({
                "status": SubscriptionState::Active,
                "subscription_expires_at": activation_expiry(now),
            }),
        )
    }

    pub fn reject_payment(&self, payment_id: &str) -> Result<(), ApiError> {
        self.update(
            "payment_requests",
            &Query::filter().eq("id", payment_id),
            &json!({ "status": PaymentStatus::Rejected }),
        )
    }

    /// Activating grants a fresh period, other states keep the stored expiry
    pub fn set_user_status(
        &self,
        user_id: &str,
        status: SubscriptionState,
        now: DateTime<Utc>,
    ) -> Result<(), ApiError> {
        let changes = match status {
            SubscriptionState::Active => json!({
                "status": status,
                "subscription_expires_at": activation_expiry(now),
            }),
            _ => json!({ "status": status }),
        };
        self.update("profiles", &Query::filter().eq("id", user_id), &changes)
    }
}
