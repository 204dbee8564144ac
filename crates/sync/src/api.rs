//! HTTP client for the Skillstack REST API.
//!
//! [`LearningApi`] is the seam the sync store works against; tests swap
//! in a scripted implementation, production uses [`HttpLearningApi`]
//! over `reqwest`.

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::{Method, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;

use crate::config::ApiConfig;
use crate::error::{ApiError, ApiResult, SESSION_EXPIRED_DETAIL};
use crate::session::TokenStore;
use crate::wire::{
    ActivityPayload, ActivityRecord, CourseRecord, GoalPatch, GoalPayload, GoalRecord,
    WeeklySummary,
};
use skillstack_core::types::DbId;

/// Remote operations the sync store depends on.
#[async_trait]
pub trait LearningApi: Send + Sync {
    /// `GET /goals/` -- all goals for the authenticated user.
    async fn list_goals(&self) -> ApiResult<Vec<GoalRecord>>;

    /// `POST /goals/` -- create a goal, returning the server record.
    async fn create_goal(&self, payload: &GoalPayload) -> ApiResult<GoalRecord>;

    /// `PATCH /goals/{id}/` -- persist a partial update.
    ///
    /// Returns `Ok(None)` when the server acknowledges without a usable
    /// body (204, or a body that is not a goal record); the local
    /// optimistic state then stands as-is.
    async fn update_goal(&self, id: DbId, patch: &GoalPatch) -> ApiResult<Option<GoalRecord>>;

    /// `DELETE /goals/{id}/`.
    async fn delete_goal(&self, id: DbId) -> ApiResult<()>;

    /// `GET /activities/` -- all activities, newest first.
    async fn list_activities(&self) -> ApiResult<Vec<ActivityRecord>>;

    /// `POST /activities/` -- log an activity, returning the server record.
    async fn create_activity(&self, payload: &ActivityPayload) -> ApiResult<ActivityRecord>;

    /// `POST /course-import/` -- fetch course metadata for a URL.
    async fn import_course(&self, url: &str) -> ApiResult<CourseRecord>;

    /// `POST /learning-summary/send-weekly/` -- build (and optionally
    /// email) the weekly digest.
    async fn send_weekly_summary(&self) -> ApiResult<WeeklySummary>;
}

/// `reqwest`-backed [`LearningApi`] implementation.
pub struct HttpLearningApi {
    client: reqwest::Client,
    base_url: String,
    tokens: Arc<dyn TokenStore>,
}

impl HttpLearningApi {
    pub fn new(config: &ApiConfig, tokens: Arc<dyn TokenStore>) -> Self {
        Self::with_client(reqwest::Client::new(), config, tokens)
    }

    /// Build with a caller-supplied client (shared pools, test setups).
    pub fn with_client(
        client: reqwest::Client,
        config: &ApiConfig,
        tokens: Arc<dyn TokenStore>,
    ) -> Self {
        Self {
            client,
            base_url: config.base_url.clone(),
            tokens,
        }
    }

    // ---- private helpers ----

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let mut builder = self
            .client
            .request(method, format!("{}{}", self.base_url, path))
            .header(reqwest::header::ACCEPT, "application/json");
        if let Some(token) = self.tokens.access_token() {
            builder = builder.bearer_auth(token);
        }
        builder
    }

    /// Map non-2xx responses to [`ApiError`], consuming the body for its
    /// `detail` message.  401 and 403 are treated uniformly as an
    /// expired session.
    async fn ensure_success(response: Response) -> ApiResult<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let detail = read_detail(response).await;
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Err(ApiError::Unauthorized {
                detail: detail.unwrap_or_else(|| SESSION_EXPIRED_DETAIL.to_string()),
            });
        }
        Err(ApiError::Status {
            status: status.as_u16(),
            detail: detail.unwrap_or_else(|| format!("request failed with status {status}")),
        })
    }

    async fn parse_json<T: DeserializeOwned>(response: Response) -> ApiResult<T> {
        let checked = Self::ensure_success(response).await?;
        Ok(checked.json().await?)
    }
}

/// Extract a human-readable message from an error body.  Accepts either
/// a bare JSON string or an object with a `detail` field; anything else
/// (including a malformed body) yields `None`.
async fn read_detail(response: Response) -> Option<String> {
    let body: serde_json::Value = response.json().await.ok()?;
    match body {
        serde_json::Value::String(s) => Some(s),
        serde_json::Value::Object(map) => match map.get("detail") {
            Some(serde_json::Value::String(s)) => Some(s.clone()),
            _ => None,
        },
        _ => None,
    }
}

#[async_trait]
impl LearningApi for HttpLearningApi {
    async fn list_goals(&self) -> ApiResult<Vec<GoalRecord>> {
        let response = self.request(Method::GET, "/goals/").send().await?;
        Self::parse_json(response).await
    }

    async fn create_goal(&self, payload: &GoalPayload) -> ApiResult<GoalRecord> {
        let response = self
            .request(Method::POST, "/goals/")
            .json(payload)
            .send()
            .await?;
        Self::parse_json(response).await
    }

    async fn update_goal(&self, id: DbId, patch: &GoalPatch) -> ApiResult<Option<GoalRecord>> {
        let response = self
            .request(Method::PATCH, &format!("/goals/{id}/"))
            .json(patch)
            .send()
            .await?;
        let checked = Self::ensure_success(response).await?;
        if checked.status() == StatusCode::NO_CONTENT {
            return Ok(None);
        }
        // A 2xx body that is not a goal record still counts as success;
        // the optimistic local state stands.
        Ok(checked.json().await.ok())
    }

    async fn delete_goal(&self, id: DbId) -> ApiResult<()> {
        let response = self
            .request(Method::DELETE, &format!("/goals/{id}/"))
            .send()
            .await?;
        Self::ensure_success(response).await?;
        Ok(())
    }

    async fn list_activities(&self) -> ApiResult<Vec<ActivityRecord>> {
        let response = self.request(Method::GET, "/activities/").send().await?;
        Self::parse_json(response).await
    }

    async fn create_activity(&self, payload: &ActivityPayload) -> ApiResult<ActivityRecord> {
        let response = self
            .request(Method::POST, "/activities/")
            .json(payload)
            .send()
            .await?;
        Self::parse_json(response).await
    }

    async fn import_course(&self, url: &str) -> ApiResult<CourseRecord> {
        let response = self
            .request(Method::POST, "/course-import/")
            .json(&serde_json::json!({ "url": url }))
            .send()
            .await?;
        Self::parse_json(response).await
    }

    async fn send_weekly_summary(&self) -> ApiResult<WeeklySummary> {
        let response = self
            .request(Method::POST, "/learning-summary/send-weekly/")
            .send()
            .await?;
        Self::parse_json(response).await
    }
}
