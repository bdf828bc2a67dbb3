//! Typed access to the TaskDesk dashboard endpoints.
//!
//! Every call goes through [`SessionClient::request`], so bearer attachment
//! and token refresh are handled below this layer.

use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, warn};

use crate::auth::{Role, SessionStore};
use crate::client::SessionClient;
use crate::http::{Request, Response, Transport};
use crate::models::{Invite, InviteRequest, RoleChange, StatusUpdate, Task, TaskDraft, TaskStats, User};

use super::{demo, ApiError, Fetched};

/// API client for TaskDesk dashboards.
/// Clone is cheap - the session client is shared behind an Arc.
pub struct ApiClient<T, S> {
    session: Arc<SessionClient<T, S>>,
    demo_mode: bool,
}

impl<T, S> Clone for ApiClient<T, S> {
    fn clone(&self) -> Self {
        Self {
            session: Arc::clone(&self.session),
            demo_mode: self.demo_mode,
        }
    }
}

impl<T: Transport, S: SessionStore> ApiClient<T, S> {
    pub fn new(session: Arc<SessionClient<T, S>>) -> Self {
        Self {
            session,
            demo_mode: false,
        }
    }

    /// Serve sample data when a read fails for reasons other than the session.
    pub fn with_demo_mode(mut self, enabled: bool) -> Self {
        self.demo_mode = enabled;
        self
    }

    pub fn session(&self) -> &SessionClient<T, S> {
        &self.session
    }

    // ===== Admin =====

    pub async fn task_stats(&self) -> Result<Fetched<TaskStats>, ApiError> {
        self.read_or_demo("/task/stats", demo::task_stats).await
    }

    pub async fn users(&self) -> Result<Fetched<Vec<User>>, ApiError> {
        self.read_or_demo("/user/fetch", Vec::new).await
    }

    pub async fn invites(&self) -> Result<Fetched<Vec<Invite>>, ApiError> {
        self.read_or_demo("/user/invite", Vec::new).await
    }

    pub async fn send_invite(&self, invite: &InviteRequest) -> Result<(), ApiError> {
        self.send_json(Request::post("/user/invite"), invite).await
    }

    pub async fn remove_user(&self, user_id: &str) -> Result<(), ApiError> {
        self.execute(Request::delete(format!("/api/users/{}", user_id)))
            .await
            .map(drop)
    }

    pub async fn change_role(&self, user_id: &str, role: Role) -> Result<(), ApiError> {
        let request = Request::patch(format!("/api/users/{}/role", user_id));
        self.send_json(request, &RoleChange { role }).await
    }

    // ===== Manager =====

    pub async fn tasks(&self) -> Result<Fetched<Vec<Task>>, ApiError> {
        self.read_or_demo("/task/tasks", demo::tasks).await
    }

    pub async fn members(&self) -> Result<Fetched<Vec<User>>, ApiError> {
        self.read_or_demo("/user/fetchmembers", Vec::new).await
    }

    pub async fn create_task(&self, draft: &TaskDraft) -> Result<(), ApiError> {
        self.send_json(Request::post("/task/create"), draft).await
    }

    pub async fn update_task(&self, task_id: &str, draft: &TaskDraft) -> Result<(), ApiError> {
        self.send_json(Request::put(format!("/task/tasks/{}", task_id)), draft)
            .await
    }

    // ===== Member =====

    pub async fn my_tasks(&self) -> Result<Fetched<Vec<Task>>, ApiError> {
        self.read_or_demo("/task/get", Vec::new).await
    }

    pub async fn update_task_status(&self, task_id: &str, update: &StatusUpdate) -> Result<(), ApiError> {
        self.send_json(Request::patch(format!("/task/tasks/{}", task_id)), update)
            .await
    }

    // ===== Helpers =====

    async fn execute(&self, request: Request) -> Result<Response, ApiError> {
        let path = request.path().to_string();
        let response = self.session.request(request).await?;
        if response.is_success() {
            Ok(response)
        } else {
            debug!(path = %path, status = response.status().as_u16(), "Request failed");
            Err(ApiError::from_response(&response))
        }
    }

    async fn get<R: DeserializeOwned>(&self, path: &str) -> Result<R, ApiError> {
        let response = self.execute(Request::get(path)).await?;
        response
            .json()
            .map_err(|e| ApiError::InvalidResponse(format!("Failed to parse response from {}: {}", path, e)))
    }

    async fn send_json<B: Serialize>(&self, request: Request, body: &B) -> Result<(), ApiError> {
        let request = request
            .json(body)
            .map_err(crate::client::SessionError::from)?;
        self.execute(request).await.map(drop)
    }

    async fn read_or_demo<R, F>(&self, path: &str, sample: F) -> Result<Fetched<R>, ApiError>
    where
        R: DeserializeOwned,
        F: FnOnce() -> R,
    {
        match self.get(path).await {
            Ok(value) => Ok(Fetched::Live(value)),
            Err(e) if self.demo_mode && e.allows_demo_data() => {
                warn!(path = path, error = %e, "Read failed, serving demo data");
                Ok(Fetched::Demo(sample()))
            }
            Err(e) => Err(e),
        }
    }
}
