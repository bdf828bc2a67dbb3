use std::sync::{Mutex, MutexGuard, PoisonError};

use reqwest::{Method, StatusCode};
use serde::Deserialize;
use tokio::sync::{watch, Mutex as AsyncMutex};
use tracing::{debug, info, warn};

use crate::auth::{Credentials, Identity, OrganizationForm, Session, SessionStore, SignUpForm};
use crate::http::{Request, Response, Transport};

use super::{PendingRequest, SessionError};

// ============================================================================
// Constants
// ============================================================================

/// Storage key holding the serialized session.
pub const SESSION_KEY: &str = "user";

const SIGN_IN_PATH: &str = "/auth/signin";
const SIGN_UP_PATH: &str = "/auth/signup";
const REGISTER_ORGANIZATION_PATH: &str = "/auth/register-organization";
const REFRESH_PATH: &str = "/auth/refresh-token";

const SIGN_IN_FAILED: &str = "Login failed. Please try again.";
const SIGN_UP_FAILED: &str = "Signup failed.";
const REGISTRATION_FAILED: &str = "Organization creation failed.";
const INVITE_TOKEN_REQUIRED: &str = "Invite token is required.";

/// Published to subscribers whenever the session changes hands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionStatus {
    SignedOut,
    SignedIn(Identity),
    /// The session was destroyed because it could not be renewed.
    Expired,
}

#[derive(Debug, Deserialize)]
struct SignInResponse {
    #[serde(rename = "accessToken")]
    access_token: String,
    #[serde(alias = "identity")]
    user: Identity,
}

#[derive(Debug, Deserialize)]
struct RefreshResponse {
    #[serde(rename = "accessToken")]
    access_token: String,
    #[serde(default, alias = "identity")]
    user: Option<Identity>,
}

#[derive(Default)]
struct SessionState {
    session: Option<Session>,
    /// Bumped on every sign-in, refresh and destruction.
    generation: u64,
}

/// Mediates every call to the TaskDesk API.
///
/// Attaches the current access token as a bearer credential and, when the
/// server answers 401, refreshes the token once and resends the request once.
/// The session is persisted through `S` under [`SESSION_KEY`].
///
/// Construct one per process and share it by reference (or `Arc`).
pub struct SessionClient<T, S> {
    transport: T,
    store: S,
    state: Mutex<SessionState>,
    /// Serializes refreshes so concurrent 401s share one refresh call.
    refresh_gate: AsyncMutex<()>,
    refresh_method: Method,
    status: watch::Sender<SessionStatus>,
}

impl<T: Transport, S: SessionStore> SessionClient<T, S> {
    pub fn new(transport: T, store: S) -> Self {
        let (status, _) = watch::channel(SessionStatus::SignedOut);
        Self {
            transport,
            store,
            state: Mutex::new(SessionState::default()),
            refresh_gate: AsyncMutex::new(()),
            refresh_method: Method::GET,
            status,
        }
    }

    /// Use `method` (GET or POST) for the refresh endpoint.
    pub fn with_refresh_method(mut self, method: Method) -> Self {
        self.refresh_method = method;
        self
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    // ===== Session accessors =====

    pub fn session(&self) -> Option<Session> {
        self.state().session.clone()
    }

    pub fn identity(&self) -> Option<Identity> {
        self.state().session.as_ref().map(|s| s.identity.clone())
    }

    pub fn is_authenticated(&self) -> bool {
        self.state().session.is_some()
    }

    /// Watch session changes. The view layer uses this to send the user back
    /// to sign-in on [`SessionStatus::Expired`].
    pub fn subscribe(&self) -> watch::Receiver<SessionStatus> {
        self.status.subscribe()
    }

    // ===== Lifecycle =====

    /// Load the persisted session, if any. Never touches the network.
    ///
    /// A corrupt or token-less entry is treated as absent and removed.
    pub fn restore(&self) -> Option<Session> {
        let restored = match self.store.get(SESSION_KEY) {
            Ok(Some(raw)) => match serde_json::from_str::<Session>(&raw) {
                Ok(session) if session.is_well_formed() => Some(session),
                Ok(_) => {
                    warn!("Stored session has no access token, discarding");
                    self.clear_store();
                    None
                }
                Err(e) => {
                    warn!(error = %e, "Stored session is corrupt, discarding");
                    self.clear_store();
                    None
                }
            },
            Ok(None) => None,
            Err(e) => {
                warn!(error = %e, "Failed to read stored session, discarding");
                self.clear_store();
                None
            }
        };

        let mut state = self.state();
        state.session = restored.clone();
        state.generation += 1;
        drop(state);

        match &restored {
            Some(session) => {
                info!(role = %session.role(), "Session restored");
                self.status
                    .send_replace(SessionStatus::SignedIn(session.identity.clone()));
            }
            None => {
                debug!("No stored session");
                self.status.send_replace(SessionStatus::SignedOut);
            }
        }
        restored
    }

    /// Exchange credentials for a session and persist it.
    ///
    /// On failure the current session, if any, is left alone.
    pub async fn sign_in(&self, credentials: &Credentials) -> Result<Session, SessionError> {
        info!(email = %credentials.email, "Signing in");
        let request = Request::post(SIGN_IN_PATH).json(credentials)?;
        let response = self.submit_auth_form(&request, SIGN_IN_FAILED).await?;

        let body: SignInResponse = response.json().map_err(|e| {
            warn!(error = %e, "Malformed sign-in response");
            SessionError::Authentication(SIGN_IN_FAILED.to_string())
        })?;
        let session = Session::new(body.user, body.access_token);
        if !session.is_well_formed() {
            warn!("Sign-in response carried an empty access token");
            return Err(SessionError::Authentication(SIGN_IN_FAILED.to_string()));
        }

        self.establish(session.clone());
        info!(role = %session.role(), "Signed in");
        Ok(session)
    }

    /// Create an account from an invitation. Does not sign in.
    pub async fn sign_up(&self, form: &SignUpForm) -> Result<(), SessionError> {
        let token = form.token.trim();
        if token.is_empty() {
            return Err(SessionError::Authentication(INVITE_TOKEN_REQUIRED.to_string()));
        }
        let form = SignUpForm {
            token: token.to_string(),
            ..form.clone()
        };

        info!(email = %form.email, "Signing up");
        let request = Request::post(SIGN_UP_PATH).json(&form)?;
        self.submit_auth_form(&request, SIGN_UP_FAILED).await?;
        Ok(())
    }

    /// Register a new organization and its first admin. Does not sign in.
    pub async fn register_organization(&self, form: &OrganizationForm) -> Result<(), SessionError> {
        info!(organization = %form.organization, email = %form.email, "Registering organization");
        let request = Request::post(REGISTER_ORGANIZATION_PATH).json(form)?;
        self.submit_auth_form(&request, REGISTRATION_FAILED).await?;
        Ok(())
    }

    /// Forget the session in memory and in storage. Safe to call repeatedly.
    pub fn sign_out(&self) {
        info!("Signing out");
        self.destroy(SessionStatus::SignedOut);
    }

    /// Drop the session as if it had expired.
    pub fn invalidate(&self) {
        info!("Session invalidated");
        self.destroy(SessionStatus::Expired);
    }

    // ===== Requests =====

    /// Send `request` with the current access token.
    ///
    /// Any status other than 401 is returned as-is, error statuses included.
    /// A 401 triggers one refresh and one resend; if the refresh is rejected
    /// or the resend is still 401, the session is destroyed and
    /// [`SessionError::SessionExpired`] is returned.
    pub async fn request(&self, request: Request) -> Result<Response, SessionError> {
        let (mut token, generation) = self.credentials();
        let mut pending = PendingRequest::new(request);

        loop {
            let response = self.send_attempt(&mut pending, token.as_deref()).await?;
            if response.status() != StatusCode::UNAUTHORIZED {
                return Ok(response);
            }

            if pending.retried() {
                warn!(
                    path = pending.request().path(),
                    attempts = pending.attempts(),
                    "Still unauthorized after refresh"
                );
                self.destroy(SessionStatus::Expired);
                return Err(SessionError::SessionExpired);
            }

            debug!(path = pending.request().path(), "Unauthorized, refreshing access token");
            token = Some(self.refresh_after_rejection(generation).await?);
        }
    }

    /// Ask the server for a new access token using the ambient refresh cookie.
    ///
    /// If a session exists its token is replaced and persisted. If none exists
    /// and the server includes the user, a session is created from it.
    pub async fn refresh(&self) -> Result<String, SessionError> {
        let _gate = self.refresh_gate.lock().await;
        self.refresh_locked().await
    }

    async fn send_attempt(
        &self,
        pending: &mut PendingRequest,
        token: Option<&str>,
    ) -> Result<Response, SessionError> {
        let outgoing = pending
            .next_attempt(token)
            .ok_or(SessionError::SessionExpired)??;
        Ok(self.transport.send(&outgoing).await?)
    }

    /// Refresh on behalf of a request first sent at `generation`.
    ///
    /// If the session changed while this caller waited at the gate, another
    /// caller already refreshed (or the session is gone) and its outcome is
    /// reused instead of refreshing again.
    async fn refresh_after_rejection(&self, generation: u64) -> Result<String, SessionError> {
        let _gate = self.refresh_gate.lock().await;
        {
            let state = self.state();
            if state.generation != generation {
                return match &state.session {
                    Some(session) => {
                        debug!("Session changed while waiting, reusing current token");
                        Ok(session.access_token.clone())
                    }
                    None => Err(SessionError::SessionExpired),
                };
            }
        }
        self.refresh_locked().await
    }

    /// Caller must hold `refresh_gate`.
    async fn refresh_locked(&self) -> Result<String, SessionError> {
        let (current, _) = self.credentials();
        let request = Request::new(self.refresh_method.clone(), REFRESH_PATH)
            .authorized(current.as_deref())?;

        // A transport failure leaves the session in place.
        let response = self.transport.send(&request).await?;
        if !response.is_success() {
            warn!(status = response.status().as_u16(), "Token refresh rejected");
            self.destroy(SessionStatus::Expired);
            return Err(SessionError::SessionExpired);
        }

        match response.json::<RefreshResponse>() {
            Ok(body) if !body.access_token.trim().is_empty() => Ok(self.apply_refresh(body)),
            _ => {
                warn!("Refresh response carried no access token");
                self.destroy(SessionStatus::Expired);
                Err(SessionError::SessionExpired)
            }
        }
    }

    fn apply_refresh(&self, body: RefreshResponse) -> String {
        let RefreshResponse { access_token, user } = body;

        let mut state = self.state();
        let (session, created) = match state.session.take() {
            Some(mut session) => {
                session.replace_token(access_token.clone());
                (session, false)
            }
            None => match user {
                Some(identity) => (Session::new(identity, access_token.clone()), true),
                None => {
                    debug!("Refreshed without a session, token used for this call only");
                    return access_token;
                }
            },
        };
        self.persist(&session);
        state.session = Some(session.clone());
        state.generation += 1;
        drop(state);

        info!("Access token refreshed");
        if created {
            self.status.send_replace(SessionStatus::SignedIn(session.identity));
        }
        access_token
    }

    // ===== Internals =====

    async fn submit_auth_form(&self, request: &Request, fallback: &str) -> Result<Response, SessionError> {
        let response = self.transport.send(request).await.map_err(|e| {
            warn!(path = request.path(), error = %e, "Auth request failed");
            SessionError::Authentication(fallback.to_string())
        })?;

        if response.is_success() {
            Ok(response)
        } else {
            warn!(path = request.path(), status = response.status().as_u16(), "Auth request rejected");
            let message = response
                .server_message()
                .unwrap_or_else(|| fallback.to_string());
            Err(SessionError::Authentication(message))
        }
    }

    fn state(&self) -> MutexGuard<'_, SessionState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn credentials(&self) -> (Option<String>, u64) {
        let state = self.state();
        let token = state.session.as_ref().map(|s| s.access_token.clone());
        (token, state.generation)
    }

    fn establish(&self, session: Session) {
        let mut state = self.state();
        self.persist(&session);
        state.session = Some(session.clone());
        state.generation += 1;
        drop(state);
        self.status.send_replace(SessionStatus::SignedIn(session.identity));
    }

    fn destroy(&self, status: SessionStatus) {
        let mut state = self.state();
        state.session = None;
        state.generation += 1;
        self.clear_store();
        drop(state);
        self.status.send_replace(status);
    }

    fn persist(&self, session: &Session) {
        let result = serde_json::to_string(session)
            .map_err(anyhow::Error::from)
            .and_then(|raw| self.store.set(SESSION_KEY, &raw));
        if let Err(e) = result {
            warn!(error = %e, "Failed to persist session");
        }
    }

    fn clear_store(&self) {
        if let Err(e) = self.store.remove(SESSION_KEY) {
            warn!(error = %e, "Failed to clear stored session");
        }
    }
}
