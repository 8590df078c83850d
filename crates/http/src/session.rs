//! Observable session state for the rest of the application
//!
//! [`SessionContext`] is created once per page and handed to whoever needs the
//! signed-in identity. It starts out unknown (`loading = true`), settles into
//! authenticated or anonymous after [`SessionContext::bootstrap`], and only
//! moves between those two through explicit sign-in, sign-up and sign-out.

use crate::client::{ApiGateway, IdentityClaims, SessionClient, SessionError};
use tokio::sync::watch;
use tracing::debug;

/// Moves the application to its sign-in entry point
#[cfg_attr(test, mockall::automock)]
pub trait Navigator {
    fn to_sign_in(&self);
}

/// Identity plus loading flag as seen by the UI
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionState {
    pub identity: Option<IdentityClaims>,
    pub loading: bool,
}

impl SessionState {
    /// State before bootstrap has finished
    #[must_use]
    pub fn unknown() -> Self {
        Self {
            identity: None,
            loading: true,
        }
    }

    #[must_use]
    pub fn anonymous() -> Self {
        Self {
            identity: None,
            loading: false,
        }
    }

    #[must_use]
    pub fn authenticated(identity: IdentityClaims) -> Self {
        Self {
            identity: Some(identity),
            loading: false,
        }
    }

    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.identity.is_some()
    }
}

impl Default for SessionState {
    fn default() -> Self {
        Self::unknown()
    }
}

/// Session state container with sign-in, sign-up and sign-out actions
pub struct SessionContext {
    client: SessionClient,
    state: watch::Sender<SessionState>,
    navigator: Box<dyn Navigator>,
}

impl SessionContext {
    pub fn new(client: SessionClient, navigator: Box<dyn Navigator>) -> Self {
        let (state, _) = watch::channel(SessionState::unknown());
        Self {
            client,
            state,
            navigator,
        }
    }

    /// Snapshot of the current state
    #[must_use]
    pub fn state(&self) -> SessionState {
        self.state.borrow().clone()
    }

    /// Subscribe to state changes
    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.state.subscribe()
    }

    #[must_use]
    pub fn identity(&self) -> Option<IdentityClaims> {
        self.state.borrow().identity.clone()
    }

    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.state.borrow().loading
    }

    #[must_use]
    pub fn client(&self) -> &SessionClient {
        &self.client
    }

    /// Gateway for authenticated API calls sharing this session's token
    #[must_use]
    pub fn gateway(&self) -> ApiGateway {
        self.client.gateway()
    }

    /// Recover an existing session from the durable cookie
    ///
    /// Ends authenticated when the refresh yields a decodable token and
    /// anonymous otherwise. Never fails.
    pub async fn bootstrap(&self) -> SessionState {
        let guard = Transition::begin(&self.state, Fallback::Anonymous);
        let identity = self.client.current_identity().await;
        debug!(authenticated = identity.is_some(), "Session bootstrap finished");
        guard.commit(identity);
        self.state()
    }

    /// Sign in; on failure the previous identity is kept and the error is returned
    pub async fn sign_in(&self, email: &str, password: &str) -> Result<IdentityClaims, SessionError> {
        let guard = Transition::begin(&self.state, Fallback::KeepIdentity);
        let identity = self.client.sign_in(email, password).await?;
        guard.commit(Some(identity.clone()));
        Ok(identity)
    }

    /// Register and sign in; on failure the previous identity is kept
    pub async fn sign_up(
        &self,
        email: &str,
        name: &str,
        password: &str,
    ) -> Result<IdentityClaims, SessionError> {
        let guard = Transition::begin(&self.state, Fallback::KeepIdentity);
        let identity = self.client.sign_up(email, name, password).await?;
        guard.commit(Some(identity.clone()));
        Ok(identity)
    }

    /// Sign out, become anonymous and navigate to sign-in, whatever the backend says
    pub async fn sign_out(&self) {
        let guard = Transition::begin(&self.state, Fallback::Anonymous);
        self.client.sign_out().await;
        guard.commit(None);
        self.navigator.to_sign_in();
    }
}

/// What an interrupted transition leaves behind
#[derive(Clone, Copy)]
enum Fallback {
    KeepIdentity,
    Anonymous,
}

/// Holds `loading = true` for the duration of an action
///
/// Dropping without [`commit`](Transition::commit) applies the fallback, so
/// an error or a cancelled future never leaves the state stuck loading.
struct Transition<'a> {
    state: &'a watch::Sender<SessionState>,
    fallback: Fallback,
    committed: bool,
}

impl<'a> Transition<'a> {
    fn begin(state: &'a watch::Sender<SessionState>, fallback: Fallback) -> Self {
        state.send_if_modified(|s| !std::mem::replace(&mut s.loading, true));
        Self {
            state,
            fallback,
            committed: false,
        }
    }

    fn commit(mut self, identity: Option<IdentityClaims>) {
        self.committed = true;
        self.state.send_replace(SessionState {
            identity,
            loading: false,
        });
    }
}

impl Drop for Transition<'_> {
    fn drop(&mut self) {
        if self.committed {
            return;
        }
        let fallback = self.fallback;
        self.state.send_modify(|s| {
            s.loading = false;
            if matches!(fallback, Fallback::Anonymous) {
                s.identity = None;
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use base64::Engine as _;
    use base64::engine::general_purpose::URL_SAFE_NO_PAD;
    use serde_json::json;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn token_for(sub: &str, name: &str) -> String {
        let payload = json!({"sub": sub, "email": format!("{sub}@example.com"), "name": name});
        format!(
            "{}.{}.sig",
            URL_SAFE_NO_PAD.encode(br#"{"alg":"HS256"}"#),
            URL_SAFE_NO_PAD.encode(payload.to_string())
        )
    }

    fn quiet_navigator() -> Box<dyn Navigator> {
        let mut navigator = MockNavigator::new();
        navigator.expect_to_sign_in().times(0);
        Box::new(navigator)
    }

    fn context(server: &MockServer, navigator: Box<dyn Navigator>) -> SessionContext {
        let client = SessionClient::builder()
            .base_url(server.uri())
            .build()
            .unwrap();
        SessionContext::new(client, navigator)
    }

    async fn mount_login(server: &MockServer, body: ResponseTemplate) {
        Mock::given(method("POST"))
            .and(path("/api/auth/login"))
            .respond_with(body)
            .mount(server)
            .await;
    }

    #[tokio::test]
    async fn test_starts_unknown() {
        let server = MockServer::start().await;
        let session = context(&server, quiet_navigator());

        assert_eq!(session.state(), SessionState::unknown());
        assert!(session.is_loading());
    }

    #[tokio::test]
    async fn test_bootstrap_with_valid_cookie_authenticates() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/auth/refresh"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({"token": token_for("u1", "Ada")})),
            )
            .expect(1)
            .mount(&server)
            .await;

        let session = context(&server, quiet_navigator());
        let mut updates = session.subscribe();

        let state = session.bootstrap().await;

        assert!(!state.loading);
        assert_eq!(state.identity.as_ref().map(|i| i.id.as_str()), Some("u1"));
        assert!(session.client().access_token().is_some());
        assert!(updates.has_changed().unwrap());
        assert!(updates.borrow_and_update().is_authenticated());
    }

    #[tokio::test]
    async fn test_bootstrap_without_session_is_anonymous() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/auth/refresh"))
            .respond_with(ResponseTemplate::new(401).set_body_string("Refresh token required"))
            .mount(&server)
            .await;

        let session = context(&server, quiet_navigator());
        assert_eq!(session.bootstrap().await, SessionState::anonymous());
    }

    #[tokio::test]
    async fn test_bootstrap_with_undecodable_token_is_anonymous() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/auth/refresh"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"token": "garbage"})))
            .mount(&server)
            .await;

        let session = context(&server, quiet_navigator());
        assert_eq!(session.bootstrap().await, SessionState::anonymous());
    }

    #[tokio::test]
    async fn test_bootstrap_with_unreachable_backend_is_anonymous() {
        // Nothing listens on the discard port
        let client = SessionClient::builder()
            .base_url("http://127.0.0.1:9")
            .build()
            .unwrap();
        let session = SessionContext::new(client, quiet_navigator());
        assert_eq!(session.bootstrap().await, SessionState::anonymous());
    }

    #[tokio::test]
    async fn test_sign_in_success_authenticates() {
        let server = MockServer::start().await;
        mount_login(
            &server,
            ResponseTemplate::new(200).set_body_json(json!({"token": token_for("u7", "Grace")})),
        )
        .await;

        let session = context(&server, quiet_navigator());
        let identity = session.sign_in("u7@example.com", "pw").await.unwrap();

        assert_eq!(identity.name.as_deref(), Some("Grace"));
        assert_eq!(session.state(), SessionState::authenticated(identity));
    }

    #[tokio::test]
    async fn test_sign_in_failure_keeps_previous_state() {
        let server = MockServer::start().await;
        mount_login(
            &server,
            ResponseTemplate::new(401).set_body_string("Invalid credentials"),
        )
        .await;
        Mock::given(method("POST"))
            .and(path("/api/auth/refresh"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;

        let session = context(&server, quiet_navigator());
        session.bootstrap().await;

        let err = session.sign_in("a@b.com", "wrong").await.unwrap_err();

        assert!(matches!(err, SessionError::Authentication { .. }));
        assert_eq!(err.to_string(), "Invalid credentials");
        assert_eq!(session.state(), SessionState::anonymous());
    }

    #[tokio::test]
    async fn test_sign_in_failure_keeps_existing_identity() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/auth/refresh"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({"token": token_for("u1", "Ada")})),
            )
            .mount(&server)
            .await;
        mount_login(&server, ResponseTemplate::new(500)).await;

        let session = context(&server, quiet_navigator());
        let before = session.bootstrap().await;

        let err = session.sign_in("other@b.com", "pw").await.unwrap_err();

        assert_eq!(err.to_string(), "Login failed");
        assert_eq!(session.state(), before);
    }

    #[tokio::test]
    async fn test_undecodable_login_token_keeps_identity_backed_by_token() {
        let server = MockServer::start().await;
        let original = token_for("u1", "Ada");
        Mock::given(method("POST"))
            .and(path("/api/auth/refresh"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"token": original.clone()})))
            .mount(&server)
            .await;
        mount_login(
            &server,
            ResponseTemplate::new(200).set_body_json(json!({"token": "garbage"})),
        )
        .await;

        let session = context(&server, quiet_navigator());
        let before = session.bootstrap().await;
        assert!(before.is_authenticated());

        let err = session.sign_in("other@b.com", "pw").await.unwrap_err();

        assert!(matches!(err, SessionError::Authentication { status: Some(200), .. }));
        assert_eq!(session.state(), before);
        assert!(session.identity().is_some());
        assert_eq!(session.client().access_token(), Some(original));
    }

    #[tokio::test]
    async fn test_sign_up_then_failing_sign_in_is_not_authenticated() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/auth/register"))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({
                "id": "u9", "email": "new@b.com", "name": "New"
            })))
            .expect(1)
            .mount(&server)
            .await;
        mount_login(
            &server,
            ResponseTemplate::new(401).set_body_string("Invalid credentials"),
        )
        .await;

        let session = context(&server, quiet_navigator());
        session.bootstrap().await;

        let err = session
            .sign_up("new@b.com", "New", "pw")
            .await
            .unwrap_err();

        assert!(matches!(err, SessionError::Authentication { status: Some(401), .. }));
        assert!(!session.state().is_authenticated());
        assert!(!session.is_loading());
    }

    #[tokio::test]
    async fn test_sign_up_success_authenticates() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/auth/register"))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({
                "id": "u9", "email": "new@b.com", "name": "New"
            })))
            .mount(&server)
            .await;
        mount_login(
            &server,
            ResponseTemplate::new(200).set_body_json(json!({"token": token_for("u9", "New")})),
        )
        .await;

        let session = context(&server, quiet_navigator());
        let identity = session.sign_up("new@b.com", "New", "pw").await.unwrap();

        assert_eq!(identity.id, "u9");
        assert!(session.state().is_authenticated());
    }

    #[tokio::test]
    async fn test_sign_out_navigates_even_when_backend_fails() {
        let server = MockServer::start().await;
        mount_login(
            &server,
            ResponseTemplate::new(200).set_body_json(json!({"token": token_for("u1", "Ada")})),
        )
        .await;
        Mock::given(method("POST"))
            .and(path("/api/auth/logout"))
            .respond_with(ResponseTemplate::new(500))
            .expect(1)
            .mount(&server)
            .await;

        let mut navigator = MockNavigator::new();
        navigator.expect_to_sign_in().times(1).return_const(());

        let session = context(&server, Box::new(navigator));
        session.sign_in("u1@example.com", "pw").await.unwrap();

        session.sign_out().await;

        assert_eq!(session.state(), SessionState::anonymous());
        assert_eq!(session.client().access_token(), None);
    }

    #[tokio::test]
    async fn test_interrupted_action_does_not_stay_loading() {
        let server = MockServer::start().await;
        mount_login(
            &server,
            ResponseTemplate::new(200)
                .set_body_json(json!({"token": token_for("u1", "Ada")}))
                .set_delay(std::time::Duration::from_secs(5)),
        )
        .await;

        let session = context(&server, quiet_navigator());
        {
            let pending = session.sign_in("u1@example.com", "pw");
            let timed_out =
                tokio::time::timeout(std::time::Duration::from_millis(50), pending).await;
            assert!(timed_out.is_err());
        }

        assert!(!session.is_loading());
        assert_eq!(session.identity(), None);
    }
}
