//! Session client construction for the browser

use crate::auth::HistoryNavigator;
use crate::config::FrontendConfig;
pub use placer_http::ClientError;
use placer_http::{SessionClient, SessionContext};
use web_sys::window;

/// Backend origin: the compile-time override, else the page's own origin
fn get_base_url() -> Option<String> {
    if let Some(url) = FrontendConfig::BACKEND_URL.filter(|url| !url.trim().is_empty()) {
        return Some(url.to_string());
    }

    window().and_then(|window| window.location().origin().ok())
}

/// Create the session client for this page
pub fn create_session_client() -> Result<SessionClient, ClientError> {
    let base_url = get_base_url()
        .ok_or_else(|| ClientError::Configuration("no backend origin available".into()))?;

    SessionClient::builder().base_url(base_url).build()
}

/// Create the page's session context, navigating with browser history
pub fn create_session_context() -> Result<SessionContext, ClientError> {
    let navigator = HistoryNavigator::new(FrontendConfig::SIGN_IN_ROUTE);
    Ok(SessionContext::new(
        create_session_client()?,
        Box::new(navigator),
    ))
}
