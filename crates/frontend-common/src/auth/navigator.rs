//! Browser-history navigation to the sign-in route

use placer_http::Navigator;
use yew_router::history::{BrowserHistory, History};

/// Pushes a fixed route onto the browser history
///
/// Any `yew_router` router listening on browser history picks the change up.
#[derive(Debug, Clone)]
pub struct HistoryNavigator {
    route: String,
}

impl HistoryNavigator {
    #[must_use]
    pub fn new(route: impl Into<String>) -> Self {
        Self {
            route: route.into(),
        }
    }

    #[must_use]
    pub fn route(&self) -> &str {
        &self.route
    }
}

impl Navigator for HistoryNavigator {
    fn to_sign_in(&self) {
        tracing::debug!(route = %self.route, "Navigating to sign-in");
        BrowserHistory::new().push(self.route.clone());
    }
}
