//! Frontend configuration

/// Session-related frontend settings
pub struct FrontendConfig;

impl FrontendConfig {
    /// Route the app is sent to after sign-out
    pub const SIGN_IN_ROUTE: &'static str = "/signin";

    /// Compile-time backend origin; falls back to the page origin when unset
    pub const BACKEND_URL: Option<&'static str> = option_env!("PLACER_BACKEND_URL");
}
