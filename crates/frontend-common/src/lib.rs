//! Browser wiring for the Placer session layer
//!
//! Wrap the application in [`SessionProvider`] and read the session through
//! the hooks in [`auth`].

pub mod auth;
pub mod client;
pub mod config;
pub mod logging;

pub use auth::{
    SessionHandle, SessionProvider, use_identity, use_is_authenticated, use_session,
    use_session_state,
};
pub use client::{create_session_client, create_session_context};
pub use config::FrontendConfig;
pub use logging::init_logging;
