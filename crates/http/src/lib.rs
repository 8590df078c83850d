//! Placer HTTP session layer
//!
//! Holds the short-lived access token in memory, talks to the backend auth
//! endpoints, and wraps authenticated API calls with a single
//! refresh-then-retry step on 401. [`session::SessionContext`] exposes the
//! resulting identity and loading state to the rest of the application.

pub mod client;
pub mod session;
pub mod types;

pub use client::{
    ApiGateway, ClientError, IdentityClaims, RefreshOutcome, SessionClient, SessionClientBuilder,
    SessionConfig, SessionError, TokenStore, decode_claims,
};
pub use session::{Navigator, SessionContext, SessionState};
