//! Session provider, hooks and navigation

pub mod context;
pub mod error_messages;
pub mod navigator;

// Re-export commonly used items
pub use context::{
    SessionHandle, SessionProvider, use_identity, use_is_authenticated, use_session,
    use_session_state,
};
pub use error_messages::user_friendly_error;
pub use navigator::HistoryNavigator;
