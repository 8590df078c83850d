//! User-friendly error message mappings

use placer_http::SessionError;

/// Message to show for a failed sign-in or sign-up
#[must_use]
pub fn user_friendly_error(error: &SessionError) -> String {
    match (error, error.status()) {
        (_, None) => {
            "Connection error. Please check your internet connection and try again.".to_string()
        }
        (SessionError::Registration { .. }, Some(409)) => {
            "An account with this email already exists. Try signing in instead.".to_string()
        }
        (SessionError::Authentication { .. }, Some(401)) => {
            "Invalid email or password.".to_string()
        }
        (_, Some(429)) => "Too many attempts. Please wait a moment and try again.".to_string(),
        (_, Some(status)) if status >= 500 => {
            "Something went wrong on our end. Please try again later.".to_string()
        }
        // The backend's own message is already meant for people
        _ => error.message().to_string(),
    }
}
