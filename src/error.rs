//! Error types

use thiserror::Error;

/// Failures talking to the backend or the football schedule API
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("request failed: {0}")]
    Transport(#[from] ureq::Error),
    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },
    #[error("invalid response: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("{0} not found")]
    NotFound(String),
    #[error("authentication failed: {0}")]
    Auth(String),
    #[error("backend is not configured")]
    NotConfigured,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config io: {0}")]
    Io(#[from] std::io::Error),
    #[error("config format: {0}")]
    Format(#[from] serde_json::Error),
}

/// Rejected payment request form
#[derive(Debug, Error, PartialEq)]
pub enum PaymentError {
    #[error("phone number is required")]
    MissingPhone,
    #[error("invalid M-Pesa number: {0}")]
    InvalidPhone(String),
    #[error("subscription is already active")]
    AlreadyActive,
}

#[derive(Debug, Error, PartialEq)]
pub enum PlayerError {
    #[error("fullscreen request denied: {0}")]
    FullscreenDenied(String),
}

/// Admin editor input that cannot be saved
#[derive(Debug, Error, PartialEq)]
pub enum FormError {
    #[error("{0} is required")]
    Required(&'static str),
    #[error("{0} must be a whole number")]
    InvalidNumber(&'static str),
    #[error("invalid date/time '{0}', expected YYYY-MM-DD HH:MM")]
    InvalidTime(String),
}
