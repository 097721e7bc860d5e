//! courseforge delivery layer
//!
//! The [`DeliveryTransport`] trait is the opaque capability for talking to
//! the target platform; [`SimulatedTransport`] and [`HttpTransport`]
//! implement it. The [`Deliverer`] wraps any transport with a sliding-window
//! rate limiter, per-call timeouts, and exponential backoff, and yields
//! [`DeliveryOutcome`] values instead of propagating per-element failures.

pub mod channel;
pub mod limiter;
pub mod transport;

pub use channel::{Deliverer, DeliveryOutcome, DeliveryStatus, RetryPolicy};
pub use limiter::RateLimiter;
pub use transport::{ContentBlock, DeliveryTransport, HttpTransport, SimulatedTransport};

/// A specialized `Result` type for delivery operations.
pub type Result<T> = std::result::Result<T, DeliveryError>;

/// Errors from delivery transport calls.
///
/// Transient errors are retried with backoff by the [`Deliverer`];
/// non-transient errors fail the call immediately.
#[derive(Debug, thiserror::Error)]
pub enum DeliveryError {
    /// The platform rejected the credentials or session token.
    #[error("authentication rejected: {message}\n\nSuggestion: Check the platform credentials in courseforge.json")]
    Authentication {
        /// Detail from the platform.
        message: String,
    },

    /// The platform rejected the request itself (4xx other than auth or
    /// rate limiting). Retrying the same payload will not help.
    #[error("request rejected by platform ({status}): {message}")]
    Rejected {
        /// HTTP status code.
        status: u16,
        /// Detail from the platform.
        message: String,
    },

    /// The platform signalled rate limiting (429).
    #[error("platform rate limit hit")]
    RateLimited,

    /// The call exceeded the per-call timeout.
    #[error("call timed out after {timeout_secs}s")]
    Timeout {
        /// The timeout that was exceeded, in seconds.
        timeout_secs: u64,
    },

    /// The platform reported a server-side failure (5xx).
    #[error("platform server error ({status}): {message}")]
    Server {
        /// HTTP status code.
        status: u16,
        /// Detail from the platform.
        message: String,
    },

    /// The request never produced an HTTP response.
    #[error("network error: {message}")]
    Network {
        /// Underlying error description.
        message: String,
    },
}

impl DeliveryError {
    /// Returns `true` if retrying the same call may succeed.
    ///
    /// # Examples
    ///
    /// ```
    /// use forge_delivery::DeliveryError;
    ///
    /// assert!(DeliveryError::RateLimited.is_transient());
    /// assert!(!DeliveryError::Authentication { message: "bad token".into() }.is_transient());
    /// ```
    #[must_use]
    pub const fn is_transient(&self) -> bool {
        matches!(
            self,
            Self::RateLimited | Self::Timeout { .. } | Self::Server { .. } | Self::Network { .. }
        )
    }
}
