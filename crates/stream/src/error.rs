//! Errors from the Stream API layer.

/// Errors from the Cloudflare Stream client.
///
/// `Api` and `Provider` are kept distinct: the first is a transport or
/// HTTP-status failure, the second is a well-formed response whose
/// envelope reports `success: false`.
#[derive(Debug, thiserror::Error)]
pub enum StreamError {
    /// The HTTP request itself failed (network, DNS, TLS, etc.).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The provider returned a non-2xx status code.
    #[error("Stream API error ({status}): {body}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Raw response body for debugging.
        body: String,
    },

    /// The provider accepted the request but reported failure in the
    /// response envelope.
    #[error("Stream provider rejected the request: {0}")]
    Provider(String),

    /// Processing did not reach a ready state within the allotted
    /// window. The video may still complete later; callers must not
    /// treat this as a hard failure.
    #[error("video {uid} still processing after {waited_secs}s")]
    Timeout {
        /// Provider uid of the video being polled.
        uid: String,
        /// How long the caller waited before giving up.
        waited_secs: u64,
    },
}
