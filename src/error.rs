//! Error types for the `CallTrack` client library.

/// Convenience alias for results produced by this crate.
pub type Result<T> = core::result::Result<T, CallTrackError>;

/// All errors that can occur when using the `CallTrack` client.
#[derive(Debug, thiserror::Error)]
pub enum CallTrackError {
    /// Underlying HTTP transport failed.
    #[cfg(any(feature = "async", feature = "blocking"))]
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// The API returned a non-success status code.
    #[error("API error {status}: {message}")]
    Api {
        /// HTTP status code returned by the server.
        status: u16,
        /// Response body, if readable.
        message: String,
    },

    /// JSON serialization or deserialization failed.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// CSV writing failed.
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    /// Writing the export artifact to disk failed.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Export was requested for an empty filtered set; no file is produced.
    #[error("nothing to export: the filtered set is empty")]
    EmptyExport,

    /// No access token was provided to the client builder.
    #[error("access token is required but was not provided")]
    MissingToken,

    /// A payments fetch was attempted without a configured client id.
    #[error("client id is required for payment reports but was not provided")]
    MissingClientId,
}
