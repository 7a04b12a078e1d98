//! Error types shared by the Firebase Realtime Database storage implementation.

use reqwest::StatusCode;
use thiserror::Error;

/// Convenient result alias returning [`FirebaseDaoError`] failures.
pub type FirebaseResult<T> = Result<T, FirebaseDaoError>;

/// Failures that can occur while interacting with the Realtime Database REST API.
#[derive(Debug, Error)]
pub enum FirebaseDaoError {
    /// Required environment variable is missing.
    #[error("missing Firebase environment variable `{var}`")]
    MissingEnvVar {
        /// Variable name.
        var: &'static str,
    },
    /// Building the HTTP client failed (invalid TLS setup, etc).
    #[error("failed to build Firebase client")]
    ClientBuilder {
        #[source]
        source: reqwest::Error,
    },
    /// A request could not be sent.
    #[error("failed to send Firebase request to `{path}`")]
    RequestSend {
        path: String,
        #[source]
        source: reqwest::Error,
    },
    /// Firebase answered with an unexpected status code.
    #[error("unexpected Firebase response status {status} for `{path}`")]
    RequestStatus {
        /// Node path.
        path: String,
        /// Status returned by Firebase.
        status: StatusCode,
    },
    /// Response payload could not be parsed into JSON.
    #[error("failed to decode Firebase response for `{path}`")]
    DecodeResponse {
        path: String,
        #[source]
        source: reqwest::Error,
    },
    /// Decoding a JSON value into the expected model failed.
    #[error("failed to deserialize Firebase value for `{path}`")]
    DeserializeValue {
        path: String,
        #[source]
        source: serde_json::Error,
    },
    /// A conditional read came back without the ETag header.
    #[error("Firebase response for `{path}` carried no ETag")]
    MissingEtag {
        /// Node path.
        path: String,
    },
    /// Every conditional write lost against a concurrent writer.
    #[error("Firebase transaction on `{path}` gave up after {attempts} attempts")]
    TransactionConflict {
        /// Node path.
        path: String,
        /// Conditional writes tried.
        attempts: u32,
    },
}
