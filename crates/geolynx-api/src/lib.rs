//! ---
//! glx_section: "05-networking-external-interfaces"
//! glx_subsection: "module"
//! glx_type: "source"
//! glx_scope: "code"
//! glx_description: "Remote backend interface and transports."
//! glx_version: "v0.0.0-prealpha"
//! glx_owner: "tbd"
//! ---
//! Remote backend interface for the GeoLynx field core.
//!
//! The [`RemoteApi`] trait is the single seam between the core and the
//! backend. Production code uses [`HttpRemoteApi`]; tests and single-process
//! integration use [`MockRemoteApi`].

#![warn(missing_docs)]

pub mod http;
pub mod mock;
pub mod remote;

/// Shared result type for remote operations.
pub type Result<T> = std::result::Result<T, ApiError>;

/// Errors produced at the remote boundary.
///
/// Raw transport failures never cross this crate's seam; they are converted
/// here so callers only ever see this taxonomy.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ApiError {
    /// Transport-level failure (connect, timeout, TLS, malformed body).
    #[error("transport error: {0}")]
    Transport(String),
    /// Backend reached but the request was rejected; carries the backend's
    /// `message` field when present.
    #[error("backend rejected request: {0}")]
    Backend(String),
    /// The configured base URL could not be parsed.
    #[error("invalid base url: {0}")]
    InvalidBaseUrl(String),
}

pub use http::HttpRemoteApi;
pub use mock::{GateHandle, MockRemoteApi};
pub use remote::RemoteApi;
