use serde::Serialize;
use utoipa::ToSchema;

/// Whether the service can currently reach its storage backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    /// A storage backend is installed and answering.
    Ok,
    /// No usable storage backend; catalog calls fail with 503.
    Degraded,
}

/// Health response returned by the `/healthcheck` route.
#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    /// Overall status.
    pub status: HealthStatus,
    /// Configured storage backend (`firebase`, `mongo` or `memory`).
    pub storage: &'static str,
}

impl HealthResponse {
    /// Build the payload from the degraded flag and the backend name.
    pub fn new(degraded: bool, storage: &'static str) -> Self {
        let status = if degraded {
            HealthStatus::Degraded
        } else {
            HealthStatus::Ok
        };
        Self { status, storage }
    }
}
