use serde::{Deserialize, Serialize};

/// Health check information returned by the server
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthzResponse {
    /// Current server time
    pub now: u64,

    pub time_zone: String,

    /// Client IP address obtained by the server, admin access is checked
    /// against it
    pub client_ip: Option<String>,

    pub version: Option<String>,

    /// Whether an admin has configured the permission matrix
    pub matrix_configured: bool,
}
