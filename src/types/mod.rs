pub mod healthz;
pub mod permission;
pub mod response;
pub mod role;
pub mod session;
