mod admin;
mod compact;
mod exclusive;
mod union;

pub mod chain;
pub mod config;
pub mod factory;
pub mod registry;
pub mod resolver;
pub mod store;

use crate::types::permission::CompactPermissions;
use crate::types::role::Role;

/// Decides whether a logged-in role may open a path, using only what the
/// request carries: the role and the compacted permission claims.
pub trait Authorizer: Send + Sync {
    fn authorize_request(&self, req: &AuthzRequest) -> AuthzResponse;
}

#[derive(Debug, Clone, Copy)]
pub struct AuthzRequest<'a> {
    pub path: &'a str,
    pub role: Role,

    /// `None` when no matrix has been configured or the claims could not be
    /// read.
    pub perms: Option<&'a CompactPermissions>,
}

/// Possible responses from an authorization check.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum AuthzResponse {
    /// Access is granted
    Ok,
    /// Defers decision to next authorizer in chain
    Continue,
    /// Access is denied
    Unauthorized,
}
