use super::registry::path_matches;
use super::{Authorizer, AuthzRequest, AuthzResponse};

/// Checks the path against the compacted permission claims.
///
/// Paths listed for the caller's role are allowed. Paths listed only for
/// other roles are denied. Paths that appear in no list are not controlled
/// by the matrix and are left to the rest of the chain.
pub struct CompactAuthorizer;

impl CompactAuthorizer {
    pub fn new() -> Self {
        Self
    }
}

impl Authorizer for CompactAuthorizer {
    fn authorize_request(&self, req: &AuthzRequest) -> AuthzResponse {
        let perms = match req.perms {
            Some(perms) => perms,
            None => return AuthzResponse::Ok,
        };

        if perms
            .paths_for(req.role)
            .iter()
            .any(|p| path_matches(req.path, p))
        {
            return AuthzResponse::Ok;
        }

        if perms.all_paths().any(|p| path_matches(req.path, p)) {
            return AuthzResponse::Unauthorized;
        }

        AuthzResponse::Continue
    }
}
