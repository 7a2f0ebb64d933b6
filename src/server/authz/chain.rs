use super::union::UnionAuthorizer;
use super::{Authorizer, AuthzRequest, AuthzResponse};

pub struct ChainAuthorizer {
    authorizers: Vec<UnionAuthorizer>,
}

impl ChainAuthorizer {
    pub fn new(authorizers: Vec<UnionAuthorizer>) -> Self {
        Self { authorizers }
    }

    /// Runs the chain; a path no authorizer claims is uncontrolled and allowed.
    pub fn can_access(&self, req: &AuthzRequest) -> bool {
        !matches!(self.authorize_request(req), AuthzResponse::Unauthorized)
    }
}

impl Authorizer for ChainAuthorizer {
    fn authorize_request(&self, req: &AuthzRequest) -> AuthzResponse {
        for authorizer in self.authorizers.iter() {
            match authorizer.authorize_request(req) {
                AuthzResponse::Ok => return AuthzResponse::Ok,
                AuthzResponse::Continue => continue,
                AuthzResponse::Unauthorized => return AuthzResponse::Unauthorized,
            }
        }

        AuthzResponse::Continue
    }
}
