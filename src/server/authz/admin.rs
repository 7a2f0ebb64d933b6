use super::{Authorizer, AuthzRequest, AuthzResponse};

pub struct AdminAuthorizer;

impl AdminAuthorizer {
    pub fn new() -> Self {
        Self
    }
}

impl Authorizer for AdminAuthorizer {
    fn authorize_request(&self, req: &AuthzRequest) -> AuthzResponse {
        if req.role.is_admin() {
            return AuthzResponse::Ok;
        }

        AuthzResponse::Continue
    }
}
