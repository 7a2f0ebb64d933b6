use std::sync::Arc;

use super::registry::FeatureRegistry;
use super::{Authorizer, AuthzRequest, AuthzResponse};

/// Denies admin-exclusive paths. Must run after [`super::admin::AdminAuthorizer`].
pub struct ExclusiveAuthorizer {
    registry: Arc<FeatureRegistry>,
}

impl ExclusiveAuthorizer {
    pub fn new(registry: Arc<FeatureRegistry>) -> Self {
        Self { registry }
    }
}

impl Authorizer for ExclusiveAuthorizer {
    fn authorize_request(&self, req: &AuthzRequest) -> AuthzResponse {
        if self.registry.is_admin_path(req.path) {
            return AuthzResponse::Unauthorized;
        }

        AuthzResponse::Continue
    }
}
