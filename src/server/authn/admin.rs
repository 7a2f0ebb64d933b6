use std::collections::HashSet;

use actix_web::HttpRequest;
use log::warn;

use crate::types::session::Identity;

use super::{is_admin_client, Authenticator, AuthnResponse};

/// Admin sessions are only honored from addresses in the allow list, the
/// same list that gates admin login.
pub struct AdminAuthenticator {
    allow_list: HashSet<String>,
}

impl AdminAuthenticator {
    pub fn new(allow_list: HashSet<String>) -> Self {
        Self { allow_list }
    }
}

impl Authenticator for AdminAuthenticator {
    fn authenticate_request(
        &self,
        req: &HttpRequest,
        identity: Option<&Identity>,
    ) -> AuthnResponse {
        let identity = match identity {
            Some(identity) if identity.role.is_admin() => identity,
            _ => return AuthnResponse::Continue,
        };

        if !is_admin_client(&self.allow_list, req) {
            warn!(
                "Admin session '{}' used from an address outside the allow list, rejected",
                identity.email
            );
            return AuthnResponse::Unauthenticated;
        }

        AuthnResponse::Continue
    }
}
