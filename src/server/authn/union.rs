use actix_web::HttpRequest;

use crate::types::session::Identity;

use super::admin::AdminAuthenticator;
use super::bearer_token::BearerTokenAuthenticator;
use super::cookie::CookieAuthenticator;
use super::{Authenticator, AuthnResponse};

pub enum UnionAuthenticator {
    Cookie(CookieAuthenticator),
    BearerToken(BearerTokenAuthenticator),
    Admin(AdminAuthenticator),
}

impl Authenticator for UnionAuthenticator {
    fn authenticate_request(
        &self,
        req: &HttpRequest,
        identity: Option<&Identity>,
    ) -> AuthnResponse {
        match self {
            UnionAuthenticator::Cookie(auth) => auth.authenticate_request(req, identity),
            UnionAuthenticator::BearerToken(auth) => auth.authenticate_request(req, identity),
            UnionAuthenticator::Admin(auth) => auth.authenticate_request(req, identity),
        }
    }
}
