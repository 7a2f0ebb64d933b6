use std::sync::Arc;

use actix_web::http::header;
use actix_web::HttpRequest;

use crate::server::session::SessionManager;
use crate::types::session::Identity;

use super::{Authenticator, AuthnResponse};

/// Accepts the session token in an `Authorization: Bearer` header, for
/// clients that cannot keep cookies.
pub struct BearerTokenAuthenticator {
    sessions: Arc<SessionManager>,
}

impl BearerTokenAuthenticator {
    pub fn new(sessions: Arc<SessionManager>) -> Self {
        Self { sessions }
    }
}

impl Authenticator for BearerTokenAuthenticator {
    fn authenticate_request(
        &self,
        req: &HttpRequest,
        identity: Option<&Identity>,
    ) -> AuthnResponse {
        if identity.is_some() {
            return AuthnResponse::Continue;
        }

        let auth = match req.headers().get(header::AUTHORIZATION) {
            Some(auth) => match auth.to_str() {
                Ok(auth) => auth.trim(),
                Err(_) => return AuthnResponse::Continue,
            },
            None => return AuthnResponse::Continue,
        };

        if auth.is_empty() {
            return AuthnResponse::Continue;
        }

        let mut iter = auth.split_whitespace();
        match iter.next() {
            Some(scheme) if scheme.eq_ignore_ascii_case("bearer") => {}
            _ => return AuthnResponse::Unauthenticated,
        }

        let token = match iter.next() {
            Some(token) => token,
            None => return AuthnResponse::Unauthenticated,
        };

        match self.sessions.decode(token) {
            Some(identity) => AuthnResponse::Ok(identity),
            None => AuthnResponse::Unauthenticated,
        }
    }
}
