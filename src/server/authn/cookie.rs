use std::sync::Arc;

use actix_web::HttpRequest;

use crate::server::session::SessionManager;
use crate::types::session::Identity;

use super::{Authenticator, AuthnResponse};

/// Reads the session cookie the browser sends with every request.
pub struct CookieAuthenticator {
    sessions: Arc<SessionManager>,
}

impl CookieAuthenticator {
    pub fn new(sessions: Arc<SessionManager>) -> Self {
        Self { sessions }
    }
}

impl Authenticator for CookieAuthenticator {
    fn authenticate_request(
        &self,
        req: &HttpRequest,
        identity: Option<&Identity>,
    ) -> AuthnResponse {
        if identity.is_some() {
            return AuthnResponse::Continue;
        }

        let cookie = match req.cookie(self.sessions.session_cookie()) {
            Some(cookie) => cookie,
            None => return AuthnResponse::Continue,
        };

        // A broken cookie means "not logged in"; a bearer token may still
        // follow.
        match self.sessions.decode(cookie.value()) {
            Some(identity) => AuthnResponse::Ok(identity),
            None => AuthnResponse::Continue,
        }
    }
}
