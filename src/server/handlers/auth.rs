use std::collections::HashSet;
use std::sync::Arc;

use actix_web::cookie::Cookie;
use actix_web::http::Method;
use actix_web::HttpRequest;
use log::{error, info, warn};

use crate::server::authn::directory::RoleDirectory;
use crate::server::authn::is_admin_client;
use crate::server::authz::resolver::{MatrixState, Resolver};
use crate::server::authz::store::MatrixStore;
use crate::server::response::{self, Response};
use crate::server::session::{cookie, CodecError, SessionManager};
use crate::types::role::Role;
use crate::types::session::{LoginRequest, TokenResponse};

use super::Handler;

/// Builds the permissions cookie for the current matrix. With no matrix
/// configured the cookie is removed, so stale claims do not outlive a clear.
pub fn permissions_cookie(
    sessions: &SessionManager,
    resolver: &Resolver,
    state: &MatrixState,
) -> Result<Cookie<'static>, CodecError> {
    match state {
        MatrixState::Unconfigured => Ok(cookie::removal_cookie(sessions.permissions_cookie())),
        MatrixState::Configured(matrix) => {
            let compact = resolver.compact(matrix);
            let token = sessions.encode_permissions(&compact)?;
            Ok(sessions.build_permissions_cookie(token))
        }
    }
}

pub struct AuthHandler {
    directory: RoleDirectory,
    sessions: Arc<SessionManager>,
    store: Arc<MatrixStore>,
    resolver: Arc<Resolver>,

    admin_password: Option<String>,
    admin_allow_list: HashSet<String>,
}

impl AuthHandler {
    pub fn new(
        directory: RoleDirectory,
        sessions: Arc<SessionManager>,
        store: Arc<MatrixStore>,
        resolver: Arc<Resolver>,
        admin_password: Option<String>,
        admin_allow_list: HashSet<String>,
    ) -> Self {
        Self {
            directory,
            sessions,
            store,
            resolver,
            admin_password,
            admin_allow_list,
        }
    }

    fn handle_login(&self, req: &HttpRequest, body: Option<Vec<u8>>) -> Response {
        let body = match body {
            Some(body) if !body.is_empty() => body,
            _ => return Response::bad_request("Login request is required"),
        };
        let login: LoginRequest = match serde_json::from_slice(&body) {
            Ok(login) => login,
            Err(_) => return Response::bad_request("Invalid login json"),
        };

        let email = RoleDirectory::normalize(&login.email);
        if email.is_empty() || !email.contains('@') {
            return Response::bad_request("Email is required");
        }

        let role = self.directory.infer(&email);
        if role == Role::Admin {
            if let Some(resp) = self.check_admin(req, login.password.as_deref()) {
                return resp;
            }
        }

        let token = match self.sessions.encode(&email, role) {
            Ok(token) => token,
            Err(e) => {
                error!("Failed to generate session token for '{email}': {e}");
                return Response::error(response::TOKEN_ERROR);
            }
        };
        let perms_cookie =
            match permissions_cookie(&self.sessions, &self.resolver, &self.store.state()) {
                Ok(cookie) => cookie,
                Err(e) => {
                    error!("Failed to generate permissions token: {e}");
                    return Response::error(response::TOKEN_ERROR);
                }
            };

        info!("Login '{email}' as {role}");
        let session_cookie = self.sessions.build_session_cookie(token.clone());
        Response::json(TokenResponse {
            email,
            role,
            token,
            expire_in: self.sessions.validity_secs(),
        })
        .with_cookies([session_cookie, perms_cookie])
    }

    /// Returns a rejection if the admin login must not proceed.
    fn check_admin(&self, req: &HttpRequest, password: Option<&str>) -> Option<Response> {
        if self.admin_allow_list.is_empty() {
            return Some(Response::unauthenticated("Admin is disabled"));
        }
        let admin_password = match self.admin_password {
            Some(ref admin_password) => admin_password,
            None => return Some(Response::unauthenticated("Admin is disabled")),
        };
        if password != Some(admin_password.as_str()) {
            return Some(Response::unauthenticated("Invalid admin password"));
        }

        let client_ip = req
            .connection_info()
            .peer_addr()
            .map(|a| a.to_string())
            .unwrap_or_default();
        if !is_admin_client(&self.admin_allow_list, req) {
            warn!("Admin login request: password correct, but client IP '{client_ip}' is not allowed, the admin password may have leaked, please consider changing or disabling it");
            return Some(Response::unauthenticated("ClientIP blocked"));
        }

        info!("Admin login succeeded, from '{client_ip}'");
        None
    }
}

impl Handler for AuthHandler {
    fn handle(&self, path: &str, req: HttpRequest, body: Option<Vec<u8>>) -> Response {
        if req.method() != Method::POST {
            return Response::method_not_allowed();
        }

        match path {
            "login" => self.handle_login(&req, body),
            "logout" => Response::ok().with_cookies(self.sessions.removal_cookies()),
            _ => Response::not_found(),
        }
    }
}
