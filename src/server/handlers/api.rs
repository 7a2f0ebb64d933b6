use std::sync::Arc;

use actix_web::http::Method;
use actix_web::web::Query;
use actix_web::HttpRequest;
use log::{error, info};
use serde::Deserialize;

use crate::server::authn::chain::ChainAuthenticator;
use crate::server::authn::{Authenticator, AuthnResponse};
use crate::server::authz::resolver::{MatrixState, Resolver};
use crate::server::authz::store::MatrixStore;
use crate::server::response::{self, Response};
use crate::server::session::SessionManager;
use crate::types::permission::{CaniResponse, FeatureRoute, MatrixResponse, PermissionMatrix};
use crate::types::session::{Identity, WhoamiResponse};

use super::auth::permissions_cookie;
use super::Handler;

#[derive(Debug, Deserialize)]
struct CaniQuery {
    path: String,
}

pub struct ApiHandler {
    authn: ChainAuthenticator,
    sessions: Arc<SessionManager>,
    store: Arc<MatrixStore>,
    resolver: Arc<Resolver>,
}

impl ApiHandler {
    pub fn new(
        authn: ChainAuthenticator,
        sessions: Arc<SessionManager>,
        store: Arc<MatrixStore>,
        resolver: Arc<Resolver>,
    ) -> Self {
        Self {
            authn,
            sessions,
            store,
            resolver,
        }
    }

    fn handle_whoami(&self, identity: Identity) -> Response {
        Response::json(WhoamiResponse {
            label: identity.role.label().to_string(),
            email: identity.email,
            role: identity.role,
        })
    }

    fn handle_cani(&self, req: &HttpRequest, identity: Identity) -> Response {
        let query = match Query::<CaniQuery>::from_query(req.query_string()) {
            Ok(query) => query.into_inner(),
            Err(_) => return Response::bad_request("Query parameter 'path' is required"),
        };
        if !query.path.starts_with('/') {
            return Response::bad_request("Path must start with '/'");
        }

        let state = self.store.state();
        let allow = self
            .resolver
            .is_path_allowed(identity.role, &query.path, &state);
        let feature = self
            .resolver
            .registry()
            .resolve(&query.path)
            .map(|f| f.id.clone());

        Response::json(CaniResponse {
            path: query.path,
            allow,
            feature,
        })
    }

    fn handle_nav(&self, identity: Identity) -> Response {
        let state = self.store.state();
        Response::json(self.resolver.nav_items(identity.role, &state))
    }

    fn handle_features(&self) -> Response {
        let features: Vec<FeatureRoute> = self.resolver.registry().features().to_vec();
        Response::json(features)
    }

    fn handle_permissions(
        &self,
        req: &HttpRequest,
        identity: Identity,
        body: Option<Vec<u8>>,
    ) -> Response {
        if !identity.role.is_admin() {
            return Response::unauthorized("Only admin can manage permissions");
        }

        let method = req.method();
        if method == Method::GET {
            self.get_matrix()
        } else if method == Method::PUT {
            self.put_matrix(&identity, body)
        } else if method == Method::DELETE {
            self.delete_matrix(&identity)
        } else {
            Response::method_not_allowed()
        }
    }

    fn get_matrix(&self) -> Response {
        let state = self.store.state();
        let resp = match state.as_ref() {
            MatrixState::Unconfigured => MatrixResponse {
                configured: false,
                matrix: PermissionMatrix::default(),
                compact: None,
            },
            MatrixState::Configured(matrix) => MatrixResponse {
                configured: true,
                compact: Some(self.resolver.compact(matrix)),
                matrix: matrix.clone(),
            },
        };
        Response::json(resp)
    }

    fn put_matrix(&self, identity: &Identity, body: Option<Vec<u8>>) -> Response {
        let body = match body {
            Some(body) if !body.is_empty() => body,
            _ => return Response::bad_request("Matrix is required"),
        };
        let matrix: PermissionMatrix = match serde_json::from_slice(&body) {
            Ok(matrix) => matrix,
            Err(_) => return Response::bad_request("Invalid matrix json"),
        };
        if let Err(e) = self.resolver.registry().validate_matrix(&matrix) {
            return Response::bad_request(format!("Invalid matrix: {e}"));
        }

        let state = match self.store.replace(matrix) {
            Ok(state) => state,
            Err(e) => {
                error!("Replace permission matrix failed: {e:#}");
                return Response::error(response::MATRIX_ERROR);
            }
        };
        info!("Permission matrix updated by '{}'", identity.email);

        match permissions_cookie(&self.sessions, &self.resolver, &state) {
            Ok(cookie) => Response::ok().with_cookies([cookie]),
            Err(e) => {
                error!("Failed to generate permissions token: {e}");
                Response::error(response::TOKEN_ERROR)
            }
        }
    }

    fn delete_matrix(&self, identity: &Identity) -> Response {
        if let Err(e) = self.store.clear() {
            error!("Clear permission matrix failed: {e:#}");
            return Response::error(response::MATRIX_ERROR);
        }
        info!("Permission matrix cleared by '{}'", identity.email);

        match permissions_cookie(&self.sessions, &self.resolver, &MatrixState::Unconfigured) {
            Ok(cookie) => Response::ok().with_cookies([cookie]),
            Err(e) => {
                error!("Failed to generate permissions token: {e}");
                Response::error(response::TOKEN_ERROR)
            }
        }
    }
}

impl Handler for ApiHandler {
    fn handle(&self, path: &str, req: HttpRequest, body: Option<Vec<u8>>) -> Response {
        let identity = match self.authn.authenticate_request(&req, None) {
            AuthnResponse::Ok(identity) => identity,
            _ => return Response::unauthenticated("Login required"),
        };

        let path = path.trim_end_matches('/');
        if path != "permissions" && req.method() != Method::GET {
            return Response::method_not_allowed();
        }

        match path {
            "whoami" => self.handle_whoami(identity),
            "cani" => self.handle_cani(&req, identity),
            "nav" => self.handle_nav(identity),
            "features" => self.handle_features(),
            "permissions" => self.handle_permissions(&req, identity, body),
            _ => Response::not_found(),
        }
    }
}
