use std::sync::Arc;

use actix_web::http::Method;
use actix_web::{HttpMessage, HttpRequest};

use crate::server::authz::registry::FeatureRegistry;
use crate::server::response::Response;
use crate::types::permission::PageResponse;
use crate::types::session::Identity;

use super::Handler;

/// Serves navigations the gate let through. Rendering lives elsewhere; this
/// only describes which feature the page belongs to and who is viewing it.
pub struct PageHandler {
    registry: Arc<FeatureRegistry>,
}

impl PageHandler {
    pub fn new(registry: Arc<FeatureRegistry>) -> Self {
        Self { registry }
    }
}

impl Handler for PageHandler {
    fn handle(&self, path: &str, req: HttpRequest, _body: Option<Vec<u8>>) -> Response {
        if req.method() != Method::GET && req.method() != Method::HEAD {
            return Response::method_not_allowed();
        }

        let role = req.extensions().get::<Identity>().map(|identity| identity.role);
        let feature = self.registry.resolve(path).map(|f| f.id.clone());

        Response::json(PageResponse {
            path: path.to_string(),
            feature,
            role,
        })
    }
}
