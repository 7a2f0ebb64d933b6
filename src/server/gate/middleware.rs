use std::sync::Arc;

use actix_web::body::MessageBody;
use actix_web::dev::{ServiceRequest, ServiceResponse};
use actix_web::middleware::Next;
use actix_web::web::Data;
use actix_web::{Error, HttpMessage, HttpResponse};
use log::error;

use crate::server::authz::registry::path_matches;
use crate::server::response::Response;
use crate::server::session::SessionManager;

use super::{Gate, GateDecision};

/// What the gate middleware needs from the application.
pub struct GateState {
    pub gate: Gate,
    pub sessions: Arc<SessionManager>,
}

/// Paths that are not page navigations. API routes authenticate through
/// their own chain.
const BYPASS_PREFIXES: [&str; 2] = ["/api", "/healthz"];

/// Runs the gate before any page handler. Allowed requests get the decoded
/// session identity in their extensions; everything else is answered with a
/// `302 Found`.
pub async fn gate(
    req: ServiceRequest,
    next: Next<impl MessageBody + 'static>,
) -> Result<ServiceResponse<impl MessageBody>, Error> {
    let path = req.path().to_string();
    if BYPASS_PREFIXES.iter().any(|p| path_matches(&path, p)) {
        return next.call(req).await.map(ServiceResponse::map_into_left_body);
    }

    let state = match req.app_data::<Data<GateState>>() {
        Some(state) => state.clone(),
        None => {
            error!("Gate state is not registered, refusing '{path}'");
            return Err(actix_web::error::ErrorInternalServerError(
                "gate is not configured",
            ));
        }
    };

    let identity = req
        .cookie(state.sessions.session_cookie())
        .and_then(|cookie| state.sessions.decode(cookie.value()));
    let perms = req
        .cookie(state.sessions.permissions_cookie())
        .and_then(|cookie| state.sessions.decode_permissions(cookie.value()));

    let location = match state.gate.decide(&path, identity.as_ref(), perms.as_ref()) {
        GateDecision::Allow => {
            if let Some(identity) = identity {
                req.extensions_mut().insert(identity);
            }
            return next.call(req).await.map(ServiceResponse::map_into_left_body);
        }
        GateDecision::RedirectLogin => state.gate.login_path(),
        GateDecision::RedirectLanding => state.gate.landing_path(),
    };

    let resp: HttpResponse = Response::found(location).into();
    Ok(req.into_response(resp).map_into_right_body())
}
