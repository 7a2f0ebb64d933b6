mod admin;
mod bearer_token;
mod cookie;
mod union;

pub mod chain;
pub mod config;
pub mod directory;
pub mod factory;

use std::collections::HashSet;

use actix_web::HttpRequest;

use crate::types::session::Identity;

/// Resolves the caller of an API request. `identity` carries what earlier
/// authenticators in the chain already found.
pub trait Authenticator: Send + Sync {
    fn authenticate_request(&self, req: &HttpRequest, identity: Option<&Identity>)
        -> AuthnResponse;
}

#[derive(Debug, Clone, PartialEq)]
pub enum AuthnResponse {
    /// The caller is known
    Ok(Identity),
    /// Nothing to say, ask the next authenticator
    Continue,
    /// Credentials were presented but rejected, stop the chain
    Unauthenticated,
}

/// Whether the peer address of `req` may act as admin. `*` allows any.
pub fn is_admin_client(allow_list: &HashSet<String>, req: &HttpRequest) -> bool {
    if allow_list.contains("*") {
        return true;
    }

    let conn_info = req.connection_info();
    match conn_info.peer_addr() {
        Some(addr) => allow_list.contains(addr),
        None => false,
    }
}
