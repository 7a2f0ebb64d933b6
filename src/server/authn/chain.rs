use actix_web::HttpRequest;

use crate::types::session::Identity;

use super::union::UnionAuthenticator;
use super::{Authenticator, AuthnResponse};

pub struct ChainAuthenticator {
    authenticators: Vec<UnionAuthenticator>,
}

impl ChainAuthenticator {
    pub fn new(authenticators: Vec<UnionAuthenticator>) -> Self {
        Self { authenticators }
    }

    pub fn len(&self) -> usize {
        self.authenticators.len()
    }

    pub fn is_empty(&self) -> bool {
        self.authenticators.is_empty()
    }
}

impl Authenticator for ChainAuthenticator {
    fn authenticate_request(
        &self,
        req: &HttpRequest,
        identity: Option<&Identity>,
    ) -> AuthnResponse {
        let mut current = identity.cloned();
        for authenticator in self.authenticators.iter() {
            match authenticator.authenticate_request(req, current.as_ref()) {
                AuthnResponse::Ok(identity) => current = Some(identity),
                AuthnResponse::Continue => continue,
                AuthnResponse::Unauthenticated => return AuthnResponse::Unauthenticated,
            }
        }
        match current {
            Some(identity) => AuthnResponse::Ok(identity),
            None => AuthnResponse::Continue,
        }
    }
}
