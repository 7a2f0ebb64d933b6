use super::admin::AdminAuthorizer;
use super::compact::CompactAuthorizer;
use super::exclusive::ExclusiveAuthorizer;
use super::{Authorizer, AuthzRequest, AuthzResponse};

pub enum UnionAuthorizer {
    Admin(AdminAuthorizer),
    Exclusive(ExclusiveAuthorizer),
    Compact(CompactAuthorizer),
}

impl Authorizer for UnionAuthorizer {
    fn authorize_request(&self, req: &AuthzRequest) -> AuthzResponse {
        match self {
            UnionAuthorizer::Admin(a) => a.authorize_request(req),
            UnionAuthorizer::Exclusive(e) => e.authorize_request(req),
            UnionAuthorizer::Compact(c) => c.authorize_request(req),
        }
    }
}
