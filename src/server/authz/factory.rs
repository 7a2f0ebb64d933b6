use std::sync::Arc;

use super::admin::AdminAuthorizer;
use super::chain::ChainAuthorizer;
use super::compact::CompactAuthorizer;
use super::exclusive::ExclusiveAuthorizer;
use super::registry::FeatureRegistry;
use super::union::UnionAuthorizer;

pub struct AuthzFactory;

impl AuthzFactory {
    pub fn new() -> Self {
        Self
    }

    pub fn build_authorizer(&self, registry: Arc<FeatureRegistry>) -> ChainAuthorizer {
        let authorizers = vec![
            UnionAuthorizer::Admin(AdminAuthorizer::new()),
            UnionAuthorizer::Exclusive(ExclusiveAuthorizer::new(registry)),
            UnionAuthorizer::Compact(CompactAuthorizer::new()),
        ];

        ChainAuthorizer::new(authorizers)
    }
}
