pub mod config;
pub mod middleware;

use std::sync::Arc;

use log::info;

use crate::server::authz::chain::ChainAuthorizer;
use crate::server::authz::registry::{path_matches, FeatureRegistry};
use crate::server::authz::AuthzRequest;
use crate::types::permission::CompactPermissions;
use crate::types::role::Role;
use crate::types::session::Identity;

use self::config::GateConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateDecision {
    Allow,
    RedirectLogin,
    RedirectLanding,
}

/// The enforcement point every navigation passes before a page is served.
///
/// Decisions depend only on the path and on what the request's cookies
/// carry. A missing or unreadable session means "not logged in"; missing or
/// unreadable permission claims mean "no matrix configured".
pub struct Gate {
    login_path: String,
    landing_path: String,
    public_paths: Vec<String>,
    protected_prefixes: Vec<String>,

    registry: Arc<FeatureRegistry>,
    authorizer: ChainAuthorizer,
}

impl Gate {
    pub fn new(
        cfg: &GateConfig,
        registry: Arc<FeatureRegistry>,
        authorizer: ChainAuthorizer,
    ) -> Self {
        Self {
            login_path: cfg.login_path.clone(),
            landing_path: cfg.landing_path.clone(),
            public_paths: cfg.public_paths.clone(),
            protected_prefixes: cfg.protected_prefixes.clone(),
            registry,
            authorizer,
        }
    }

    pub fn login_path(&self) -> &str {
        &self.login_path
    }

    pub fn landing_path(&self) -> &str {
        &self.landing_path
    }

    pub fn decide(
        &self,
        path: &str,
        identity: Option<&Identity>,
        perms: Option<&CompactPermissions>,
    ) -> GateDecision {
        let identity = match identity {
            Some(identity) => identity,
            None => {
                if self.is_protected(path) {
                    return GateDecision::RedirectLogin;
                }
                return GateDecision::Allow;
            }
        };

        if path_matches(path, &self.login_path) {
            return GateDecision::RedirectLanding;
        }

        if self.can_access(identity.role, path, perms) {
            return GateDecision::Allow;
        }

        // Sending a denied landing page back to itself would loop.
        if path_matches(path, &self.landing_path) {
            info!(
                "Role '{}' is not granted the landing path, serve it anyway",
                identity.role
            );
            return GateDecision::Allow;
        }

        info!(
            "Deny '{}' ({}) access to '{path}'",
            identity.email, identity.role
        );
        GateDecision::RedirectLanding
    }

    pub fn can_access(&self, role: Role, path: &str, perms: Option<&CompactPermissions>) -> bool {
        self.authorizer.can_access(&AuthzRequest { path, role, perms })
    }

    fn is_public(&self, path: &str) -> bool {
        self.public_paths.iter().any(|p| path_matches(path, p))
    }

    /// Every registered feature and admin path needs a session, on top of
    /// the configured prefixes.
    fn is_protected(&self, path: &str) -> bool {
        if self.is_public(path) {
            return false;
        }
        path == "/"
            || self.protected_prefixes.iter().any(|p| path_matches(path, p))
            || self.registry.resolve(path).is_some()
            || self.registry.is_admin_path(path)
    }

    #[cfg(test)]
    pub fn new_test() -> Self {
        use crate::config::CommonConfig;
        use crate::server::authz::factory::AuthzFactory;

        let registry = Arc::new(FeatureRegistry::new_test());
        let authorizer = AuthzFactory::new().build_authorizer(registry.clone());
        Self::new(&GateConfig::default(), registry, authorizer)
    }
}
