use std::sync::Arc;

use log::warn;

use crate::server::session::SessionManager;

use super::admin::AdminAuthenticator;
use super::bearer_token::BearerTokenAuthenticator;
use super::chain::ChainAuthenticator;
use super::config::AuthnConfig;
use super::cookie::CookieAuthenticator;
use super::union::UnionAuthenticator;

/// Builds the API authentication chain: session cookie, then bearer token,
/// then the admin address check.
pub struct AuthnFactory;

impl AuthnFactory {
    pub fn new() -> Self {
        Self
    }

    pub fn build_authenticator(
        &self,
        cfg: &AuthnConfig,
        sessions: Arc<SessionManager>,
    ) -> ChainAuthenticator {
        let mut authenticators = vec![
            UnionAuthenticator::Cookie(CookieAuthenticator::new(sessions.clone())),
            UnionAuthenticator::BearerToken(BearerTokenAuthenticator::new(sessions)),
        ];

        if cfg.admin_password == "admin" {
            warn!("Using default admin password IS DANGEROUS, please change it in production");
        }
        if cfg.admin_allow_list.contains("*") {
            warn!("Allow every IP to act as admin (with '*' in admin_allow_list), this is dangerous");
        }
        if cfg.admin_password.is_empty() || cfg.admin_allow_list.is_empty() {
            warn!("Admin login disabled");
        }

        authenticators.push(UnionAuthenticator::Admin(AdminAuthenticator::new(
            cfg.admin_allow_list.clone(),
        )));

        ChainAuthenticator::new(authenticators)
    }
}

#[cfg(test)]
mod tests {
    use crate::config::CommonConfig;

    use super::*;

    #[test]
    fn test_factory() {
        let factory = AuthnFactory::new();
        let sessions = Arc::new(SessionManager::new_test());

        let chain = factory.build_authenticator(&AuthnConfig::default(), sessions.clone());
        assert_eq!(chain.len(), 3);

        let mut cfg = AuthnConfig::default();
        cfg.admin_password = String::new();
        let chain = factory.build_authenticator(&cfg, sessions);
        assert_eq!(chain.len(), 3);
    }
}
