use std::sync::Arc;

use anyhow::{Context, Result};
use openssl::ssl::{SslAcceptor, SslAcceptorBuilder, SslMethod};

use super::authn::directory::RoleDirectory;
use super::authn::factory::AuthnFactory;
use super::authz::factory::AuthzFactory;
use super::authz::registry::FeatureRegistry;
use super::authz::resolver::Resolver;
use super::authz::store::MatrixStore;
use super::config::ServerConfig;
use super::gate::middleware::GateState;
use super::gate::Gate;
use super::handlers::api::ApiHandler;
use super::handlers::auth::AuthHandler;
use super::handlers::healthz::HealthzHandler;
use super::handlers::page::PageHandler;
use super::restful::{RestfulContext, RestfulServer};
use super::session::factory::SessionFactory;
use super::session::SessionManager;

pub struct ServerFactory {
    cfg: ServerConfig,

    registry: Arc<FeatureRegistry>,
    store: Arc<MatrixStore>,
    sessions: Arc<SessionManager>,
}

impl ServerFactory {
    pub fn new(cfg: ServerConfig) -> Result<Self> {
        let registry = Arc::new(cfg.authz.build_registry().context("init feature registry")?);
        let store = MatrixStore::open(&cfg.authz.matrix_file, registry.clone())
            .context("init matrix store")?;

        let session_factory = SessionFactory::new(&cfg.session).context("init session")?;
        let sessions = session_factory
            .build_session_manager()
            .context("init session manager")?;

        Ok(Self {
            cfg,
            registry,
            store: Arc::new(store),
            sessions: Arc::new(sessions),
        })
    }

    pub fn build_server(&self) -> Result<RestfulServer> {
        let ssl = self.build_ssl()?;
        let ctx = self.build_context();

        let mut srv = RestfulServer::new(self.cfg.bind.clone(), ssl, ctx);
        if self.cfg.keep_alive_secs > 0 {
            srv.set_keep_alive_secs(self.cfg.keep_alive_secs);
        }
        if self.cfg.workers > 0 {
            srv.set_workers(self.cfg.workers);
        }

        Ok(srv)
    }

    pub fn build_ssl(&self) -> Result<Option<SslAcceptorBuilder>> {
        if !self.cfg.ssl {
            return Ok(None);
        }

        let mut builder =
            SslAcceptor::mozilla_intermediate(SslMethod::tls()).context("init ssl acceptor")?;

        builder
            .set_private_key_file(&self.cfg.key_path, openssl::ssl::SslFiletype::PEM)
            .context("load ssl key file")?;
        builder
            .set_certificate_chain_file(&self.cfg.cert_path)
            .context("load ssl cert file")?;

        Ok(Some(builder))
    }

    pub fn build_context(&self) -> Arc<RestfulContext> {
        let resolver = Arc::new(Resolver::new(self.registry.clone()));

        let authz_factory = AuthzFactory::new();
        let gate = Gate::new(
            &self.cfg.gate,
            self.registry.clone(),
            authz_factory.build_authorizer(self.registry.clone()),
        );
        let gate = Arc::new(GateState {
            gate,
            sessions: self.sessions.clone(),
        });

        let authn_factory = AuthnFactory::new();
        let authn = authn_factory.build_authenticator(&self.cfg.authn, self.sessions.clone());
        let api_handler = ApiHandler::new(
            authn,
            self.sessions.clone(),
            self.store.clone(),
            resolver.clone(),
        );

        let admin_password = if !self.cfg.authn.admin_password.is_empty() {
            Some(self.cfg.authn.admin_password.clone())
        } else {
            None
        };
        let auth_handler = AuthHandler::new(
            RoleDirectory::new(&self.cfg.authn),
            self.sessions.clone(),
            self.store.clone(),
            resolver,
            admin_password,
            self.cfg.authn.admin_allow_list.clone(),
        );

        let ctx = RestfulContext {
            gate,
            api_handler,
            auth_handler,
            healthz_handler: HealthzHandler::new(self.store.clone()),
            page_handler: PageHandler::new(self.registry.clone()),
        };
        Arc::new(ctx)
    }
}
