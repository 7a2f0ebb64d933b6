use std::sync::Arc;
use std::time::Duration;

use actix_web::middleware::from_fn;
use actix_web::web::{self, Bytes, Data};
use actix_web::{App, HttpRequest, HttpResponse, HttpServer};
use anyhow::{Context, Result};
use log::{info, warn};
use openssl::ssl::SslAcceptorBuilder;
use sd_notify::NotifyState;

use super::gate::middleware::{self, GateState};
use super::handlers::api::ApiHandler;
use super::handlers::auth::AuthHandler;
use super::handlers::healthz::HealthzHandler;
use super::handlers::page::PageHandler;
use super::handlers::Handler;
use super::response::Response;

pub struct RestfulServer {
    ssl: Option<SslAcceptorBuilder>,
    ctx: Arc<RestfulContext>,

    keep_alive_secs: Option<u64>,
    workers: Option<u64>,

    bind: String,
}

pub struct RestfulContext {
    pub gate: Arc<GateState>,

    pub api_handler: ApiHandler,
    pub auth_handler: AuthHandler,
    pub healthz_handler: HealthzHandler,
    pub page_handler: PageHandler,
}

impl RestfulServer {
    pub const API_PATH: &str = "/api";
    pub const AUTH_PATH: &str = "/api/auth";
    pub const HEALTHZ_PATH: &str = "/healthz";

    pub fn new(bind: String, ssl: Option<SslAcceptorBuilder>, ctx: Arc<RestfulContext>) -> Self {
        Self {
            ssl,
            ctx,
            keep_alive_secs: None,
            workers: None,
            bind,
        }
    }

    pub fn set_keep_alive_secs(&mut self, keep_alive_secs: u64) {
        self.keep_alive_secs = Some(keep_alive_secs);
    }

    pub fn set_workers(&mut self, workers: u64) {
        self.workers = Some(workers);
    }

    pub async fn run(mut self) -> Result<()> {
        let ctx = self.ctx.clone();
        let mut srv = HttpServer::new(move || {
            App::new()
                .configure(|cfg| Self::configure(cfg, ctx.clone()))
                .wrap(from_fn(middleware::gate))
        });

        if let Some(ssl) = self.ssl.take() {
            info!("Binding to https://{}", self.bind);
            srv = srv.bind_openssl(&self.bind, ssl).context("bind with ssl")?
        } else {
            warn!("Using HTTP (without SSL). Session cookies travel in clear text, DO NOT USE IN PRODUCTION");
            info!("Binding to http://{}", self.bind);
            srv = srv.bind(&self.bind).context("bind without ssl")?
        };

        if let Some(keep_alive) = self.keep_alive_secs {
            srv = srv.keep_alive(Duration::from_secs(keep_alive));
        }
        if let Some(workers) = self.workers {
            srv = srv.workers(workers as usize);
        }

        sd_notify::notify(true, &[NotifyState::Ready]).context("notify systemd")?;
        info!("Starting restful server");
        srv.run().await.context("run server")?;

        info!("Server stopped by user");
        Ok(())
    }

    /// Registers app data and routes. The gate middleware is wrapped by the
    /// caller.
    pub fn configure(cfg: &mut web::ServiceConfig, ctx: Arc<RestfulContext>) {
        cfg.app_data(Data::from(ctx.gate.clone()))
            .app_data(Data::new(ctx))
            .service(
                web::scope(Self::AUTH_PATH)
                    .route("/{path:.*}", web::post().to(Self::handle_auth)),
            )
            .service(
                web::scope(Self::API_PATH)
                    .route("/{path:.*}", web::get().to(Self::handle_api))
                    .route("/{path:.*}", web::put().to(Self::handle_api))
                    .route("/{path:.*}", web::delete().to(Self::handle_api)),
            )
            .service(web::resource(Self::HEALTHZ_PATH).route(web::get().to(Self::handle_healthz)))
            .default_service(web::route().to(Self::handle_page));
    }

    async fn handle_api(
        req: HttpRequest,
        body: Option<Bytes>,
        ctx: Data<Arc<RestfulContext>>,
    ) -> HttpResponse {
        let path = match Self::parse_path(Self::API_PATH, &req) {
            Some(path) => path,
            None => return Response::not_found().into(),
        };
        let body = Self::parse_body(body);

        ctx.api_handler.handle(&path, req, body).into()
    }

    async fn handle_auth(
        req: HttpRequest,
        body: Option<Bytes>,
        ctx: Data<Arc<RestfulContext>>,
    ) -> HttpResponse {
        let path = match Self::parse_path(Self::AUTH_PATH, &req) {
            Some(path) => path,
            None => return Response::not_found().into(),
        };
        let body = Self::parse_body(body);

        ctx.auth_handler.handle(&path, req, body).into()
    }

    async fn handle_healthz(req: HttpRequest, ctx: Data<Arc<RestfulContext>>) -> HttpResponse {
        ctx.healthz_handler.handle("", req, None).into()
    }

    async fn handle_page(req: HttpRequest, ctx: Data<Arc<RestfulContext>>) -> HttpResponse {
        let path = req.path().to_string();
        ctx.page_handler.handle(&path, req, None).into()
    }

    fn parse_path(route: &str, req: &HttpRequest) -> Option<String> {
        let path = req.uri().path().to_string();
        let path = path.strip_prefix(route)?;
        let path = path.trim_matches('/');
        if path.is_empty() {
            return None;
        }

        Some(String::from(path))
    }

    fn parse_body(body: Option<Bytes>) -> Option<Vec<u8>> {
        body.map(|b| b.to_vec())
    }
}
