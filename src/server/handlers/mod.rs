pub mod api;
pub mod auth;
pub mod healthz;
pub mod page;

use actix_web::HttpRequest;

use super::response::Response;

pub trait Handler {
    fn handle(&self, path: &str, req: HttpRequest, body: Option<Vec<u8>>) -> Response;
}
