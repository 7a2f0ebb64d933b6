use actix_web::cookie::Cookie;
use actix_web::http::{header, StatusCode};
use actix_web::{HttpResponse, HttpResponseBuilder};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::types::response::{CommonResponse, ResourceResponse};

pub const TOKEN_ERROR: &str = "Generate session token failed";
pub const MATRIX_ERROR: &str = "Update permission matrix failed";

/// A wrapper struct for HTTP responses that provides convenient methods
/// for creating common response types
pub struct Response {
    http_response: HttpResponse,
}

impl Response {
    pub fn not_found() -> Self {
        Self::err_response(StatusCode::NOT_FOUND, "Resource not found".to_string())
    }

    pub fn bad_request(message: impl AsRef<str>) -> Self {
        let message = format!("Bad request: {}", message.as_ref());
        Self::err_response(StatusCode::BAD_REQUEST, message)
    }

    pub fn unauthenticated(message: impl AsRef<str>) -> Self {
        let message = format!("Unauthenticated: {}", message.as_ref());
        Self::err_response(StatusCode::UNAUTHORIZED, message)
    }

    pub fn unauthorized(message: &str) -> Self {
        let message = format!("Unauthorized: {message}");
        Self::err_response(StatusCode::FORBIDDEN, message)
    }

    pub fn method_not_allowed() -> Self {
        Self::err_response(
            StatusCode::METHOD_NOT_ALLOWED,
            "Method not allowed".to_string(),
        )
    }

    pub fn error(message: &str) -> Self {
        let message = format!("Server error: {message}");
        Self::err_response(StatusCode::INTERNAL_SERVER_ERROR, message)
    }

    pub fn ok() -> Self {
        let resp = CommonResponse {
            code: StatusCode::OK.into(),
            message: None,
        };
        Self {
            http_response: HttpResponse::Ok().json(resp),
        }
    }

    pub fn json<T: Serialize + DeserializeOwned>(data: T) -> Self {
        let resp = ResourceResponse::<T> {
            code: StatusCode::OK.into(),
            message: None,
            data: Some(data),
        };
        Self {
            http_response: HttpResponse::Ok().json(resp),
        }
    }

    pub fn found(location: &str) -> Self {
        Self {
            http_response: HttpResponse::Found()
                .insert_header((header::LOCATION, location))
                .finish(),
        }
    }

    /// Attaches `Set-Cookie` headers. Cookies that cannot be encoded into a
    /// header are dropped.
    pub fn with_cookies<I>(mut self, cookies: I) -> Self
    where
        I: IntoIterator<Item = Cookie<'static>>,
    {
        for cookie in cookies {
            if let Err(e) = self.http_response.add_cookie(&cookie) {
                log::error!("Add cookie '{}' to response failed: {e}", cookie.name());
            }
        }
        self
    }

    fn err_response(status: StatusCode, message: String) -> Self {
        let resp = CommonResponse {
            code: status.into(),
            message: Some(message),
        };
        Self {
            http_response: HttpResponseBuilder::new(status).json(resp),
        }
    }
}

impl From<Response> for HttpResponse {
    fn from(val: Response) -> Self {
        val.http_response
    }
}
