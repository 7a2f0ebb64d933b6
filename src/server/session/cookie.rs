use actix_web::cookie::time::Duration;
use actix_web::cookie::{Cookie, SameSite};

/// Builds a cookie readable on every path that expires `max_age_secs` after
/// it was issued, regardless of activity.
pub fn build_cookie(name: &str, value: String, max_age_secs: u64, secure: bool) -> Cookie<'static> {
    Cookie::build(name.to_string(), value)
        .path("/")
        .max_age(Duration::seconds(max_age_secs as i64))
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(secure)
        .finish()
}

pub fn removal_cookie(name: &str) -> Cookie<'static> {
    Cookie::build(name.to_string(), String::new())
        .path("/")
        .max_age(Duration::ZERO)
        .http_only(true)
        .same_site(SameSite::Lax)
        .finish()
}
