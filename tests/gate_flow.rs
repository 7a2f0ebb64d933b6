use std::fs;
use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;

use actix_web::cookie::Cookie;
use actix_web::dev::ServiceResponse;
use actix_web::http::{header, StatusCode};
use actix_web::middleware::from_fn;
use actix_web::{test, App};
use petalgate::config::{CommonConfig, PathSet};
use petalgate::server::config::ServerConfig;
use petalgate::server::factory::ServerFactory;
use petalgate::server::gate::middleware;
use petalgate::server::restful::{RestfulContext, RestfulServer};
use serde_json::{json, Value};

const SERVER_TOML: &str = r#"
[session]
secret = "gate-flow-secret-0123456789abcdef"

[authn]
admin_allow_list = ["127.0.0.1"]
"#;

fn build_context(dir: &Path) -> Arc<RestfulContext> {
    let config_path = dir.join("config");
    fs::create_dir_all(&config_path).unwrap();
    fs::write(config_path.join("server.toml"), SERVER_TOML).unwrap();

    let ps = PathSet::new(Some(config_path), Some(dir.join("data"))).unwrap();
    let cfg: ServerConfig = ps.load_config("server", ServerConfig::default).unwrap();
    assert!(cfg.authz.matrix_file.ends_with("permissions.json"));

    let factory = ServerFactory::new(cfg).unwrap();
    factory.build_context()
}

fn cookie_value<B>(resp: &ServiceResponse<B>, name: &str) -> Option<String> {
    resp.response()
        .cookies()
        .find(|c| c.name() == name)
        .map(|c| c.value().to_string())
}

fn location<B>(resp: &ServiceResponse<B>) -> String {
    resp.headers()
        .get(header::LOCATION)
        .and_then(|h| h.to_str().ok())
        .unwrap_or_default()
        .to_string()
}

fn local_addr() -> SocketAddr {
    "127.0.0.1:40123".parse().unwrap()
}

#[actix_web::test]
async fn test_gate_flow() {
    let dir = tempfile::tempdir().unwrap();
    let ctx = build_context(dir.path());

    let app = test::init_service(
        App::new()
            .configure(|cfg| RestfulServer::configure(cfg, ctx.clone()))
            .wrap(from_fn(middleware::gate)),
    )
    .await;

    // Anonymous visitors are sent to the login page.
    let req = test::TestRequest::get().uri("/invoice/2024").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FOUND);
    assert_eq!(location(&resp), "/login");

    for uri in ["/analytics", "/transfer-entry", "/system-settings"] {
        let req = test::TestRequest::get().uri(uri).to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::FOUND, "{uri}");
        assert_eq!(location(&resp), "/login", "{uri}");
    }

    let req = test::TestRequest::get().uri("/healthz").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["data"]["matrix_configured"], json!(false));

    // Staff login. No matrix yet, so the permissions cookie is cleared.
    let req = test::TestRequest::post()
        .uri("/api/auth/login")
        .set_json(json!({"email": " Hana@8718.jp "}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let staff_token = cookie_value(&resp, "8718_auth").unwrap();
    assert_eq!(cookie_value(&resp, "8718_perms").as_deref(), Some(""));
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["data"]["email"], json!("hana@8718.jp"));
    assert_eq!(body["data"]["role"], json!("staff"));

    let req = test::TestRequest::get()
        .uri("/invoice/2024")
        .cookie(Cookie::new("8718_auth", staff_token.clone()))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["data"]["feature"], json!("invoice"));
    assert_eq!(body["data"]["role"], json!("staff"));

    let req = test::TestRequest::get()
        .uri("/login")
        .cookie(Cookie::new("8718_auth", staff_token.clone()))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FOUND);
    assert_eq!(location(&resp), "/dashboard");

    // Admin paths stay closed to everyone but admin.
    let req = test::TestRequest::get()
        .uri("/settings")
        .cookie(Cookie::new("8718_auth", staff_token.clone()))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FOUND);
    assert_eq!(location(&resp), "/dashboard");

    // Admin login needs the password and an allowed client.
    let req = test::TestRequest::post()
        .uri("/api/auth/login")
        .peer_addr(local_addr())
        .set_json(json!({"email": "admin@8718.jp", "password": "wrong"}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    let req = test::TestRequest::post()
        .uri("/api/auth/login")
        .peer_addr("10.0.0.8:40123".parse().unwrap())
        .set_json(json!({"email": "admin@8718.jp", "password": "admin"}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    let req = test::TestRequest::post()
        .uri("/api/auth/login")
        .peer_addr(local_addr())
        .set_json(json!({"email": "admin@8718.jp", "password": "admin"}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let admin_token = cookie_value(&resp, "8718_auth").unwrap();

    // Staff cannot touch the matrix.
    let matrix = json!([
        {"feature": "dashboard", "boss": true, "manager": true, "staff": true},
        {"feature": "invoice", "boss": true, "manager": false, "staff": false},
    ]);
    let req = test::TestRequest::put()
        .uri("/api/permissions")
        .cookie(Cookie::new("8718_auth", staff_token.clone()))
        .set_json(matrix.clone())
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);

    let req = test::TestRequest::put()
        .uri("/api/permissions")
        .peer_addr(local_addr())
        .cookie(Cookie::new("8718_auth", admin_token.clone()))
        .set_json(json!([{"feature": "bouquets", "staff": true}]))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let req = test::TestRequest::put()
        .uri("/api/permissions")
        .peer_addr(local_addr())
        .cookie(Cookie::new("8718_auth", admin_token.clone()))
        .set_json(matrix)
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let perms = cookie_value(&resp, "8718_perms").unwrap();
    assert!(!perms.is_empty());
    assert!(dir.path().join("data").join("permissions.json").exists());

    // The admin's bearer token works from an allowed client only.
    let req = test::TestRequest::get()
        .uri("/api/permissions")
        .peer_addr(local_addr())
        .insert_header((header::AUTHORIZATION, format!("Bearer {admin_token}")))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["data"]["configured"], json!(true));
    assert_eq!(body["data"]["compact"]["boss"][1], json!("/invoice"));

    let req = test::TestRequest::get()
        .uri("/api/permissions")
        .peer_addr("10.0.0.8:40123".parse().unwrap())
        .insert_header((header::AUTHORIZATION, format!("Bearer {admin_token}")))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    // The gate now turns staff away from invoices.
    let req = test::TestRequest::get()
        .uri("/invoice/2024")
        .cookie(Cookie::new("8718_auth", staff_token.clone()))
        .cookie(Cookie::new("8718_perms", perms.clone()))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FOUND);
    assert_eq!(location(&resp), "/dashboard");

    let req = test::TestRequest::get()
        .uri("/dashboard")
        .cookie(Cookie::new("8718_auth", staff_token.clone()))
        .cookie(Cookie::new("8718_perms", perms))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let req = test::TestRequest::get()
        .uri("/api/cani?path=/invoice/2024")
        .cookie(Cookie::new("8718_auth", staff_token.clone()))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["data"]["allow"], json!(false));
    assert_eq!(body["data"]["feature"], json!("invoice"));

    let req = test::TestRequest::get()
        .uri("/api/nav")
        .cookie(Cookie::new("8718_auth", staff_token.clone()))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    let paths: Vec<&str> = body["data"]
        .as_array()
        .unwrap()
        .iter()
        .filter_map(|item| item["path"].as_str())
        .collect();
    assert!(paths.contains(&"/dashboard"));
    assert!(!paths.contains(&"/invoice"));
    assert!(!paths.contains(&"/settings"));

    // Clearing the matrix opens every feature again.
    let req = test::TestRequest::delete()
        .uri("/api/permissions")
        .peer_addr(local_addr())
        .cookie(Cookie::new("8718_auth", admin_token))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(cookie_value(&resp, "8718_perms").as_deref(), Some(""));

    let req = test::TestRequest::get()
        .uri("/api/cani?path=/invoice/2024")
        .cookie(Cookie::new("8718_auth", staff_token.clone()))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["data"]["allow"], json!(true));

    let req = test::TestRequest::post()
        .uri("/api/auth/logout")
        .cookie(Cookie::new("8718_auth", staff_token))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(cookie_value(&resp, "8718_auth").as_deref(), Some(""));
    assert_eq!(cookie_value(&resp, "8718_perms").as_deref(), Some(""));
}

#[actix_web::test]
async fn test_api_requires_login() {
    let dir = tempfile::tempdir().unwrap();
    let ctx = build_context(dir.path());

    let app = test::init_service(
        App::new()
            .configure(|cfg| RestfulServer::configure(cfg, ctx.clone()))
            .wrap(from_fn(middleware::gate)),
    )
    .await;

    let req = test::TestRequest::get().uri("/api/whoami").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    let req = test::TestRequest::get()
        .uri("/api/whoami")
        .cookie(Cookie::new("8718_auth", "forged"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    let req = test::TestRequest::post()
        .uri("/api/auth/login")
        .set_json(json!({"email": "toyohira-manager@8718.jp"}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    let token = cookie_value(&resp, "8718_auth").unwrap();

    let req = test::TestRequest::get()
        .uri("/api/whoami")
        .cookie(Cookie::new("8718_auth", token))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["data"]["role"], json!("manager"));

    let req = test::TestRequest::post()
        .uri("/api/auth/login")
        .set_json(json!({"email": "not-an-email"}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}
