use actix_web::{body::MessageBody, http::StatusCode, test, test::TestRequest, web::ServiceConfig, App};
use chrono::Duration;
use fetchgo_engine::db_types::{AccountKind, Roles};
use fg_common::Secret;
use log::debug;

use crate::{auth::TokenIssuer, config::AuthConfig, middleware::JwtMiddlewareFactory};

// Creates a test `AuthConfig` for issuing tokens. DO NOT re-use this secret anywhere.
pub fn get_auth_config() -> AuthConfig {
    AuthConfig {
        jwt_secret: Secret::new("endpoint-test-secret-0123456789abcdef".to_string()),
        token_expiry: Duration::hours(1),
    }
}

pub fn issue_token(account_id: i64, kind: AccountKind, name: &str, roles: Roles) -> String {
    let signer = TokenIssuer::new(&get_auth_config());
    signer.issue_token(account_id, kind, name, roles).expect("Failed to sign token")
}

/// Issue a GET against an app whose routes sit behind the JWT middleware.
pub async fn get_request(
    auth_header: &str,
    path: &str,
    configure: fn(&mut ServiceConfig),
) -> Result<(StatusCode, String), String> {
    let mut req = TestRequest::get().uri(path);
    if !auth_header.is_empty() {
        req = req.insert_header(("Authorization", format!("Bearer {auth_header}")));
    }
    call(req, configure, true).await
}

/// Issue a POST with a JSON body against an app whose routes sit behind the JWT middleware.
pub async fn post_request(
    auth_header: &str,
    path: &str,
    body: serde_json::Value,
    configure: fn(&mut ServiceConfig),
) -> Result<(StatusCode, String), String> {
    let mut req = TestRequest::post().uri(path).set_json(body);
    if !auth_header.is_empty() {
        req = req.insert_header(("Authorization", format!("Bearer {auth_header}")));
    }
    call(req, configure, true).await
}

/// Issue a POST against the public (unauthenticated) routes, e.g. signup and login.
pub async fn public_post_request(
    path: &str,
    body: serde_json::Value,
    configure: fn(&mut ServiceConfig),
) -> Result<(StatusCode, String), String> {
    let req = TestRequest::post().uri(path).set_json(body);
    call(req, configure, false).await
}

async fn call(
    req: TestRequest,
    configure: fn(&mut ServiceConfig),
    authenticated: bool,
) -> Result<(StatusCode, String), String> {
    let req = req.to_request();
    debug!("Making request");
    let (status, body) = if authenticated {
        let app = App::new().wrap(JwtMiddlewareFactory::new(get_auth_config())).configure(configure);
        let service = test::init_service(app).await;
        let (_, res) = test::try_call_service(&service, req).await.map_err(|e| e.to_string())?.into_parts();
        let status = res.status();
        (status, res.into_body())
    } else {
        let app = App::new().configure(configure);
        let service = test::init_service(app).await;
        let (_, res) = test::try_call_service(&service, req).await.map_err(|e| e.to_string())?.into_parts();
        let status = res.status();
        (status, res.into_body())
    };
    let body = String::from_utf8_lossy(&body.try_into_bytes().unwrap()).into_owned();
    if status.is_success() {
        Ok((status, body))
    } else {
        // A handler-level error is rendered into an HTTP response carrying a
        // `{"error": "..."}` envelope (middleware errors are instead surfaced as the
        // `Err` from `try_call_service` above). Surface the message the same way so the
        // tests see an `Err` regardless of where the failure originated.
        let message = serde_json::from_str::<serde_json::Value>(&body)
            .ok()
            .and_then(|value| value.get("error").and_then(|error| error.as_str()).map(str::to_owned))
            .unwrap_or(body);
        Err(message)
    }
}
