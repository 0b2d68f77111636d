use actix_web::{http::StatusCode, web, web::ServiceConfig};
use chrono::{TimeZone, Utc};
use fetchgo_engine::{
    db_types::{AccountKind, Customer, Role},
    AuthApi,
};
use serde_json::json;

use super::{
    helpers::{get_auth_config, get_request, issue_token, public_post_request},
    mocks::MockAuthManager,
};
use crate::{
    auth::{decode_access_token, TokenIssuer},
    data_objects::AccessTokenResponse,
    routes::{self, CustomerSignupRoute, LoginRoute},
};

#[actix_web::test]
async fn signup_issues_a_working_token() {
    let _ = env_logger::try_init().ok();
    let body = json!({ "full_name": "Ana Reyes", "phone_number": "09170000001", "password": "hunter22" });
    let (status, body) = public_post_request("/auth/signup", body, configure).await.expect("Request failed");
    assert_eq!(status, StatusCode::OK);
    let response: AccessTokenResponse = serde_json::from_str(&body).unwrap();
    let claims = decode_access_token(&response.access_token, &get_auth_config()).expect("token should verify");
    assert_eq!(claims.sub, 1);
    assert_eq!(claims.kind, AccountKind::Customer);
    assert_eq!(claims.roles, vec![Role::Customer]);
}

#[actix_web::test]
async fn signup_rejects_short_passwords() {
    let _ = env_logger::try_init().ok();
    let body = json!({ "full_name": "Ana Reyes", "phone_number": "09170000001", "password": "12345" });
    let err = public_post_request("/auth/signup", body, configure).await.expect_err("Expected error");
    assert_eq!(err, "Could not read request body: Password must be at least 6 characters long.");
}

#[actix_web::test]
async fn signup_rejects_blank_fields() {
    let _ = env_logger::try_init().ok();
    let body = json!({ "full_name": "  ", "phone_number": "09170000001", "password": "hunter22" });
    let err = public_post_request("/auth/signup", body, configure).await.expect_err("Expected error");
    assert_eq!(err, "Could not read request body: Please fill in all fields.");
}

#[actix_web::test]
async fn login_with_the_right_password() {
    let _ = env_logger::try_init().ok();
    let body = json!({ "phone_number": "09170000001", "password": "hunter22", "kind": "customer" });
    let (status, body) = public_post_request("/auth", body, configure).await.expect("Request failed");
    assert_eq!(status, StatusCode::OK);
    let response: AccessTokenResponse = serde_json::from_str(&body).unwrap();
    let claims = decode_access_token(&response.access_token, &get_auth_config()).expect("token should verify");
    assert_eq!(claims.name, "Ana Reyes");
    assert_eq!(claims.roles, vec![Role::Customer]);
}

#[actix_web::test]
async fn login_with_the_wrong_password() {
    let _ = env_logger::try_init().ok();
    let body = json!({ "phone_number": "09170000001", "password": "hunter23", "kind": "customer" });
    let err = public_post_request("/auth", body, configure).await.expect_err("Expected error");
    assert_eq!(err, "Authentication Error. Invalid phone number or password.");
}

#[actix_web::test]
async fn login_with_an_unknown_phone_number() {
    let _ = env_logger::try_init().ok();
    let body = json!({ "phone_number": "09179999999", "password": "hunter22", "kind": "customer" });
    let err = public_post_request("/auth", body, configure).await.expect_err("Expected error");
    // Indistinguishable from a wrong password.
    assert_eq!(err, "Authentication Error. Invalid phone number or password.");
}

#[actix_web::test]
async fn check_token_accepts_a_valid_token() {
    let _ = env_logger::try_init().ok();
    let token = issue_token(1, AccountKind::Customer, "Ana Reyes", vec![Role::Customer]);
    let (status, body) = get_request(&token, "/check_token", configure_check).await.expect("Request failed");
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "Token is valid.");
}

#[actix_web::test]
async fn check_token_rejects_garbage() {
    let _ = env_logger::try_init().ok();
    let err = get_request("not.a.token", "/check_token", configure_check).await.expect_err("Expected error");
    assert!(err.starts_with("Authentication Error. Access token is invalid."), "got: {err}");
}

fn stored_customer() -> Customer {
    Customer {
        id: 1,
        full_name: "Ana Reyes".to_string(),
        phone_number: "09170000001".to_string(),
        created_at: Utc.with_ymd_and_hms(2025, 5, 1, 8, 0, 0).unwrap(),
    }
}

fn configure(cfg: &mut ServiceConfig) {
    let mut auth_manager = MockAuthManager::new();
    auth_manager.expect_insert_customer().returning(|_| Ok(stored_customer()));
    auth_manager.expect_fetch_customer_credentials().returning(|phone| {
        if phone == "09170000001" {
            let hash = bcrypt::hash("hunter22", 4).unwrap();
            Ok(Some((stored_customer(), hash)))
        } else {
            Ok(None)
        }
    });
    auth_manager.expect_fetch_extra_roles().returning(|_, _| Ok(vec![]));
    let auth_api = AuthApi::new(auth_manager);
    let signer = TokenIssuer::new(&get_auth_config());
    cfg.service(CustomerSignupRoute::<MockAuthManager>::new())
        .service(LoginRoute::<MockAuthManager>::new())
        .app_data(web::Data::new(auth_api))
        .app_data(web::Data::new(signer));
}

fn configure_check(cfg: &mut ServiceConfig) {
    cfg.route("/check_token", web::get().to(routes::check_token));
}
