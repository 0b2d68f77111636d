use actix_web::{http::StatusCode, web, web::ServiceConfig};
use chrono::{TimeZone, Utc};
use fetchgo_engine::{
    db_types::{AccountKind, Order, OrderId, OrderStatus, Place, Role},
    order_objects::OrderResult,
    AccountApi,
};
use fg_common::{Centavos, Meters};

use super::{
    helpers::{get_request, issue_token},
    mocks::MockAccountManager,
};
use crate::routes::{self, MyDeliveriesRoute, MyOrdersRoute};

#[actix_web::test]
async fn fetch_my_orders_no_token() {
    let _ = env_logger::try_init().ok();
    let err = get_request("", "/orders", configure).await.expect_err("Expected error");
    assert_eq!(err, "Authentication Error. No access token was provided.");
}

#[actix_web::test]
async fn fetch_my_orders() {
    let _ = env_logger::try_init().ok();
    let token = customer_token(vec![Role::Customer]);
    let (status, body) = get_request(&token, "/orders", configure).await.expect("Request failed");
    assert_eq!(status, StatusCode::OK);
    let expected = serde_json::to_string(&OrderResult::from(orders_response())).unwrap();
    assert_eq!(body, expected);
}

#[actix_web::test]
async fn fetch_my_orders_invalid_sig() {
    let _ = env_logger::try_init().ok();
    let mut token = customer_token(vec![Role::Customer]);
    token.replace_range(token.len() - 10..token.len() - 5, "00000");
    let err = get_request(&token, "/orders", configure).await.expect_err("Expected error");
    assert!(err.starts_with("Authentication Error. Access token is invalid."), "got: {err}");
}

#[actix_web::test]
async fn riders_may_not_use_the_customer_listing() {
    let _ = env_logger::try_init().ok();
    let token = issue_token(2, AccountKind::Rider, "Ben Cruz", vec![Role::Rider]);
    let err = get_request(&token, "/orders", configure).await.expect_err("Request should have failed");
    assert_eq!(err, "Insufficient permissions");
}

#[actix_web::test]
async fn customers_may_not_use_the_rider_listing() {
    let _ = env_logger::try_init().ok();
    let token = customer_token(vec![Role::Customer]);
    let err = get_request(&token, "/deliveries", configure).await.expect_err("Request should have failed");
    assert_eq!(err, "Insufficient permissions");
}

#[actix_web::test]
async fn rider_listing_filters_by_status() {
    let _ = env_logger::try_init().ok();
    let token = issue_token(2, AccountKind::Rider, "Ben Cruz", vec![Role::Rider]);
    let (status, body) =
        get_request(&token, "/deliveries?status=delivered", configure).await.expect("Request failed");
    assert_eq!(status, StatusCode::OK);
    let orders: Vec<Order> = serde_json::from_str(&body).unwrap();
    assert_eq!(orders.len(), 1);
    assert_eq!(orders[0].status, OrderStatus::Delivered);
}

#[actix_web::test]
async fn order_by_id_is_hidden_from_strangers() {
    let _ = env_logger::try_init().ok();
    // The order belongs to customer 1 and rider 2. Customer 9 sees a 404.
    let token = issue_token(9, AccountKind::Customer, "Eva Gomez", vec![Role::Customer]);
    let err = get_request(&token, "/orders/fg0000000001", configure).await.expect_err("Expected error");
    assert!(err.starts_with("The data was not found."), "got: {err}");

    // An admin holding read_all can see any order.
    let token = issue_token(9, AccountKind::Customer, "Ops", vec![Role::Customer, Role::ReadAll]);
    let (status, body) = get_request(&token, "/orders/fg0000000001", configure).await.expect("Request failed");
    assert_eq!(status, StatusCode::OK);
    let order: Order = serde_json::from_str(&body).unwrap();
    assert_eq!(order.order_id, OrderId("fg0000000001".into()));
}

#[actix_web::test]
async fn order_by_id_for_the_owner() {
    let _ = env_logger::try_init().ok();
    let token = customer_token(vec![Role::Customer]);
    let (status, body) = get_request(&token, "/orders/fg0000000001", configure).await.expect("Request failed");
    assert_eq!(status, StatusCode::OK);
    let order: Order = serde_json::from_str(&body).unwrap();
    assert_eq!(order.customer_id, 1);
}

fn customer_token(roles: Vec<Role>) -> String {
    issue_token(1, AccountKind::Customer, "Ana Reyes", roles)
}

fn configure(cfg: &mut ServiceConfig) {
    let mut account_manager = MockAccountManager::new();
    account_manager.expect_fetch_orders_for_customer().returning(move |_| Ok(orders_response()));
    account_manager.expect_fetch_orders_for_rider().returning(move |_| Ok(orders_response()));
    account_manager
        .expect_fetch_order_by_order_id()
        .returning(move |_| Ok(orders_response().into_iter().next()));
    let accounts_api = AccountApi::new(account_manager);
    cfg.service(MyOrdersRoute::<MockAccountManager>::new())
        .service(MyDeliveriesRoute::<MockAccountManager>::new())
        .route("/orders/{order_id}", web::get().to(routes::order_by_id::<MockAccountManager>))
        .app_data(web::Data::new(accounts_api));
}

// Mock response for the order listing calls
fn orders_response() -> Vec<Order> {
    vec![
        Order {
            id: 1,
            order_id: OrderId("fg0000000001".into()),
            customer_id: 1,
            customer_name: "Ana Reyes".to_string(),
            rider_id: Some(2),
            rider_name: Some("Ben Cruz".to_string()),
            pickup: Place { lat: 10.3779, lng: 123.6386, address: "Carcar City Plaza".into() },
            destination: Place { lat: 10.3812, lng: 123.6401, address: "San Fernando Market".into() },
            delivery_details: "2 boxes of lechon".to_string(),
            distance: Meters::from(3460),
            price: Centavos::from(3806),
            status: OrderStatus::Delivered,
            created_at: Utc.with_ymd_and_hms(2025, 6, 2, 13, 30, 0).unwrap(),
            updated_at: Utc.with_ymd_and_hms(2025, 6, 2, 15, 10, 0).unwrap(),
            accepted_at: Some(Utc.with_ymd_and_hms(2025, 6, 2, 13, 40, 0).unwrap()),
            started_at: Some(Utc.with_ymd_and_hms(2025, 6, 2, 14, 0, 0).unwrap()),
            delivered_at: Some(Utc.with_ymd_and_hms(2025, 6, 2, 15, 10, 0).unwrap()),
        },
        Order {
            id: 2,
            order_id: OrderId("fg0000000002".into()),
            customer_id: 1,
            customer_name: "Ana Reyes".to_string(),
            rider_id: None,
            rider_name: None,
            pickup: Place { lat: 10.3779, lng: 123.6386, address: "Carcar City Plaza".into() },
            destination: Place { lat: 10.3902, lng: 123.6488, address: "Valladolid".into() },
            delivery_details: "documents".to_string(),
            distance: Meters::from(2000),
            price: Centavos::from(2200),
            status: OrderStatus::Pending,
            created_at: Utc.with_ymd_and_hms(2025, 6, 3, 9, 0, 0).unwrap(),
            updated_at: Utc.with_ymd_and_hms(2025, 6, 3, 9, 0, 0).unwrap(),
            accepted_at: None,
            started_at: None,
            delivered_at: None,
        },
    ]
}
