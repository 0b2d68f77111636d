use actix_web::{http::StatusCode, web, web::ServiceConfig};
use chrono::{TimeZone, Utc};
use fetchgo_engine::{
    db_types::{AccountKind, ChatMessage, Customer, Order, OrderId, OrderStatus, Place, Role},
    events::EventProducers,
    ChatApi,
};
use fg_common::{Centavos, Meters};
use serde_json::json;

use super::{
    helpers::{get_request, issue_token, post_request},
    mocks::MockChatBackend,
};
use crate::routes;

#[actix_web::test]
async fn participants_see_the_history() {
    let _ = env_logger::try_init().ok();
    let token = issue_token(1, AccountKind::Customer, "Ana Reyes", vec![Role::Customer]);
    let (status, body) = get_request(&token, "/chat/fg0000000001", configure).await.expect("Request failed");
    assert_eq!(status, StatusCode::OK);
    let messages: Vec<ChatMessage> = serde_json::from_str(&body).unwrap();
    assert_eq!(messages.len(), 2);
    assert_eq!(messages[0].body, "hello!");

    let token = issue_token(2, AccountKind::Rider, "Ben Cruz", vec![Role::Rider]);
    let (status, _) = get_request(&token, "/chat/fg0000000001", configure).await.expect("Request failed");
    assert_eq!(status, StatusCode::OK);
}

#[actix_web::test]
async fn strangers_are_locked_out() {
    let _ = env_logger::try_init().ok();
    let token = issue_token(9, AccountKind::Customer, "Eva Gomez", vec![Role::Customer]);
    let err = get_request(&token, "/chat/fg0000000001", configure).await.expect_err("Expected error");
    assert_eq!(err, "Chat error. Only the order's customer and its assigned rider may use this chat");
}

#[actix_web::test]
async fn read_all_admins_bypass_the_participant_check() {
    let _ = env_logger::try_init().ok();
    let token = issue_token(9, AccountKind::Customer, "Ops", vec![Role::Customer, Role::ReadAll]);
    let (status, body) = get_request(&token, "/chat/fg0000000001", configure).await.expect("Request failed");
    assert_eq!(status, StatusCode::OK);
    let messages: Vec<ChatMessage> = serde_json::from_str(&body).unwrap();
    assert_eq!(messages.len(), 2);
}

#[actix_web::test]
async fn participants_can_post() {
    let _ = env_logger::try_init().ok();
    let token = issue_token(1, AccountKind::Customer, "Ana Reyes", vec![Role::Customer]);
    let body = json!({ "message": "is it fragile?" });
    let (status, body) = post_request(&token, "/chat/fg0000000001", body, configure).await.expect("Request failed");
    assert_eq!(status, StatusCode::CREATED);
    let message: ChatMessage = serde_json::from_str(&body).unwrap();
    assert_eq!(message.body, "is it fragile?");
    assert_eq!(message.sender_kind, AccountKind::Customer);
}

#[actix_web::test]
async fn empty_messages_are_rejected() {
    let _ = env_logger::try_init().ok();
    let token = issue_token(1, AccountKind::Customer, "Ana Reyes", vec![Role::Customer]);
    let body = json!({ "message": "   " });
    let err = post_request(&token, "/chat/fg0000000001", body, configure).await.expect_err("Expected error");
    assert_eq!(err, "Chat error. Message body cannot be empty");
}

#[actix_web::test]
async fn chat_is_closed_until_a_rider_accepts() {
    let _ = env_logger::try_init().ok();
    let token = issue_token(1, AccountKind::Customer, "Ana Reyes", vec![Role::Customer]);
    let err = get_request(&token, "/chat/fg0000000002", configure).await.expect_err("Expected error");
    assert_eq!(err, "Chat error. Chat is only available after a rider accepts the order");
}

fn accepted_order() -> Order {
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
        status: OrderStatus::Accepted,
        created_at: Utc.with_ymd_and_hms(2025, 6, 2, 13, 30, 0).unwrap(),
        updated_at: Utc.with_ymd_and_hms(2025, 6, 2, 13, 40, 0).unwrap(),
        accepted_at: Some(Utc.with_ymd_and_hms(2025, 6, 2, 13, 40, 0).unwrap()),
        started_at: None,
        delivered_at: None,
    }
}

fn pending_order() -> Order {
    Order {
        id: 2,
        order_id: OrderId("fg0000000002".into()),
        rider_id: None,
        rider_name: None,
        status: OrderStatus::Pending,
        accepted_at: None,
        ..accepted_order()
    }
}

fn history() -> Vec<ChatMessage> {
    vec![
        ChatMessage {
            id: 1,
            order_id: OrderId("fg0000000001".into()),
            sender_id: 1,
            sender_kind: AccountKind::Customer,
            sender_name: "Ana Reyes".to_string(),
            body: "hello!".to_string(),
            created_at: Utc.with_ymd_and_hms(2025, 6, 2, 13, 41, 0).unwrap(),
        },
        ChatMessage {
            id: 2,
            order_id: OrderId("fg0000000001".into()),
            sender_id: 2,
            sender_kind: AccountKind::Rider,
            sender_name: "Ben Cruz".to_string(),
            body: "on my way".to_string(),
            created_at: Utc.with_ymd_and_hms(2025, 6, 2, 13, 42, 0).unwrap(),
        },
    ]
}

fn configure(cfg: &mut ServiceConfig) {
    let mut backend = MockChatBackend::new();
    backend.expect_fetch_order_by_order_id().returning(|order_id| {
        match order_id.as_str() {
            "fg0000000001" => Ok(Some(accepted_order())),
            "fg0000000002" => Ok(Some(pending_order())),
            _ => Ok(None),
        }
    });
    backend.expect_fetch_messages_for_order().returning(|_| Ok(history()));
    backend.expect_insert_message().returning(|new| {
        Ok(ChatMessage {
            id: 3,
            order_id: new.order_id,
            sender_id: new.sender_id,
            sender_kind: new.sender_kind,
            sender_name: new.sender_name,
            body: new.body,
            created_at: Utc.with_ymd_and_hms(2025, 6, 2, 13, 43, 0).unwrap(),
        })
    });
    let chat_api = ChatApi::new(backend, EventProducers::default());
    cfg.route("/chat/{order_id}", web::get().to(routes::order_chat::<MockChatBackend>))
        .route("/chat/{order_id}", web::post().to(routes::send_chat_message::<MockChatBackend>))
        .app_data(web::Data::new(chat_api));
}
