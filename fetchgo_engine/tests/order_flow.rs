//! End-to-end tests of the order lifecycle and chat rules against a real (in-memory) SQLite backend.

use chrono::Duration;
use fetchgo_engine::{
    db_types::{AccountKind, Customer, NewOrder, OrderStatus, Place, Rider},
    events::EventProducers,
    order_objects::OrderQueryFilter,
    AccountManagement,
    AuthApi,
    ChatApi,
    ChatApiError,
    OrderFlowApi,
    OrderFlowError,
    SqliteDatabase,
};
use fg_common::{Centavos, Meters};

async fn new_db() -> SqliteDatabase {
    let _ = env_logger::try_init();
    // One connection keeps the in-memory database alive for the whole test.
    SqliteDatabase::new_with_url("sqlite::memory:", 1).await.expect("Could not create test database")
}

fn order_api(db: &SqliteDatabase) -> OrderFlowApi<SqliteDatabase> {
    OrderFlowApi::new(db.clone(), EventProducers::default())
}

fn chat_api(db: &SqliteDatabase) -> ChatApi<SqliteDatabase> {
    ChatApi::new(db.clone(), EventProducers::default())
}

async fn signup_customer(db: &SqliteDatabase, name: &str, phone: &str) -> Customer {
    AuthApi::new(db.clone()).register_customer(name, phone, "hunter22").await.expect("customer signup failed")
}

async fn signup_rider(db: &SqliteDatabase, name: &str, phone: &str) -> Rider {
    AuthApi::new(db.clone())
        .register_rider(name, phone, "ABC-123", "N01-23-456789", "hunter22")
        .await
        .expect("rider signup failed")
}

fn new_order(customer: &Customer) -> NewOrder {
    NewOrder::new(
        customer.id,
        customer.full_name.clone(),
        Place { lat: 10.3779, lng: 123.6386, address: "Carcar City Plaza".into() },
        Place { lat: 10.3812, lng: 123.6401, address: "San Fernando Market".into() },
        "2 boxes of lechon".into(),
        Meters::from(3460),
        Centavos::from(3806),
    )
}

#[tokio::test]
async fn full_delivery_lifecycle() {
    let db = new_db().await;
    let customer = signup_customer(&db, "Ana Reyes", "09170000001").await;
    let rider = signup_rider(&db, "Ben Cruz", "09170000002").await;
    let api = order_api(&db);

    let order = api.place_order(new_order(&customer)).await.unwrap();
    assert_eq!(order.status, OrderStatus::Pending);
    assert!(order.rider_id.is_none());
    assert!(order.accepted_at.is_none());

    let order = api.accept_order(&order.order_id, rider.id, &rider.full_name).await.unwrap();
    assert_eq!(order.status, OrderStatus::Accepted);
    assert_eq!(order.rider_id, Some(rider.id));
    assert_eq!(order.rider_name.as_deref(), Some("Ben Cruz"));
    assert!(order.accepted_at.is_some());
    assert!(order.started_at.is_none());

    let order = api.start_delivery(&order.order_id, rider.id).await.unwrap();
    assert_eq!(order.status, OrderStatus::InProgress);
    assert!(order.started_at.is_some());

    let order = api.complete_delivery(&order.order_id, rider.id).await.unwrap();
    assert_eq!(order.status, OrderStatus::Delivered);
    assert!(order.delivered_at.is_some());
}

#[tokio::test]
async fn second_rider_loses_the_accept_race() {
    let db = new_db().await;
    let customer = signup_customer(&db, "Ana Reyes", "09170000001").await;
    let first = signup_rider(&db, "Ben Cruz", "09170000002").await;
    let second = signup_rider(&db, "Carlo Diaz", "09170000003").await;
    let api = order_api(&db);

    let order = api.place_order(new_order(&customer)).await.unwrap();
    api.accept_order(&order.order_id, first.id, &first.full_name).await.unwrap();

    let err = api.accept_order(&order.order_id, second.id, &second.full_name).await.unwrap_err();
    assert!(matches!(err, OrderFlowError::OrderAlreadyTaken(_)), "got {err:?}");

    // The winner is still the assigned rider.
    let order = db.fetch_order_by_order_id(&order.order_id).await.unwrap().unwrap();
    assert_eq!(order.rider_id, Some(first.id));
}

#[tokio::test]
async fn only_the_assigned_rider_may_start_and_complete() {
    let db = new_db().await;
    let customer = signup_customer(&db, "Ana Reyes", "09170000001").await;
    let assigned = signup_rider(&db, "Ben Cruz", "09170000002").await;
    let other = signup_rider(&db, "Carlo Diaz", "09170000003").await;
    let api = order_api(&db);

    let order = api.place_order(new_order(&customer)).await.unwrap();
    api.accept_order(&order.order_id, assigned.id, &assigned.full_name).await.unwrap();

    let err = api.start_delivery(&order.order_id, other.id).await.unwrap_err();
    assert!(matches!(err, OrderFlowError::NotAssignedRider(_)), "got {err:?}");

    api.start_delivery(&order.order_id, assigned.id).await.unwrap();
    let err = api.complete_delivery(&order.order_id, other.id).await.unwrap_err();
    assert!(matches!(err, OrderFlowError::NotAssignedRider(_)), "got {err:?}");
}

#[tokio::test]
async fn transitions_out_of_order_are_rejected() {
    let db = new_db().await;
    let customer = signup_customer(&db, "Ana Reyes", "09170000001").await;
    let rider = signup_rider(&db, "Ben Cruz", "09170000002").await;
    let api = order_api(&db);

    let order = api.place_order(new_order(&customer)).await.unwrap();

    // Cannot start or complete a pending order.
    let err = api.start_delivery(&order.order_id, rider.id).await.unwrap_err();
    assert!(matches!(err, OrderFlowError::IllegalTransition { status: OrderStatus::Pending, .. }), "got {err:?}");
    let err = api.complete_delivery(&order.order_id, rider.id).await.unwrap_err();
    assert!(matches!(err, OrderFlowError::IllegalTransition { status: OrderStatus::Pending, .. }), "got {err:?}");
}

#[tokio::test]
async fn customer_cancellation_only_while_pending() {
    let db = new_db().await;
    let customer = signup_customer(&db, "Ana Reyes", "09170000001").await;
    let stranger = signup_customer(&db, "Eva Gomez", "09170000009").await;
    let rider = signup_rider(&db, "Ben Cruz", "09170000002").await;
    let api = order_api(&db);

    // Someone else's order looks like a missing order.
    let order = api.place_order(new_order(&customer)).await.unwrap();
    let err = api.cancel_order_as_customer(&order.order_id, stranger.id).await.unwrap_err();
    assert!(matches!(err, OrderFlowError::OrderNotFound(_)), "got {err:?}");

    let cancelled = api.cancel_order_as_customer(&order.order_id, customer.id).await.unwrap();
    assert_eq!(cancelled.status, OrderStatus::Cancelled);
    // Cancellation is a status write, not a deletion.
    assert!(db.fetch_order_by_order_id(&order.order_id).await.unwrap().is_some());

    // Once accepted, the customer can no longer cancel; an admin still can.
    let order = api.place_order(new_order(&customer)).await.unwrap();
    api.accept_order(&order.order_id, rider.id, &rider.full_name).await.unwrap();
    let err = api.cancel_order_as_customer(&order.order_id, customer.id).await.unwrap_err();
    assert!(matches!(err, OrderFlowError::IllegalTransition { status: OrderStatus::Accepted, .. }), "got {err:?}");
    let cancelled = api.cancel_order_as_admin(&order.order_id).await.unwrap();
    assert_eq!(cancelled.status, OrderStatus::Cancelled);
}

#[tokio::test]
async fn delivery_details_editable_only_while_pending() {
    let db = new_db().await;
    let customer = signup_customer(&db, "Ana Reyes", "09170000001").await;
    let rider = signup_rider(&db, "Ben Cruz", "09170000002").await;
    let api = order_api(&db);

    let order = api.place_order(new_order(&customer)).await.unwrap();
    let updated = api.update_delivery_details(&order.order_id, customer.id, "  3 boxes, fragile  ").await.unwrap();
    assert_eq!(updated.delivery_details, "3 boxes, fragile");

    let err = api.update_delivery_details(&order.order_id, customer.id, "   ").await.unwrap_err();
    assert!(matches!(err, OrderFlowError::EmptyDeliveryDetails), "got {err:?}");

    api.accept_order(&order.order_id, rider.id, &rider.full_name).await.unwrap();
    let err = api.update_delivery_details(&order.order_id, customer.id, "too late").await.unwrap_err();
    assert!(matches!(err, OrderFlowError::IllegalTransition { status: OrderStatus::Accepted, .. }), "got {err:?}");
}

#[tokio::test]
async fn chat_opens_on_acceptance_and_is_participant_only() {
    let db = new_db().await;
    let customer = signup_customer(&db, "Ana Reyes", "09170000001").await;
    let outsider = signup_customer(&db, "Eva Gomez", "09170000009").await;
    let rider = signup_rider(&db, "Ben Cruz", "09170000002").await;
    let orders = order_api(&db);
    let chat = chat_api(&db);

    let order = orders.place_order(new_order(&customer)).await.unwrap();
    let err = chat
        .send_message(&order.order_id, customer.id, AccountKind::Customer, &customer.full_name, "hello?")
        .await
        .unwrap_err();
    assert!(matches!(err, ChatApiError::ChatNotOpen(_)), "got {err:?}");

    orders.accept_order(&order.order_id, rider.id, &rider.full_name).await.unwrap();
    chat.send_message(&order.order_id, customer.id, AccountKind::Customer, &customer.full_name, "hello!")
        .await
        .unwrap();
    chat.send_message(&order.order_id, rider.id, AccountKind::Rider, &rider.full_name, "on my way")
        .await
        .unwrap();

    let err = chat
        .send_message(&order.order_id, outsider.id, AccountKind::Customer, &outsider.full_name, "let me in")
        .await
        .unwrap_err();
    assert!(matches!(err, ChatApiError::NotAParticipant(_)), "got {err:?}");

    let messages = chat.messages_for_participant(&order.order_id, customer.id, AccountKind::Customer).await.unwrap();
    assert_eq!(messages.len(), 2);
    assert_eq!(messages[0].body, "hello!");
    assert_eq!(messages[1].body, "on my way");
    assert_eq!(messages[0].sender_kind, AccountKind::Customer);
    assert_eq!(messages[1].sender_kind, AccountKind::Rider);

    let err = chat.messages_for_participant(&order.order_id, outsider.id, AccountKind::Customer).await.unwrap_err();
    assert!(matches!(err, ChatApiError::NotAParticipant(_)), "got {err:?}");
}

#[tokio::test]
async fn search_and_listing_filters() {
    let db = new_db().await;
    let customer = signup_customer(&db, "Ana Reyes", "09170000001").await;
    let rider = signup_rider(&db, "Ben Cruz", "09170000002").await;
    let api = order_api(&db);

    let first = api.place_order(new_order(&customer)).await.unwrap();
    let second = api.place_order(new_order(&customer)).await.unwrap();
    api.accept_order(&first.order_id, rider.id, &rider.full_name).await.unwrap();

    let available = db.fetch_available_orders().await.unwrap();
    assert_eq!(available.len(), 1);
    assert_eq!(available[0].order_id, second.order_id);

    let mine = db.fetch_orders_for_customer(customer.id).await.unwrap();
    assert_eq!(mine.len(), 2);

    let assigned = db.fetch_orders_for_rider(rider.id).await.unwrap();
    assert_eq!(assigned.len(), 1);
    assert_eq!(assigned[0].order_id, first.order_id);

    let accepted = db
        .search_orders(OrderQueryFilter::default().with_status(OrderStatus::Accepted))
        .await
        .unwrap();
    assert_eq!(accepted.len(), 1);
    assert_eq!(accepted[0].order_id, first.order_id);

    let by_rider = db.search_orders(OrderQueryFilter::default().with_rider_id(rider.id)).await.unwrap();
    assert_eq!(by_rider.len(), 1);
}

#[tokio::test]
async fn stale_pending_orders_expire() {
    let db = new_db().await;
    let customer = signup_customer(&db, "Ana Reyes", "09170000001").await;
    let rider = signup_rider(&db, "Ben Cruz", "09170000002").await;
    let api = order_api(&db);

    let pending = api.place_order(new_order(&customer)).await.unwrap();
    let accepted = api.place_order(new_order(&customer)).await.unwrap();
    api.accept_order(&accepted.order_id, rider.id, &rider.full_name).await.unwrap();

    // A negative limit makes every pending order "stale" without sleeping in the test.
    let expired = api.expire_stale_orders(Duration::seconds(-1)).await.unwrap();
    assert_eq!(expired.len(), 1);
    assert_eq!(expired[0].order_id, pending.order_id);
    assert_eq!(expired[0].status, OrderStatus::Cancelled);

    // Accepted orders are left alone.
    let order = db.fetch_order_by_order_id(&accepted.order_id).await.unwrap().unwrap();
    assert_eq!(order.status, OrderStatus::Accepted);
}

#[tokio::test]
async fn duplicate_phone_numbers_are_rejected_per_kind() {
    let db = new_db().await;
    let auth = AuthApi::new(db.clone());
    signup_customer(&db, "Ana Reyes", "09170000001").await;

    let err = auth.register_customer("Another Ana", "09170000001", "password").await.unwrap_err();
    assert!(matches!(err, fetchgo_engine::AuthApiError::PhoneAlreadyRegistered), "got {err:?}");

    // The same phone number may exist independently as a rider account.
    auth.register_rider("Ana Reyes", "09170000001", "XYZ-789", "N09-87-654321", "password").await.unwrap();
}

#[tokio::test]
async fn login_verifies_credentials() {
    let db = new_db().await;
    let auth = AuthApi::new(db.clone());
    let registered = signup_customer(&db, "Ana Reyes", "09170000001").await;

    let (customer, roles) = auth.login_customer("09170000001", "hunter22").await.unwrap();
    assert_eq!(customer.id, registered.id);
    assert_eq!(roles, vec![fetchgo_engine::db_types::Role::Customer]);

    let err = auth.login_customer("09170000001", "wrong").await.unwrap_err();
    assert!(matches!(err, fetchgo_engine::AuthApiError::InvalidCredentials), "got {err:?}");
    let err = auth.login_customer("09179999999", "hunter22").await.unwrap_err();
    assert!(matches!(err, fetchgo_engine::AuthApiError::InvalidCredentials), "got {err:?}");
}
