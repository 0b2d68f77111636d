use std::{pin::Pin, time::Duration};

use actix_web::{http::KeepAlive, middleware::Logger, web, App, HttpServer};
use fetchgo_engine::{
    events::{EventHandlers, EventHooks, EventProducers},
    AccountApi,
    AuthApi,
    ChatApi,
    OrderFlowApi,
    SqliteDatabase,
};
use log::*;
use osm_tools::OsmApi;

use crate::{
    auth::TokenIssuer,
    chat_stream::MessageFeed,
    config::ServerConfig,
    errors::ServerError,
    expiry_worker::start_expiry_worker,
    middleware::JwtMiddlewareFactory,
    routes::{
        self,
        health,
        AcceptOrderRoute,
        AvailableDeliveriesRoute,
        CompleteDeliveryRoute,
        CustomerSignupRoute,
        LoginRoute,
        MyDeliveriesRoute,
        MyOrdersRoute,
        OrdersSearchRoute,
        PlaceOrderRoute,
        RiderSignupRoute,
        StartDeliveryRoute,
        UpdateDetailsRoute,
        UpdateRolesRoute,
    },
};

const EVENT_BUFFER_SIZE: usize = 32;
const CHAT_FEED_CAPACITY: usize = 128;

pub async fn run_server(config: ServerConfig) -> Result<(), ServerError> {
    let db = SqliteDatabase::new_with_url(&config.database_url, 25)
        .await
        .map_err(|e| ServerError::InitializeError(e.to_string()))?;
    let feed = MessageFeed::new(CHAT_FEED_CAPACITY);
    let handlers = EventHandlers::new(EVENT_BUFFER_SIZE, default_hooks(feed.clone()));
    let producers = handlers.producers();
    handlers.start_handlers().await;
    if config.disable_expiry_worker {
        warn!("🕰️ The expiry worker is disabled. Stale pending orders will accumulate.");
    } else {
        // The handle is deliberately dropped; the worker runs for the life of the process.
        let _ = start_expiry_worker(db.clone(), producers.clone(), config.stale_order_timeout);
    }
    let srv = create_server_instance(config, db, producers, feed)?;
    srv.await.map_err(|e| ServerError::Unspecified(e.to_string()))
}

/// The standard event wiring: chat messages are republished onto the live SSE feed, and lifecycle
/// transitions are logged.
fn default_hooks(feed: MessageFeed) -> EventHooks {
    let mut hooks = EventHooks::default();
    hooks.on_message_sent(move |ev| {
        let feed = feed.clone();
        Box::pin(async move {
            feed.publish(ev.message);
        }) as Pin<Box<dyn std::future::Future<Output = ()> + Send>>
    });
    hooks.on_status_changed(|ev| {
        Box::pin(async move {
            info!("🔔️ Order {} moved {} → {}", ev.order.order_id, ev.old_status, ev.order.status);
        }) as Pin<Box<dyn std::future::Future<Output = ()> + Send>>
    });
    hooks
}

pub fn create_server_instance(
    config: ServerConfig,
    db: SqliteDatabase,
    producers: EventProducers,
    feed: MessageFeed,
) -> Result<actix_web::dev::Server, ServerError> {
    let geo = OsmApi::new(config.osm_config.clone()).map_err(|e| ServerError::InitializeError(e.to_string()))?;
    let (host, port) = (config.host.clone(), config.port);
    let srv = HttpServer::new(move || {
        let orders_api = OrderFlowApi::new(db.clone(), producers.clone());
        let chat_api = ChatApi::new(db.clone(), producers.clone());
        let auth_api = AuthApi::new(db.clone());
        let accounts_api = AccountApi::new(db.clone());
        let jwt_signer = TokenIssuer::new(&config.auth);
        let app = App::new()
            .wrap(Logger::new("%t (%D ms) %s %a %{Host}i %U").log_target("fgs::access_log"))
            .app_data(web::Data::new(orders_api))
            .app_data(web::Data::new(chat_api))
            .app_data(web::Data::new(accounts_api))
            .app_data(web::Data::new(auth_api))
            .app_data(web::Data::new(jwt_signer))
            .app_data(web::Data::new(geo.clone()))
            .app_data(web::Data::new(feed.clone()));
        // Routes that require authentication
        let api_scope = web::scope("/api")
            .wrap(JwtMiddlewareFactory::new(config.auth.clone()))
            .service(PlaceOrderRoute::<SqliteDatabase>::new())
            .service(MyOrdersRoute::<SqliteDatabase>::new())
            .service(UpdateDetailsRoute::<SqliteDatabase>::new())
            .service(AvailableDeliveriesRoute::<SqliteDatabase>::new())
            .service(MyDeliveriesRoute::<SqliteDatabase>::new())
            .service(AcceptOrderRoute::<SqliteDatabase>::new())
            .service(StartDeliveryRoute::<SqliteDatabase>::new())
            .service(CompleteDeliveryRoute::<SqliteDatabase>::new())
            .service(OrdersSearchRoute::<SqliteDatabase>::new())
            .service(UpdateRolesRoute::<SqliteDatabase>::new())
            // Handlers whose access rules depend on the claims rather than a single role are
            // registered directly; they run their own checks.
            .route("/quote", web::post().to(routes::quote))
            .route("/orders/{order_id}", web::get().to(routes::order_by_id::<SqliteDatabase>))
            .route("/orders/{order_id}/cancel", web::post().to(routes::cancel_order::<SqliteDatabase>))
            .route("/chat/{order_id}", web::get().to(routes::order_chat::<SqliteDatabase>))
            .route("/chat/{order_id}", web::post().to(routes::send_chat_message::<SqliteDatabase>))
            .route("/chat/{order_id}/live", web::get().to(routes::chat_stream::<SqliteDatabase>))
            .route("/check_token", web::get().to(routes::check_token));
        app.service(health)
            .service(CustomerSignupRoute::<SqliteDatabase>::new())
            .service(RiderSignupRoute::<SqliteDatabase>::new())
            .service(LoginRoute::<SqliteDatabase>::new())
            .service(api_scope)
    })
    .keep_alive(KeepAlive::Timeout(Duration::from_secs(600)))
    .bind((host.as_str(), port))?
    .run();
    Ok(srv)
}
