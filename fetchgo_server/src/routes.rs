//! Request handler definitions
//!
//! Define each route and its handler here.
//! Handlers that are more than a line or two MUST go into a separate module. Keep this module neat and tidy 🙏
//!
//! A note about performance:
//! Since each worker thread processes its requests sequentially, handlers which block the current thread will cause the
//! current worker to stop processing new requests. For this reason, any long, non-cpu-bound operation (e.g. I/O,
//! database calls, requests to the mapping APIs) must be expressed as futures or asynchronous functions. Async handlers
//! get executed concurrently by worker threads and thus don't block execution.

use actix_web::{get, web, HttpResponse, Responder};
use fetchgo_engine::{
    db_types::{AccountKind, NewOrder, OrderId, Place, Role},
    order_objects::{OrderQueryFilter, OrderResult},
    AccountApi,
    AccountManagement,
    AuthApi,
    AuthManagement,
    ChatApi,
    ChatManagement,
    DeliveryDatabase,
    OrderFlowApi,
};
use log::*;
use osm_tools::{helpers::fare_for_distance, LatLng, OsmApi};

use crate::{
    auth::{JwtClaims, TokenIssuer},
    chat_stream::MessageFeed,
    data_objects::{
        AccessTokenResponse,
        CustomerSignupRequest,
        DeliveryListQuery,
        LoginRequest,
        NewOrderRequest,
        Profile,
        QuoteRequest,
        QuoteResult,
        RiderSignupRequest,
        RoleUpdateRequest,
        SendMessageRequest,
        UpdateDetailsRequest,
    },
    errors::ServerError,
};

// Web-actix cannot handle generics in handlers, so it's implemented manually using the `route!` macro
#[macro_export]
macro_rules! route {
    ($name:ident => $method:ident $path:literal requires [$($roles:ty),*]) => {
        paste::paste! { pub struct [<$name:camel Route>];}
        paste::paste! {
                impl [<$name:camel Route>] {
                #[allow(clippy::new_without_default)]
                pub fn new() -> Self { Self }
            }
        }
        paste::paste! {
            impl actix_web::dev::HttpServiceFactory for [<$name:camel Route>] {
                fn register(self, config: &mut actix_web::dev::AppService) {
                    let res = actix_web::Resource::new($path)
                        .name(stringify!($name))
                        .guard(actix_web::guard::$method())
                        .to($name)
                        .wrap($crate::middleware::AclMiddlewareFactory::new(&[$($roles),+]));
                    actix_web::dev::HttpServiceFactory::register(res, config);
                }
            }
        }
    };

    ($name:ident => $method:ident $path:literal impl $($bounds:ty),+) => {
        paste::paste! { pub struct [<$name:camel Route>]< $( [< T $bounds:camel> ],)+ >( $( core::marker::PhantomData<fn() -> [< T $bounds:camel> ] >,)+ );}
        paste::paste! { impl< $( [< T $bounds:camel> ],)+ > [<$name:camel Route>]< $( [< T $bounds:camel> ],)+ > {
            #[allow(clippy::new_without_default)]
            pub fn new() -> Self {
                Self($( core::marker::PhantomData::<fn() -> [< T $bounds:camel> ] >,)+)
            }
        }}
        paste::paste! { impl<$( [< T $bounds:camel >] , )+> actix_web::dev::HttpServiceFactory for [<$name:camel Route>]<$([<T $bounds:camel>],)+>
        where
            $([<T $bounds:camel>]: $bounds + 'static,)+
        {
            fn register(self, config: &mut actix_web::dev::AppService) {
                let res = actix_web::Resource::new($path)
                    .name(stringify!($name))
                    .guard(actix_web::guard::$method())
                    .to($name::< $( [< T $bounds:camel >], )+>);
                actix_web::dev::HttpServiceFactory::register(res, config);
            }
        }}
    };

    ($name:ident => $method:ident $path:literal impl $($bounds:ty),+ where requires [$($roles:ty),*])  => {
        paste::paste! { pub struct [<$name:camel Route>]<A>(core::marker::PhantomData<fn() -> A>);}
        paste::paste! { impl<A> [<$name:camel Route>]<A> {
            #[allow(clippy::new_without_default)]
            pub fn new() -> Self {
                Self(core::marker::PhantomData::<fn() -> A>)
            }
        }}
        paste::paste! { impl<A> actix_web::dev::HttpServiceFactory for [<$name:camel Route>]<A>
        where
            A: $($bounds)++ 'static,
        {
            fn register(self, config: &mut actix_web::dev::AppService) {
                let res = actix_web::Resource::new($path)
                    .name(stringify!($name))
                    .guard(actix_web::guard::$method())
                    .to($name::<A>)
                    .wrap($crate::middleware::AclMiddlewareFactory::new(&[$($roles),+]));
                actix_web::dev::HttpServiceFactory::register(res, config);
            }
        }}
    };
}

// ----------------------------------------------   Health  ----------------------------------------------------
#[get("/health")]
pub async fn health() -> impl Responder {
    trace!("💻️ Received health check request");
    HttpResponse::Ok().body("👍️\n")
}

//----------------------------------------------   Auth  ----------------------------------------------------
route!(customer_signup => Post "/auth/signup" impl AuthManagement);
/// Create a customer account and log it in.
///
/// Takes a full name, phone number and password, with the password needing at least 6 characters.
/// The phone number must not already belong to a customer account.
/// On success an access token is issued immediately, so no second login call is needed.
pub async fn customer_signup<TAuthManagement: AuthManagement>(
    api: web::Data<AuthApi<TAuthManagement>>,
    signer: web::Data<TokenIssuer>,
    body: web::Json<CustomerSignupRequest>,
) -> Result<HttpResponse, ServerError> {
    let CustomerSignupRequest { full_name, phone_number, password } = body.into_inner();
    validate_signup_fields(&[full_name.as_str(), phone_number.as_str()], &password)?;
    let customer = api.register_customer(&full_name, &phone_number, &password).await?;
    debug!("💻️ New customer signup for #{}", customer.id);
    let token =
        signer.issue_token(customer.id, AccountKind::Customer, &customer.full_name, vec![Role::Customer])?;
    Ok(HttpResponse::Ok().json(AccessTokenResponse { access_token: token, profile: Profile::Customer(customer) }))
}

route!(rider_signup => Post "/auth/signup/rider" impl AuthManagement);
/// Create a rider account and log it in.
///
/// Riders additionally register their vehicle plate number and driver licence number.
pub async fn rider_signup<TAuthManagement: AuthManagement>(
    api: web::Data<AuthApi<TAuthManagement>>,
    signer: web::Data<TokenIssuer>,
    body: web::Json<RiderSignupRequest>,
) -> Result<HttpResponse, ServerError> {
    let RiderSignupRequest { full_name, phone_number, plate_number, licence_number, password } = body.into_inner();
    validate_signup_fields(
        &[full_name.as_str(), phone_number.as_str(), plate_number.as_str(), licence_number.as_str()],
        &password,
    )?;
    let rider = api.register_rider(&full_name, &phone_number, &plate_number, &licence_number, &password).await?;
    debug!("💻️ New rider signup for #{}", rider.id);
    let token = signer.issue_token(rider.id, AccountKind::Rider, &rider.full_name, vec![Role::Rider])?;
    Ok(HttpResponse::Ok().json(AccessTokenResponse { access_token: token, profile: Profile::Rider(rider) }))
}

fn validate_signup_fields(required: &[&str], password: &str) -> Result<(), ServerError> {
    if required.iter().any(|f| f.trim().is_empty()) {
        return Err(ServerError::InvalidRequestBody("Please fill in all fields.".to_string()));
    }
    if password.len() < 6 {
        return Err(ServerError::InvalidRequestBody("Password must be at least 6 characters long.".to_string()));
    }
    Ok(())
}

route!(login => Post "/auth" impl AuthManagement);
/// Route handler for the auth endpoint
///
/// Verifies a phone number and password against the account table named by `kind` and issues a JWT
/// access token. The token carries the account's full role set (its implied role plus any stored
/// grants) and is valid for a fixed period; it will NOT refresh.
///
/// Unknown phone numbers and wrong passwords are deliberately the same 401.
pub async fn login<TAuthManagement: AuthManagement>(
    api: web::Data<AuthApi<TAuthManagement>>,
    signer: web::Data<TokenIssuer>,
    body: web::Json<LoginRequest>,
) -> Result<HttpResponse, ServerError> {
    let LoginRequest { phone_number, password, kind } = body.into_inner();
    trace!("💻️ Received {kind} login request");
    let response = match kind {
        AccountKind::Customer => {
            let (customer, roles) = api.login_customer(&phone_number, &password).await?;
            let token = signer.issue_token(customer.id, kind, &customer.full_name, roles)?;
            AccessTokenResponse { access_token: token, profile: Profile::Customer(customer) }
        },
        AccountKind::Rider => {
            let (rider, roles) = api.login_rider(&phone_number, &password).await?;
            let token = signer.issue_token(rider.id, kind, &rider.full_name, roles)?;
            AccessTokenResponse { access_token: token, profile: Profile::Rider(rider) }
        },
    };
    Ok(HttpResponse::Ok().json(response))
}

//----------------------------------------------   Quotes  ----------------------------------------------------

/// Price a prospective delivery without placing it.
///
/// Resolves both coordinates to addresses, routes between them, and applies the fare rule. The
/// response carries the route geometry so clients can draw the polyline on a map.
pub async fn quote(
    claims: JwtClaims,
    geo: web::Data<OsmApi>,
    body: web::Json<QuoteRequest>,
) -> Result<HttpResponse, ServerError> {
    let QuoteRequest { pickup, destination } = body.into_inner();
    debug!("💻️ Quote request from {} #{}", claims.kind, claims.sub);
    let quote = resolve_quote(geo.as_ref(), pickup, destination).await?;
    Ok(HttpResponse::Ok().json(quote))
}

/// Address resolution + routing + fare, shared by the quote and order-placement handlers.
/// The server is authoritative for prices: clients only ever send coordinates.
async fn resolve_quote(geo: &OsmApi, pickup: LatLng, destination: LatLng) -> Result<QuoteResult, ServerError> {
    let pickup_address = geo.reverse_geocode(pickup).await?;
    let destination_address = geo.reverse_geocode(destination).await?;
    let route = geo.route(pickup, destination).await?;
    let price = fare_for_distance(route.distance);
    Ok(QuoteResult { pickup_address, destination_address, distance: route.distance, price, route })
}

//----------------------------------------------   Orders  ----------------------------------------------------

route!(place_order => Post "/orders" impl DeliveryDatabase where requires [Role::Customer]);
/// Place a delivery order.
///
/// The pickup and destination come in as raw coordinates; the server resolves the addresses,
/// routes between them and prices the trip before inserting the order with `pending` status.
pub async fn place_order<A: DeliveryDatabase>(
    claims: JwtClaims,
    body: web::Json<NewOrderRequest>,
    geo: web::Data<OsmApi>,
    api: web::Data<OrderFlowApi<A>>,
) -> Result<HttpResponse, ServerError> {
    let NewOrderRequest { pickup, destination, delivery_details } = body.into_inner();
    debug!("💻️ New order request from customer #{}", claims.sub);
    let quote = resolve_quote(geo.as_ref(), pickup, destination).await?;
    let order = NewOrder::new(
        claims.sub,
        claims.name.clone(),
        Place { lat: pickup.lat, lng: pickup.lng, address: quote.pickup_address },
        Place { lat: destination.lat, lng: destination.lng, address: quote.destination_address },
        delivery_details,
        quote.distance,
        quote.price,
    );
    let order = api.place_order(order).await?;
    info!("💻️ Order {} placed by customer #{}", order.order_id, claims.sub);
    Ok(HttpResponse::Created().json(order))
}

route!(my_orders => Get "/orders" impl AccountManagement where requires [Role::Customer]);
/// The calling customer's orders, newest first, with the running fare total.
pub async fn my_orders<A: AccountManagement>(
    claims: JwtClaims,
    api: web::Data<AccountApi<A>>,
) -> Result<HttpResponse, ServerError> {
    debug!("💻️ GET my_orders for customer #{}", claims.sub);
    let orders = api.orders_for_customer(claims.sub).await?;
    Ok(HttpResponse::Ok().json(OrderResult::from(orders)))
}

/// Fetch a single order by its public id.
///
/// The owner, the assigned rider, and admins with `ReadAll` may see an order; everyone else gets
/// the same 404 a missing order would produce, so order ids cannot be probed.
pub async fn order_by_id<A: AccountManagement>(
    claims: JwtClaims,
    path: web::Path<OrderId>,
    api: web::Data<AccountApi<A>>,
) -> Result<HttpResponse, ServerError> {
    let order_id = path.into_inner();
    debug!("💻️ GET order_by_id({order_id})");
    let order = api
        .fetch_order_by_order_id(&order_id)
        .await?
        .ok_or_else(|| ServerError::NoRecordFound(format!("Order {order_id} does not exist")))?;
    let allowed = claims.is_read_all() || order.is_participant(claims.kind, claims.sub);
    if !allowed {
        return Err(ServerError::NoRecordFound(format!("Order {order_id} does not exist")));
    }
    Ok(HttpResponse::Ok().json(order))
}

route!(update_details => Patch "/orders/{order_id}/details" impl DeliveryDatabase where requires [Role::Customer]);
/// Edit the delivery details of one of the caller's pending orders.
pub async fn update_details<A: DeliveryDatabase>(
    claims: JwtClaims,
    path: web::Path<OrderId>,
    body: web::Json<UpdateDetailsRequest>,
    api: web::Data<OrderFlowApi<A>>,
) -> Result<HttpResponse, ServerError> {
    let order_id = path.into_inner();
    info!("💻️ Update delivery details request for {order_id}");
    let order = api.update_delivery_details(&order_id, claims.sub, &body.delivery_details).await?;
    Ok(HttpResponse::Ok().json(order))
}

/// Order cancellation.
///
/// Customers may cancel their own orders while still `pending`. Admins with the `SuperAdmin` role
/// may cancel any `pending` or `accepted` order. The order is marked `cancelled`; nothing is
/// deleted, so the order stays visible in both parties' histories.
pub async fn cancel_order<A: DeliveryDatabase>(
    claims: JwtClaims,
    path: web::Path<OrderId>,
    api: web::Data<OrderFlowApi<A>>,
) -> Result<HttpResponse, ServerError> {
    let order_id = path.into_inner();
    info!("💻️ Cancel order request for {order_id}");
    let order = if claims.has_role(Role::SuperAdmin) {
        api.cancel_order_as_admin(&order_id).await?
    } else if claims.has_role(Role::Customer) {
        api.cancel_order_as_customer(&order_id, claims.sub).await?
    } else {
        return Err(ServerError::InsufficientPermissions("Only customers and admins may cancel orders".to_string()));
    };
    Ok(HttpResponse::Ok().json(order))
}

//----------------------------------------------   Deliveries  ----------------------------------------------------

route!(available_deliveries => Get "/deliveries/available" impl AccountManagement where requires [Role::Rider]);
/// Every `pending` order, newest first. This is the rider dashboard's "Available" tab.
pub async fn available_deliveries<A: AccountManagement>(
    api: web::Data<AccountApi<A>>,
) -> Result<HttpResponse, ServerError> {
    debug!("💻️ GET available_deliveries");
    let orders = api.available_orders().await?;
    Ok(HttpResponse::Ok().json(orders))
}

route!(my_deliveries => Get "/deliveries" impl AccountManagement where requires [Role::Rider]);
/// The calling rider's deliveries. The optional `status` query narrows the list to one lifecycle
/// state, which is how the dashboard's accepted / in progress / delivered tabs are fed.
pub async fn my_deliveries<A: AccountManagement>(
    claims: JwtClaims,
    query: web::Query<DeliveryListQuery>,
    api: web::Data<AccountApi<A>>,
) -> Result<HttpResponse, ServerError> {
    debug!("💻️ GET my_deliveries for rider #{}", claims.sub);
    let orders = api.orders_for_rider(claims.sub, query.status).await?;
    Ok(HttpResponse::Ok().json(orders))
}

route!(accept_order => Post "/deliveries/{order_id}/accept" impl DeliveryDatabase where requires [Role::Rider]);
/// A rider claims a pending order.
///
/// The transition is atomic: when two riders race for the same order, exactly one wins and the
/// other receives a 409 with [`fetchgo_engine::OrderFlowError::OrderAlreadyTaken`].
pub async fn accept_order<A: DeliveryDatabase>(
    claims: JwtClaims,
    path: web::Path<OrderId>,
    api: web::Data<OrderFlowApi<A>>,
) -> Result<HttpResponse, ServerError> {
    let order_id = path.into_inner();
    info!("💻️ Rider #{} wants to accept order {order_id}", claims.sub);
    let order = api.accept_order(&order_id, claims.sub, &claims.name).await?;
    Ok(HttpResponse::Ok().json(order))
}

route!(start_delivery => Post "/deliveries/{order_id}/start" impl DeliveryDatabase where requires [Role::Rider]);
/// The assigned rider starts the delivery (`accepted → in_progress`).
pub async fn start_delivery<A: DeliveryDatabase>(
    claims: JwtClaims,
    path: web::Path<OrderId>,
    api: web::Data<OrderFlowApi<A>>,
) -> Result<HttpResponse, ServerError> {
    let order_id = path.into_inner();
    info!("💻️ Rider #{} starts delivery of order {order_id}", claims.sub);
    let order = api.start_delivery(&order_id, claims.sub).await?;
    Ok(HttpResponse::Ok().json(order))
}

route!(complete_delivery => Post "/deliveries/{order_id}/complete" impl DeliveryDatabase where requires [Role::Rider]);
/// The assigned rider completes the delivery (`in_progress → delivered`).
pub async fn complete_delivery<A: DeliveryDatabase>(
    claims: JwtClaims,
    path: web::Path<OrderId>,
    api: web::Data<OrderFlowApi<A>>,
) -> Result<HttpResponse, ServerError> {
    let order_id = path.into_inner();
    info!("💻️ Rider #{} completes delivery of order {order_id}", claims.sub);
    let order = api.complete_delivery(&order_id, claims.sub).await?;
    Ok(HttpResponse::Ok().json(order))
}

//----------------------------------------------   Chat  ----------------------------------------------------

/// The message history for an order's chat, oldest first.
///
/// Participants only; `ReadAll` admins bypass the participant check. In every case the chat only
/// exists once a rider has accepted the order.
pub async fn order_chat<A: ChatManagement + AccountManagement>(
    claims: JwtClaims,
    path: web::Path<OrderId>,
    api: web::Data<ChatApi<A>>,
) -> Result<HttpResponse, ServerError> {
    let order_id = path.into_inner();
    debug!("💻️ GET chat for order {order_id}");
    let messages = if claims.is_read_all() {
        api.fetch_open_order(&order_id).await?;
        api.messages_unchecked(&order_id).await?
    } else {
        api.messages_for_participant(&order_id, claims.sub, claims.kind).await?
    };
    Ok(HttpResponse::Ok().json(messages))
}

/// Post a message to an order's chat.
pub async fn send_chat_message<A: ChatManagement + AccountManagement>(
    claims: JwtClaims,
    path: web::Path<OrderId>,
    body: web::Json<SendMessageRequest>,
    api: web::Data<ChatApi<A>>,
) -> Result<HttpResponse, ServerError> {
    let order_id = path.into_inner();
    trace!("💻️ New chat message for order {order_id}");
    let message = api.send_message(&order_id, claims.sub, claims.kind, &claims.name, &body.message).await?;
    Ok(HttpResponse::Created().json(message))
}

/// Live message stream for an order's chat, as Server-Sent Events.
///
/// The same access rules as the history endpoint apply. The stream carries messages posted after
/// the subscription starts; clients merge it with a history snapshot to build the full timeline.
pub async fn chat_stream<A: ChatManagement + AccountManagement>(
    claims: JwtClaims,
    path: web::Path<OrderId>,
    api: web::Data<ChatApi<A>>,
    feed: web::Data<MessageFeed>,
) -> Result<HttpResponse, ServerError> {
    let order_id = path.into_inner();
    let order = api.fetch_open_order(&order_id).await?;
    if !claims.is_read_all() && !order.is_participant(claims.kind, claims.sub) {
        return Err(ServerError::Chat(fetchgo_engine::ChatApiError::NotAParticipant(order_id)));
    }
    debug!("💻️ Opening live chat stream for order {order_id}");
    Ok(HttpResponse::Ok()
        .content_type("text/event-stream")
        .insert_header(("Cache-Control", "no-cache"))
        .streaming(feed.sse_stream(order_id)))
}

//----------------------------------------------   Admin  ----------------------------------------------------

route!(orders_search => Get "/search/orders" impl AccountManagement where requires [Role::ReadAll]);
pub async fn orders_search<A: AccountManagement>(
    query: web::Query<OrderQueryFilter>,
    api: web::Data<AccountApi<A>>,
) -> Result<HttpResponse, ServerError> {
    debug!("💻️ GET orders search for [{query}]");
    let query = query.into_inner();
    let orders = api.search_orders(query).await?;
    Ok(HttpResponse::Ok().json(orders))
}

route!(update_roles => Post "/roles" impl AuthManagement where requires [Role::SuperAdmin]);
/// Grant or revoke the elevated roles (`read_all`, `super_admin`) on existing accounts.
pub async fn update_roles<A: AuthManagement>(
    api: web::Data<AuthApi<A>>,
    body: web::Json<Vec<RoleUpdateRequest>>,
) -> Result<HttpResponse, ServerError> {
    for request in body.into_inner() {
        if !request.grantable() {
            return Err(ServerError::InvalidRequestBody(
                "Only read_all and super_admin can be granted or revoked".to_string(),
            ));
        }
        debug!("💻️ POST update roles for {} #{}", request.kind, request.account_id);
        api.assign_roles(request.kind, request.account_id, &request.apply).await?;
        api.remove_roles(request.kind, request.account_id, &request.revoke).await?;
    }
    Ok(HttpResponse::Ok().finish())
}

//----------------------------------------------  Check Token  ----------------------------------------------------
pub async fn check_token(claims: JwtClaims) -> Result<HttpResponse, ServerError> {
    debug!("💻️ GET check_token for {} #{}", claims.kind, claims.sub);
    Ok(HttpResponse::Ok().body("Token is valid."))
}
