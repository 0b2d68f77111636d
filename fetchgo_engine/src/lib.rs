//! FetchGo Engine
//!
//! The engine holds everything about FetchGo that is not HTTP: the storage contracts, the SQLite
//! backend, the order lifecycle, the chat rules, and the event hooks.
//!
//! The library is divided into two main sections:
//! 1. Database management and control ([`mod@db`]). SQLite is the only supported backend right now.
//!    You should never need to access the database directly; use the public API instead. The
//!    exception is the data types used in the database, which are defined in the `db_types` module
//!    and are public.
//! 2. The engine public API ([`mod@fge_api`]). This provides the public-facing functionality:
//!    orders, authentication, chat and account queries. Backends implement the traits in
//!    [`mod@db`] to plug in underneath it.
//!
//! The engine also provides a set of events that can be subscribed to. These events are emitted
//! when certain actions occur, e.g. a rider accepting an order emits an `OrderStatusChangedEvent`.
//! A simple actor setup lets you hook into these events and perform custom actions. The server
//! uses it to feed the live chat stream.
mod db;

pub mod db_types;
pub mod events;
mod fge_api;

#[cfg(feature = "sqlite")]
pub use db::sqlite::SqliteDatabase;
pub use db::traits;
pub use db::traits::{
    AccountApiError,
    AccountManagement,
    AuthApiError,
    AuthManagement,
    ChatApiError,
    ChatManagement,
    DeliveryDatabase,
    OrderFlowError,
};
pub use fge_api::{
    accounts_api::AccountApi,
    auth_api::AuthApi,
    chat_api::ChatApi,
    chat_objects,
    order_flow_api::OrderFlowApi,
    order_objects,
};
