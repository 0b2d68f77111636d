pub mod accounts_api;
pub mod auth_api;
pub mod chat_api;
pub mod chat_objects;
pub mod order_flow_api;
pub mod order_objects;
