//! Interface contracts for FetchGo storage backends.
//!
//! * [`DeliveryDatabase`] defines the order lifecycle: inserting orders and moving them through
//!   `pending → accepted → in_progress → delivered`, plus cancellation and expiry.
//! * [`AccountManagement`] provides the read side: profiles, order listings, and searches.
//! * [`AuthManagement`] covers signup, credential lookup, and role grants.
//! * [`ChatManagement`] stores and retrieves the per-order message stream.
//!
//! Backends implement these traits; everything above them (the `fge_api` layer and the server)
//! only ever talks to the traits.

mod account_management;
mod auth_management;
mod chat_management;
mod delivery_database;

pub use account_management::{AccountApiError, AccountManagement};
pub use auth_management::{AuthApiError, AuthManagement};
pub use chat_management::{ChatApiError, ChatManagement};
pub use delivery_database::{DeliveryDatabase, OrderFlowError};
