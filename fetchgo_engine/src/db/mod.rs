//! Storage backends for the FetchGo engine.
//!
//! The [`traits`] module defines the interface contracts a backend must satisfy; [`sqlite`] is the
//! only backend currently shipped.

#[cfg(feature = "sqlite")]
pub mod sqlite;
pub mod traits;
