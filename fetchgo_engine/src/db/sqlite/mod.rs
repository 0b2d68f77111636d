//! SQLite database module for the FetchGo engine.

mod sqlite_impl;

pub mod db;
pub use sqlite_impl::SqliteDatabase;
