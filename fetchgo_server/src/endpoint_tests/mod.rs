mod auth;
mod chat;
mod helpers;
mod mocks;
mod orders;
