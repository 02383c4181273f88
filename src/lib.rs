pub mod auth;
pub mod config;
pub mod error;
pub mod facade;
pub mod middleware;
pub mod query;
pub mod record;
pub mod server;
pub mod store;
