pub mod auth;
pub mod chirps;
pub mod config;
pub mod error;
pub mod filter;
pub mod middleware;
pub mod password;
pub mod revocation;
pub mod routes;
pub mod service;
pub mod tokens;
pub mod users;
pub mod webhooks;
