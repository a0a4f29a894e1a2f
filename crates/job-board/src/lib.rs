pub mod access;
pub mod api;
pub mod board;
pub mod config;
pub mod error;
pub mod http;
pub mod identity;
pub mod session;
pub mod store;
pub mod talent;
pub mod telemetry;
pub mod unlock;
