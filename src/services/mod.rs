pub mod api;
pub mod auth;
pub mod progress;
pub mod query;
pub mod storage;
