pub mod server;
pub mod storage;
pub mod identity;
pub mod service;
pub mod model;
pub mod config;
pub mod error;
