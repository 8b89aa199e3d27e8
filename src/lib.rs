pub mod config;
pub mod error;
pub mod routes;
pub mod toolchain;
pub mod web_server;
