//! Employee directory API: the routing layer over the in-memory store, with
//! simulated network conditions.

pub mod config;
mod employees;
pub mod http;
pub mod network;

pub use config::{AppConfig, NetworkConfig};
pub use employees::JsonBody;
pub use http::{AppState, ServeConfig, build_router, route_table, serve, serve_on};
pub use network::NetworkSimulator;
