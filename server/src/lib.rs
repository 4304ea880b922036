//! Gate Pass API: ticket sales, recurring ticket plans and the admin back office.

pub mod auth;
pub mod config;
pub mod handlers;
pub mod models;
pub mod pricing;
pub mod repository;
pub mod routes;
pub mod state;
pub mod utils;

pub use routes::create_routes;
pub use state::AppState;
