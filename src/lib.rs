pub mod app;
pub mod auth;
pub mod client;
pub mod config;
pub mod error;
pub mod geo;
pub mod locations;
pub mod routes;
pub mod state;
pub mod status;
