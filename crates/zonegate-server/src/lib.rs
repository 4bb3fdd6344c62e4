//! Zonegate Server
//!
//! HTTP boundary of the zone access engine. A reverse proxy sends every
//! request for a protected location to `GET /` as an auth subrequest and
//! lets it through, redirects it to the login page, or rejects it depending
//! on the answer.

pub mod config;
pub mod error;
pub mod routes;
pub mod server;

pub use config::ServerConfig;
pub use error::Error;
pub use server::{router, serve, AppState, Gateway};
