//! Web API module for spacehub.
//!
//! REST API for uploading and browsing coursework submissions, plus the
//! administrator surface (stats, deletion, deploy trigger) and the GitHub
//! webhook endpoint.

pub mod dto;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod router;
pub mod server;

pub use error::ApiError;
pub use router::create_router;
pub use server::WebServer;
