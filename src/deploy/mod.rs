//! Deployment trigger pipeline.
//!
//! A GitHub push webhook (or an authenticated manual request) starts the
//! configured command list through [`DeployRunner`]. Only one pipeline runs
//! at a time; progress lands in per-day files managed by [`DeployLog`].

pub mod log;
pub mod runner;
pub mod webhook;

pub use log::{DeployLog, LogFile, LATEST_LINES};
pub use runner::DeployRunner;
pub use webhook::{verify_signature, PushEvent};
