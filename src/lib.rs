//! spacehub - Coursework submission sharing service
//!
//! Students upload a program executable plus its documentation; classmates
//! browse and download the submissions; an administrator inspects statistics,
//! removes submissions, and triggers redeployments through a GitHub webhook.

pub mod auth;
pub mod config;
pub mod datetime;
pub mod deploy;
pub mod error;
pub mod logging;
pub mod submission;
pub mod web;

pub use auth::{
    hash_password, validate_password, verify_password, PasswordError, MAX_PASSWORD_LENGTH,
    MIN_PASSWORD_LENGTH,
};
pub use config::Config;
pub use deploy::{DeployLog, DeployRunner};
pub use error::{Result, SpacehubError};
pub use submission::{
    FileSet, MetadataStore, NewSubmission, StoreStats, SubmissionService, UploadRecord,
    UploadedFile,
};
pub use web::WebServer;
