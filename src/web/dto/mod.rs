//! Data transfer objects for the web API.

pub mod request;
pub mod response;

pub use request::{DeployRequest, LoginRequest};
pub use response::{
    DeleteResponse, DeployAck, HealthResponse, LatestLogsResponse, LoginResponse, UploadResponse,
    UserInfo,
};
