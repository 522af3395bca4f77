//! Data Models Module
//!
//! Request and response DTOs for the cache service API.

pub mod requests;
pub mod responses;

pub use requests::SetRequest;
pub use responses::{
    ClearAllResponse, ClearModuleResponse, DeleteResponse, ErrorResponse, GetResponse,
    HealthResponse, SetResponse, StatsResponse, SweepResponse,
};
