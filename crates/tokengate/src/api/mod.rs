//! HTTP API module.
//!
//! Login, an authenticated greeting and identity echo, and the admin user
//! listing.

mod error;
mod handlers;
mod routes;
mod state;

pub use error::{ApiError, ApiResult, ErrorResponse};
pub use handlers::{LoginRequest, LoginResponse};
pub use routes::create_router;
pub use state::AppState;
