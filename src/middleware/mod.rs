pub mod hmac_auth;
pub mod response;

pub use hmac_auth::{hmac_auth_middleware, AuthenticatedBody};
pub use response::{ApiResponse, ApiResult};
