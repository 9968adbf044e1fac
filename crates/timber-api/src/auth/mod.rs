//! Bearer-token authentication and the admin-key gate

pub mod jwt;
pub mod middleware;
pub mod models;

pub use middleware::{
    admin_key_middleware, auth_middleware, AdminKeyState, AuthFailureLimiter, AuthState,
};
pub use models::{JwtClaims, UserContext};
