//! API constants

/// API base path prefix
pub const API_PREFIX: &str = "/api";

/// Header carrying the admin view key
pub const ADMIN_KEY_HEADER: &str = "x-admin-key";

/// Header carrying the Stripe webhook signature
pub const STRIPE_SIGNATURE_HEADER: &str = "stripe-signature";

/// Failed authentication attempts allowed per IP within the window
pub const AUTH_FAILURE_LIMIT: u32 = 10;

/// Auth failure window, in seconds
pub const AUTH_FAILURE_WINDOW_SECS: u64 = 900;

/// Bytes of random data in a pitch access token
pub const PITCH_TOKEN_BYTES: usize = 32;
