use crate::auth::jwt::validate_token;
use crate::auth::models::UserContext;
use crate::constants::ADMIN_KEY_HEADER;
use crate::error::HttpAppError;
use crate::utils::ip_extraction::trusted_client_ip_from_request;
use axum::{
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use subtle::ConstantTimeEq;
use timber_core::AppError;
use timber_db::UserRepository;
use tokio::sync::Mutex;

/// Failed auth attempts per client IP within a fixed window
#[derive(Clone)]
pub struct AuthFailureLimiter {
    inner: Arc<Mutex<HashMap<String, (u32, Instant)>>>,
    max_failures: u32,
    window: Duration,
}

impl AuthFailureLimiter {
    pub fn new(max_failures: u32, window_seconds: u64) -> Self {
        Self {
            inner: Arc::new(Mutex::new(HashMap::new())),
            max_failures,
            window: Duration::from_secs(window_seconds),
        }
    }

    pub async fn record_failure(&self, ip: &str) -> bool {
        let mut guard = self.inner.lock().await;
        let now = Instant::now();
        guard.retain(|_, (_, reset_at)| now < *reset_at);
        let (count, reset_at) = guard.entry(ip.to_string()).or_insert((0, now + self.window));
        if now >= *reset_at {
            *count = 0;
            *reset_at = now + self.window;
        }
        *count += 1;
        *count >= self.max_failures
    }

    pub async fn is_blocked(&self, ip: &str) -> bool {
        let mut guard = self.inner.lock().await;
        if let Some((count, reset_at)) = guard.get(ip) {
            if Instant::now() >= *reset_at {
                guard.remove(ip);
                return false;
            }
            return *count >= self.max_failures;
        }
        false
    }

    pub async fn tracked_clients(&self) -> usize {
        self.inner.lock().await.len()
    }
}

#[derive(Clone)]
pub struct AuthState {
    pub jwt_secret: String,
    pub users: UserRepository,
    pub auth_failure_limiter: Option<Arc<AuthFailureLimiter>>,
    pub trusted_proxy_count: usize,
}

/// State for the admin-key gate; `None` rejects every request
#[derive(Clone)]
pub struct AdminKeyState {
    pub admin_view_key: Option<String>,
    pub auth_failure_limiter: Option<Arc<AuthFailureLimiter>>,
    pub trusted_proxy_count: usize,
}

pub(crate) fn secure_compare(a: &str, b: &str) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.as_bytes().ct_eq(b.as_bytes()).into()
}

fn too_many_attempts() -> Response {
    (StatusCode::TOO_MANY_REQUESTS, "Too many failed auth attempts").into_response()
}

/// Record a failure and build the rejection (429 once the limit is reached)
async fn reject(
    limiter: Option<&Arc<AuthFailureLimiter>>,
    client_ip: &str,
    reason: &str,
) -> Response {
    if let Some(limiter) = limiter {
        if limiter.record_failure(client_ip).await {
            return too_many_attempts();
        }
    }
    tracing::debug!(client_ip = %client_ip, reason = reason, "Authentication failed");
    HttpAppError(AppError::Unauthorized(reason.to_string())).into_response()
}

pub async fn auth_middleware(
    State(auth_state): State<Arc<AuthState>>,
    mut request: Request,
    next: Next,
) -> Response {
    let client_ip = trusted_client_ip_from_request(&request, auth_state.trusted_proxy_count);
    let limiter = auth_state.auth_failure_limiter.as_ref();
    if let Some(limiter) = limiter {
        if limiter.is_blocked(&client_ip).await {
            return too_many_attempts();
        }
    }

    let auth_header = match request
        .headers()
        .get("Authorization")
        .and_then(|h| h.to_str().ok())
    {
        Some(h) => h,
        None => return reject(limiter, &client_ip, "Missing authorization header").await,
    };

    let Some(token) = auth_header.strip_prefix("Bearer ") else {
        return reject(limiter, &client_ip, "Invalid authorization header format").await;
    };

    let claims = match validate_token(token.trim(), &auth_state.jwt_secret) {
        Ok(claims) => claims,
        Err(e) => return reject(limiter, &client_ip, &e.to_string()).await,
    };

    let user = match auth_state
        .users
        .upsert(&claims.sub, claims.email.as_deref())
        .await
    {
        Ok(user) => user,
        Err(e) => return HttpAppError(e).into_response(),
    };

    tracing::debug!(user_id = %user.id, plan = %user.subscription_plan, "Authenticated request");
    request.extensions_mut().insert(UserContext::from(&user));
    next.run(request).await
}

/// Gate for admin-only routes: `x-admin-key` must equal `ADMIN_VIEW_KEY`
pub async fn admin_key_middleware(
    State(admin_state): State<Arc<AdminKeyState>>,
    request: Request,
    next: Next,
) -> Response {
    let client_ip = trusted_client_ip_from_request(&request, admin_state.trusted_proxy_count);
    let limiter = admin_state.auth_failure_limiter.as_ref();
    if let Some(limiter) = limiter {
        if limiter.is_blocked(&client_ip).await {
            return too_many_attempts();
        }
    }

    let Some(expected) = admin_state.admin_view_key.as_deref() else {
        return HttpAppError(AppError::Unauthorized(
            "Admin access is not configured".to_string(),
        ))
        .into_response();
    };

    let provided = request
        .headers()
        .get(ADMIN_KEY_HEADER)
        .and_then(|h| h.to_str().ok())
        .unwrap_or_default();

    if provided.is_empty() || !secure_compare(provided, expected) {
        return reject(limiter, &client_ip, "Invalid admin key").await;
    }

    next.run(request).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_secure_compare() {
        assert!(secure_compare("admin-key", "admin-key"));
        assert!(!secure_compare("admin-key", "admin-kez"));
        assert!(!secure_compare("admin", "admin-key"));
        assert!(!secure_compare("", "admin-key"));
    }

    #[tokio::test]
    async fn test_limiter_blocks_after_max_failures() {
        let limiter = AuthFailureLimiter::new(3, 900);
        assert!(!limiter.record_failure("1.2.3.4").await);
        assert!(!limiter.record_failure("1.2.3.4").await);
        assert!(!limiter.is_blocked("1.2.3.4").await);
        assert!(limiter.record_failure("1.2.3.4").await);
        assert!(limiter.is_blocked("1.2.3.4").await);
        assert!(!limiter.is_blocked("5.6.7.8").await);
    }

    #[tokio::test]
    async fn test_limiter_window_expires() {
        let limiter = AuthFailureLimiter::new(1, 0);
        assert!(limiter.record_failure("1.2.3.4").await);
        assert!(!limiter.is_blocked("1.2.3.4").await);
    }

    #[tokio::test]
    async fn test_limiter_prunes_expired_clients() {
        let limiter = AuthFailureLimiter::new(5, 0);
        for i in 0..50 {
            limiter.record_failure(&format!("10.0.0.{}", i)).await;
        }
        // Every earlier entry expired immediately and was dropped
        assert_eq!(limiter.tracked_clients().await, 1);
    }
}
