use axum::http::HeaderValue;
use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use std::sync::Arc;

/// Script host RapiDoc is served from
const DOCS_SCRIPT_SOURCE: &str = "https://unpkg.com";

/// Security headers configuration
#[derive(Clone)]
pub struct SecurityHeadersConfig {
    /// Extra origins allowed in `connect-src` (the frontend)
    pub connect_origins: Vec<String>,
    pub is_production: bool,
}

impl SecurityHeadersConfig {
    pub fn new(connect_origins: Vec<String>, is_production: bool) -> Self {
        Self {
            connect_origins,
            is_production,
        }
    }

    /// Build Content-Security-Policy header value
    fn build_csp(&self) -> String {
        let mut connect_src = String::from("connect-src 'self'");
        for origin in &self.connect_origins {
            connect_src.push(' ');
            connect_src.push_str(origin);
        }

        [
            "default-src 'self'".to_string(),
            format!("script-src 'self' {}", DOCS_SCRIPT_SOURCE),
            "style-src 'self' 'unsafe-inline'".to_string(),
            "img-src 'self' data: https:".to_string(),
            "font-src 'self' data: https:".to_string(),
            connect_src,
            "frame-ancestors 'none'".to_string(),
        ]
        .join("; ")
    }
}

/// Security headers middleware
/// Adds security headers to all HTTP responses
pub async fn security_headers_middleware(
    State(config): State<Arc<SecurityHeadersConfig>>,
    request: Request,
    next: Next,
) -> Response {
    let mut response = next.run(request).await;

    let headers = response.headers_mut();

    headers.insert(
        "X-Content-Type-Options",
        HeaderValue::from_static("nosniff"),
    );
    headers.insert("X-Frame-Options", HeaderValue::from_static("DENY"));
    headers.insert(
        "Referrer-Policy",
        HeaderValue::from_static("strict-origin-when-cross-origin"),
    );

    // HSTS header (only set in production over HTTPS)
    if config.is_production {
        headers.insert(
            "Strict-Transport-Security",
            HeaderValue::from_static("max-age=31536000; includeSubDomains"),
        );
    }

    if let Ok(header_value) = HeaderValue::from_str(&config.build_csp()) {
        headers.insert("Content-Security-Policy", header_value);
    }

    headers.insert(
        "Permissions-Policy",
        HeaderValue::from_static("geolocation=(), microphone=(), camera=()"),
    );

    // Financial data: never cache, and never in shared caches.
    // Handlers serving downloads may set their own value first.
    if !headers.contains_key("Cache-Control") {
        headers.insert(
            "Cache-Control",
            HeaderValue::from_static("no-store, private"),
        );
    }

    response
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_csp_lists_connect_origins() {
        let config = SecurityHeadersConfig::new(vec!["https://app.timber.test".to_string()], false);
        let csp = config.build_csp();
        assert!(csp.contains("connect-src 'self' https://app.timber.test"));
        assert!(csp.contains("frame-ancestors 'none'"));
        assert!(csp.contains(DOCS_SCRIPT_SOURCE));
    }

    #[test]
    fn test_csp_without_origins() {
        let csp = SecurityHeadersConfig::new(Vec::new(), true).build_csp();
        assert!(csp.contains("connect-src 'self';"));
    }
}
