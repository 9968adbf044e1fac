//! IP address extraction utilities
//!
//! Two views of the client address:
//!
//! - [`extract_client_ip`] reports the first valid `X-Forwarded-For` entry, then
//!   `X-Real-IP`, then the socket. Clients can forge it; it is only recorded on
//!   analytics events.
//! - [`trusted_client_ip`] only reads the part of the `X-Forwarded-For` chain
//!   written by the configured number of trusted proxies. Auth throttling keys
//!   on this one.

use axum::extract::ConnectInfo;
use axum::http::{HeaderMap, Request};
use std::net::{IpAddr, SocketAddr};

/// Extract and validate client IP from request headers
///
/// # Returns
/// Validated client IP address as a string, or "unknown" if extraction fails
pub fn extract_client_ip(headers: &HeaderMap, socket_addr: Option<&SocketAddr>) -> String {
    if let Some(forwarded_for) = headers
        .get("x-forwarded-for")
        .and_then(|h| h.to_str().ok())
    {
        if let Some(ip) = first_forwarded_ip(forwarded_for) {
            return ip;
        }
    }

    // Single IP, set by some proxies
    if let Some(real_ip) = headers.get("x-real-ip").and_then(|h| h.to_str().ok()) {
        let trimmed = real_ip.trim();
        if is_valid_ip(trimmed) {
            return trimmed.to_string();
        }
    }

    if let Some(addr) = socket_addr {
        return addr.ip().to_string();
    }

    "unknown".to_string()
}

/// Client IP for a full request, using `ConnectInfo` when the server provides it
pub fn client_ip_from_request<B>(request: &Request<B>) -> String {
    let socket = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| *addr);
    extract_client_ip(request.headers(), socket.as_ref())
}

/// Client IP that cannot be chosen by the client
///
/// Each trusted proxy appends the address it received the request from, so the
/// client is the `trusted_proxy_count`-th entry from the right. Entries to the
/// left of it were supplied by the client and are ignored. With no trusted
/// proxies, or a chain shorter than expected, the socket address is used.
pub fn trusted_client_ip(
    headers: &HeaderMap,
    socket_addr: Option<&SocketAddr>,
    trusted_proxy_count: usize,
) -> String {
    if trusted_proxy_count > 0 {
        if let Some(ip) = headers
            .get("x-forwarded-for")
            .and_then(|h| h.to_str().ok())
            .and_then(|value| forwarded_ip_from_right(value, trusted_proxy_count))
        {
            return ip;
        }
    }

    socket_addr
        .map(|addr| addr.ip().to_string())
        .unwrap_or_else(|| "unknown".to_string())
}

pub fn trusted_client_ip_from_request<B>(
    request: &Request<B>,
    trusted_proxy_count: usize,
) -> String {
    let socket = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| *addr);
    trusted_client_ip(request.headers(), socket.as_ref(), trusted_proxy_count)
}

fn forwarded_ip_from_right(header_value: &str, position: usize) -> Option<String> {
    let ips: Vec<&str> = header_value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect();

    let index = ips.len().checked_sub(position)?;
    let candidate = ips.get(index)?;
    is_valid_ip(candidate).then(|| candidate.to_string())
}

/// First syntactically valid address in an `X-Forwarded-For` chain
fn first_forwarded_ip(header_value: &str) -> Option<String> {
    header_value
        .split(',')
        .map(str::trim)
        .find(|candidate| is_valid_ip(candidate))
        .map(String::from)
}

/// Validate that a string is a valid IP address
///
/// Checks both IPv4 and IPv6 formats
fn is_valid_ip(ip_str: &str) -> bool {
    ip_str.parse::<IpAddr>().is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn create_headers_with_xff(xff_value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert("x-forwarded-for", HeaderValue::from_str(xff_value).unwrap());
        headers
    }

    #[test]
    fn test_first_forwarded_entry_wins() {
        let headers = create_headers_with_xff("203.0.113.7, 10.0.0.1, 10.0.0.2");
        assert_eq!(extract_client_ip(&headers, None), "203.0.113.7");
    }

    #[test]
    fn test_invalid_forwarded_entries_are_skipped() {
        let headers = create_headers_with_xff("garbage, , 198.51.100.4");
        assert_eq!(extract_client_ip(&headers, None), "198.51.100.4");
    }

    #[test]
    fn test_real_ip_used_when_forwarded_for_is_unusable() {
        let mut headers = create_headers_with_xff("not.an.ip");
        headers.insert("x-real-ip", HeaderValue::from_static(" 192.0.2.9 "));
        assert_eq!(extract_client_ip(&headers, None), "192.0.2.9");
    }

    #[test]
    fn test_extract_client_ip_fallback_to_socket() {
        let headers = HeaderMap::new();
        let socket = SocketAddr::from(([127, 0, 0, 1], 8080));
        assert_eq!(extract_client_ip(&headers, Some(&socket)), "127.0.0.1");
    }

    #[test]
    fn test_extract_client_ip_fallback_to_unknown() {
        assert_eq!(extract_client_ip(&HeaderMap::new(), None), "unknown");
    }

    #[test]
    fn test_connect_info_is_read_from_request() {
        let mut request = Request::builder().body(()).unwrap();
        request
            .extensions_mut()
            .insert(ConnectInfo(SocketAddr::from(([10, 1, 2, 3], 5000))));
        assert_eq!(client_ip_from_request(&request), "10.1.2.3");
    }

    #[test]
    fn test_trusted_ip_ignores_client_supplied_entries() {
        // client forged "1.1.1.1", the edge proxy appended the real peer
        let headers = create_headers_with_xff("1.1.1.1, 203.0.113.7");
        assert_eq!(trusted_client_ip(&headers, None, 1), "203.0.113.7");

        let headers = create_headers_with_xff("1.1.1.1, 203.0.113.7, 10.0.0.1");
        assert_eq!(trusted_client_ip(&headers, None, 2), "203.0.113.7");
    }

    #[test]
    fn test_trusted_ip_without_proxies_uses_socket() {
        let headers = create_headers_with_xff("198.51.100.4");
        let socket = SocketAddr::from(([192, 0, 2, 1], 443));
        assert_eq!(trusted_client_ip(&headers, Some(&socket), 0), "192.0.2.1");
        assert_eq!(trusted_client_ip(&headers, None, 0), "unknown");
    }

    #[test]
    fn test_trusted_ip_short_or_invalid_chain_uses_socket() {
        let socket = SocketAddr::from(([192, 0, 2, 1], 443));
        let headers = create_headers_with_xff("198.51.100.4");
        assert_eq!(trusted_client_ip(&headers, Some(&socket), 2), "192.0.2.1");

        let headers = create_headers_with_xff("198.51.100.4, garbage");
        assert_eq!(trusted_client_ip(&headers, Some(&socket), 1), "192.0.2.1");
    }

    #[test]
    fn test_trusted_ip_reads_connect_info() {
        let mut request = Request::builder()
            .header("x-forwarded-for", "198.51.100.4")
            .body(())
            .unwrap();
        request
            .extensions_mut()
            .insert(ConnectInfo(SocketAddr::from(([10, 1, 2, 3], 5000))));
        assert_eq!(trusted_client_ip_from_request(&request, 0), "10.1.2.3");
        assert_eq!(client_ip_from_request(&request), "198.51.100.4");
    }

    #[test]
    fn test_is_valid_ip() {
        assert!(is_valid_ip("192.168.1.1"));
        assert!(is_valid_ip("::1"));
        assert!(!is_valid_ip("not.an.ip"));
        assert!(!is_valid_ip(""));
        assert!(!is_valid_ip("999.999.999.999"));
    }
}
