//! HTTP header name constants and security header weights.
//!
//! Header names are compared case-insensitively; response headers are
//! lowercased when a page is fetched.

/// Content Security Policy header
pub const HEADER_CONTENT_SECURITY_POLICY: &str = "Content-Security-Policy";
/// HTTP Strict Transport Security header
pub const HEADER_STRICT_TRANSPORT_SECURITY: &str = "Strict-Transport-Security";
/// X-Content-Type-Options header
pub const HEADER_X_CONTENT_TYPE_OPTIONS: &str = "X-Content-Type-Options";
/// X-Frame-Options header
pub const HEADER_X_FRAME_OPTIONS: &str = "X-Frame-Options";
/// X-XSS-Protection header
pub const HEADER_X_XSS_PROTECTION: &str = "X-XSS-Protection";
/// Referrer-Policy header
pub const HEADER_REFERRER_POLICY: &str = "Referrer-Policy";
/// Permissions-Policy header
pub const HEADER_PERMISSIONS_POLICY: &str = "Permissions-Policy";

/// Security headers checked by the security-headers collector, with the
/// number of points each one contributes to its 0-100 score.
///
/// The weights sum to 100.
pub const SECURITY_HEADERS: &[(&str, u32)] = &[
    (HEADER_CONTENT_SECURITY_POLICY, 25),
    (HEADER_STRICT_TRANSPORT_SECURITY, 25),
    (HEADER_X_CONTENT_TYPE_OPTIONS, 15),
    (HEADER_X_FRAME_OPTIONS, 15),
    (HEADER_REFERRER_POLICY, 10),
    (HEADER_PERMISSIONS_POLICY, 5),
    (HEADER_X_XSS_PROTECTION, 5),
];

/// Cache-Control header (performance collector)
pub const HEADER_CACHE_CONTROL: &str = "cache-control";
/// Set-Cookie header (technology detection)
pub const HEADER_SET_COOKIE: &str = "set-cookie";
