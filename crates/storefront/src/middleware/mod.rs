//! HTTP middleware stack for the storefront.
//!
//! # Middleware Order (outermost first)
//!
//! 1. Sentry layers (capture errors, transactions)
//! 2. `TraceLayer` (request tracing)
//! 3. Request ID (add unique ID to each request)
//! 4. CORS (customer web app origin)
//! 5. Security headers
//! 6. Rate limiting on `/api` (governor, per client IP)

pub mod rate_limit;
pub mod request_id;
pub mod security_headers;

pub use rate_limit::api_rate_limiter;
pub use request_id::request_id_middleware;
pub use security_headers::security_headers_middleware;
