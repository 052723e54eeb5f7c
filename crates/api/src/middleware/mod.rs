//! HTTP middleware stack.
//!
//! # Middleware Order (bottom to top in Router)
//!
//! 1. `TraceLayer` (request tracing)
//! 2. Request ID (add unique ID to each request)
//! 3. Security headers
//! 4. CORS
//! 5. Admission control (generic tier, API routes only)
//!
//! The auth extractor is not a layer; protected handlers opt in via
//! [`RequireAuth`].

pub mod auth;
pub mod rate_limit;
pub mod request_id;
pub mod security_headers;

pub use auth::{CurrentUser, RequireAuth};
pub use rate_limit::{AdmissionControl, ClientIp, admission_middleware};
pub use request_id::request_id_middleware;
pub use security_headers::security_headers_middleware;
