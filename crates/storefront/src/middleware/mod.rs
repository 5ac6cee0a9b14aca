//! HTTP middleware stack for storefront.
//!
//! # Middleware Order (bottom to top in Router)
//!
//! 1. Sentry layer (capture errors)
//! 2. `TraceLayer` (request tracing, opens the `request` span)
//! 3. Request ID (add unique ID to each request)
//! 4. Session layer (tower-sessions with `PostgreSQL` store)
//!
//! The signed-in user is resolved per handler by the [`RequireUser`]
//! extractor rather than a layer, so unauthenticated routes pay nothing.

pub mod auth;
pub mod request_id;
pub mod session;

pub use auth::RequireUser;
pub use request_id::{make_request_span, request_id_middleware};
pub use session::create_session_layer;
