//! API Module
//!
//! HTTP handlers and routing exposing the instrumented cache and page cache.
//!
//! # Endpoints
//! - `POST /store` - Store a value under a generated key
//! - `GET /retrieve/:key` - Retrieve a value
//! - `GET /page?url=` - Fetch a page through the TTL cache
//! - `GET /page/count?url=` - Access count for a URL
//! - `GET /calls/:method` - Instrumentation for a method
//! - `GET /health` - Health check endpoint

pub mod handlers;
pub mod routes;

pub use handlers::*;
pub use routes::create_router;
