//! Build-a-PC Gateway - HTTP/JSON API over the parts catalog database
//!
//! A thin dispatch layer: each endpoint parses its input, checks out one
//! database connection, runs one statement or stored routine, and returns the
//! rows as JSON. Compatibility rules, power estimation, search and statistics
//! are stored-routine logic and are not reimplemented here.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use server::ServerConfig;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = ServerConfig::load()?;
//!     server::start_server(config).await?;
//!     Ok(())
//! }
//! ```
//!
//! # API Endpoints
//!
//! ## Accounts
//!
//! - `POST /auth/login` - Log in with database credentials
//! - `POST /auth/signup` - Self-service account creation
//! - `POST /users/create` - Admin-created account
//!
//! ## Catalog
//!
//! - `GET /fetch/{table}` - Paginated table read
//! - `GET /fetch/{table}/{id}` - Single row
//! - `POST /admin/{table}` - Insert a part
//! - `PUT /admin/{table}/{id}` - Update a part
//! - `DELETE /admin/{table}/{id}` - Delete a part
//! - `PATCH /admin/{table}/{id}/{column}` - Update one attribute
//!
//! ## Builds
//!
//! - `POST /builds`, `GET|PUT|DELETE /builds/{id}`
//! - `GET /builds/details/all`, `GET /builds/analytics/high-power`
//! - `GET /power/{id}` - Recompute the power estimate
//!
//! ## Queries
//!
//! - `GET /compatibility/{comp1}/{id1}/{comp2}/{id2}`
//! - `GET /parts/counts`, `GET /compare/{category}/{ids}`
//! - `GET /search/{category}`, `GET /find/{term}`
//! - `POST /parts/compatible/{category}`, `POST /psus/compatibility`
//!
//! ## Service
//!
//! - `GET /`, `GET /health`, `GET /ready`, `GET /metrics`

pub mod config;
pub mod error;
pub mod extract;
pub mod middleware;
pub mod routes;
pub mod server;
pub mod state;

pub use config::ServerConfig;
pub use error::{ServerError, ServerResult};
pub use server::{build_router, start_server};
pub use state::ServerState;
