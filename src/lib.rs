//! Data access for the Build-a-PC catalog.
//!
//! This crate is the database side of the gateway: it knows which tables a
//! client may name, how to turn request shapes into bound statements or
//! stored-routine calls, and how to turn whatever rows come back into JSON.
//! Compatibility rules, power estimation, search and comparison all live in
//! the database's stored routines; nothing here reimplements them.
//!
//! - [`catalog`]: the table allow-list and identifier checks
//! - [`models`]: request/response shapes and pagination
//! - [`store`]: connections, routine dispatch, table statements
//! - [`config`]: connection settings
//! - [`error`]: store error classification
//!
//! The HTTP surface lives in the `server` crate under `crates/server`.

pub mod catalog;
pub mod config;
pub mod error;
pub mod models;
pub mod store;

pub use catalog::{Table, UnknownTable, is_identifier};
pub use config::DatabaseConfig;
pub use error::{StoreError, StoreResult};
pub use models::{
    BuildCreate, BuildState, BuildUpdate, Page, Pagination, PaginationError, PowerEstimate, Record,
};
pub use store::{Assignments, Procedure, ResultSets, SqlValue, Store};
