//! Request and response shapes mirroring database rows.

use crate::catalog::Table;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A database row rendered as a JSON object keyed by column name.
pub type Record = Map<String, Value>;

/// New build: a name plus up to eight nullable part references.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BuildCreate {
    pub build_name: String,
    #[serde(default)]
    pub cpu_id: Option<i64>,
    #[serde(default)]
    pub gpu_id: Option<i64>,
    #[serde(default)]
    pub motherboard_id: Option<i64>,
    #[serde(default)]
    pub ram_id: Option<i64>,
    #[serde(default)]
    pub psu_id: Option<i64>,
    #[serde(default)]
    pub case_id: Option<i64>,
    #[serde(default)]
    pub ssd_id: Option<i64>,
    #[serde(default)]
    pub display_id: Option<i64>,
}

/// Partial build update. Absent fields are passed to the store as NULL and
/// left untouched by `update_build`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BuildUpdate {
    pub build_name: Option<String>,
    pub cpu_id: Option<i64>,
    pub gpu_id: Option<i64>,
    pub motherboard_id: Option<i64>,
    pub ram_id: Option<i64>,
    pub psu_id: Option<i64>,
    pub case_id: Option<i64>,
    pub ssd_id: Option<i64>,
    pub display_id: Option<i64>,
}

/// Selections of an in-progress build, used only to ask the store which
/// parts of a category fit. Never persisted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BuildState {
    pub cpu_id: Option<i64>,
    pub motherboard_id: Option<i64>,
    pub ram_id: Option<i64>,
    pub gpu_id: Option<i64>,
    pub case_id: Option<i64>,
    pub psu_id: Option<i64>,
}

/// Page/limit pair after validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub page: i64,
    pub limit: i64,
}

/// Error for a page or limit below one.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PaginationError {
    #[error("page must be at least 1")]
    Page,
    #[error("limit must be at least 1")]
    Limit,
}

impl Pagination {
    pub const DEFAULT_PAGE: i64 = 1;
    pub const DEFAULT_LIMIT: i64 = 100;

    pub fn new(page: Option<i64>, limit: Option<i64>) -> Result<Self, PaginationError> {
        let page = page.unwrap_or(Self::DEFAULT_PAGE);
        let limit = limit.unwrap_or(Self::DEFAULT_LIMIT);
        if page < 1 {
            return Err(PaginationError::Page);
        }
        if limit < 1 {
            return Err(PaginationError::Limit);
        }
        Ok(Self { page, limit })
    }

    pub fn offset(&self) -> i64 {
        (self.page - 1).saturating_mul(self.limit)
    }

    /// Ceiling division of `total_count` by the page size.
    pub fn total_pages(&self, total_count: i64) -> i64 {
        total_count / self.limit + i64::from(total_count % self.limit != 0)
    }
}

/// One page of rows from a catalog table plus navigation metadata.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Page {
    pub table: Table,
    pub data: Vec<Record>,
    pub page: i64,
    pub limit: i64,
    pub total_count: i64,
    pub total_pages: i64,
    pub has_next: bool,
    pub has_prev: bool,
}

impl Page {
    pub fn new(table: Table, pagination: Pagination, total_count: i64, data: Vec<Record>) -> Self {
        let total_pages = pagination.total_pages(total_count);
        Self {
            table,
            data,
            page: pagination.page,
            limit: pagination.limit,
            total_count,
            total_pages,
            has_next: pagination.page < total_pages,
            has_prev: pagination.page > 1,
        }
    }
}

/// Build row as re-read after a power estimate.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PowerEstimate {
    pub build_id: Value,
    pub build_name: Value,
    pub total_power_estimate: Value,
}
