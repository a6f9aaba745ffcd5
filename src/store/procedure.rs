//! Stored-routine dispatch.
//!
//! Routines are black boxes: they are called by name with positional
//! arguments and every result set they produce is collected. Callers pick
//! the set they care about with [`ResultSets::first`] / [`ResultSets::last`].

use super::row::to_record;
use super::value::{SqlValue, bind_all, placeholders};
use crate::error::StoreResult;
use crate::models::Record;
use futures::TryStreamExt;
use sqlx::mysql::MySqlConnection;
use sqlx::{Either, Executor};

/// Stored procedures the gateway invokes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Procedure {
    CreateNormalUser,
    GetBuildDetails,
    GetBuildSummary,
    GetHighPowerBuilds,
    GetPartCounts,
    EstimatePower,
    ComparePartsById,
    SearchParts,
    FindComponentByName,
    UpdateBuild,
    DeleteBuild,
    GetCompatibleParts,
    AdminUpdateAttribute,
    GetCompatiblePsus,
}

/// Scalar compatibility function, invoked with `SELECT` rather than `CALL`.
pub const CHECK_COMPATIBILITY_FN: &str = "check_compatibility_fnn";

impl Procedure {
    pub const fn name(self) -> &'static str {
        match self {
            Procedure::CreateNormalUser => "create_normal_user",
            Procedure::GetBuildDetails => "get_build_details",
            Procedure::GetBuildSummary => "get_build_summary",
            Procedure::GetHighPowerBuilds => "get_high_power_builds",
            Procedure::GetPartCounts => "get_part_counts",
            Procedure::EstimatePower => "estimate_power",
            Procedure::ComparePartsById => "compare_parts_by_id",
            Procedure::SearchParts => "search_parts",
            Procedure::FindComponentByName => "find_component_by_name",
            Procedure::UpdateBuild => "update_build",
            Procedure::DeleteBuild => "delete_build",
            Procedure::GetCompatibleParts => "get_compatible_parts",
            Procedure::AdminUpdateAttribute => "admin_update_attribute",
            Procedure::GetCompatiblePsus => "get_compatible_psus",
        }
    }

    /// `CALL name(?, ?, ...)` for `arity` arguments.
    pub fn call_sql(self, arity: usize) -> String {
        format!("CALL {}({})", self.name(), placeholders(arity))
    }
}

/// Rows of every non-empty result set a routine produced, in order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResultSets(Vec<Vec<Record>>);

impl ResultSets {
    pub fn new(sets: Vec<Vec<Record>>) -> Self {
        Self(sets)
    }

    /// Rows of the first result set, or nothing.
    pub fn first(self) -> Vec<Record> {
        self.0.into_iter().next().unwrap_or_default()
    }

    /// Rows of the last result set, or nothing.
    pub fn last(self) -> Vec<Record> {
        self.0.into_iter().last().unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Invoke `procedure` and drain every result set it returns.
///
/// The driver reports the end of each result set (and the final status of
/// the `CALL` itself) as a query result; rows in between belong to one set.
pub async fn call(
    conn: &mut MySqlConnection,
    procedure: Procedure,
    args: &[SqlValue],
) -> StoreResult<ResultSets> {
    let sql = procedure.call_sql(args.len());
    tracing::debug!(procedure = procedure.name(), args = args.len(), "calling routine");

    let query = bind_all(sqlx::query(&sql), args);
    let mut stream = conn.fetch_many(query);

    let mut sets = Vec::new();
    let mut current = Vec::new();
    while let Some(step) = stream.try_next().await? {
        match step {
            Either::Left(_) => {
                if !current.is_empty() {
                    sets.push(std::mem::take(&mut current));
                }
            }
            Either::Right(row) => current.push(to_record(&row)?),
        }
    }
    if !current.is_empty() {
        sets.push(current);
    }

    Ok(ResultSets::new(sets))
}

/// Evaluate `check_compatibility_fnn(comp1, id1, comp2, id2)`.
pub async fn check_compatibility(
    conn: &mut MySqlConnection,
    comp1: &str,
    id1: i64,
    comp2: &str,
    id2: i64,
) -> StoreResult<serde_json::Value> {
    let sql = format!("SELECT {CHECK_COMPATIBILITY_FN}(?, ?, ?, ?) AS compatibility");
    let row = sqlx::query(&sql)
        .bind(comp1)
        .bind(id1)
        .bind(comp2)
        .bind(id2)
        .fetch_one(&mut *conn)
        .await?;
    let mut record = to_record(&row)?;
    Ok(record
        .remove("compatibility")
        .unwrap_or(serde_json::Value::Null))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(id: i64) -> Record {
        let mut r = Record::new();
        r.insert("id".into(), json!(id));
        r
    }

    #[test]
    fn call_sql_shapes() {
        assert_eq!(Procedure::GetBuildDetails.call_sql(0), "CALL get_build_details()");
        assert_eq!(
            Procedure::SearchParts.call_sql(4),
            "CALL search_parts(?, ?, ?, ?)"
        );
        assert_eq!(
            Procedure::UpdateBuild.call_sql(10),
            "CALL update_build(?, ?, ?, ?, ?, ?, ?, ?, ?, ?)"
        );
    }

    #[test]
    fn first_and_last_result_sets() {
        let sets = ResultSets::new(vec![vec![record(1)], vec![record(2), record(3)]]);
        assert_eq!(sets.len(), 2);
        assert_eq!(sets.clone().first(), vec![record(1)]);
        assert_eq!(sets.last(), vec![record(2), record(3)]);
    }

    #[test]
    fn no_result_sets_yield_no_rows() {
        let sets = ResultSets::default();
        assert!(sets.is_empty());
        assert!(sets.clone().first().is_empty());
        assert!(sets.last().is_empty());
    }
}
