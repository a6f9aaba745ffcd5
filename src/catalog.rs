//! The fixed set of tables the gateway is allowed to touch.
//!
//! Every table or category name that arrives from a client is parsed into a
//! [`Table`] before anything is sent to the database. Names outside the
//! allow-list never reach SQL text, so the `format!`-built statements in
//! [`crate::store`] only ever interpolate the `&'static str` names below.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A catalog table: one of the eight part categories, or `builds`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Table {
    Cpus,
    Gpus,
    Motherboards,
    Ram,
    Psus,
    Cases,
    Ssds,
    Displays,
    Builds,
}

/// Error returned when a client-supplied name is not on the allow-list.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Invalid table name")]
pub struct UnknownTable(pub String);

impl Table {
    /// Every table, parts first.
    pub const ALL: [Table; 9] = [
        Table::Cpus,
        Table::Gpus,
        Table::Motherboards,
        Table::Ram,
        Table::Psus,
        Table::Cases,
        Table::Ssds,
        Table::Displays,
        Table::Builds,
    ];

    /// The eight hardware-category tables.
    pub const PARTS: [Table; 8] = [
        Table::Cpus,
        Table::Gpus,
        Table::Motherboards,
        Table::Ram,
        Table::Psus,
        Table::Cases,
        Table::Ssds,
        Table::Displays,
    ];

    /// SQL table name.
    pub const fn as_str(self) -> &'static str {
        match self {
            Table::Cpus => "cpus",
            Table::Gpus => "gpus",
            Table::Motherboards => "motherboards",
            Table::Ram => "ram",
            Table::Psus => "psus",
            Table::Cases => "cases",
            Table::Ssds => "ssds",
            Table::Displays => "displays",
            Table::Builds => "builds",
        }
    }

    /// Singular component name used by the compatibility routine.
    pub const fn component(self) -> &'static str {
        match self {
            Table::Cpus => "cpu",
            Table::Gpus => "gpu",
            Table::Motherboards => "motherboard",
            Table::Ram => "ram",
            Table::Psus => "psu",
            Table::Cases => "case",
            Table::Ssds => "ssd",
            Table::Displays => "display",
            Table::Builds => "build",
        }
    }

    /// Primary key column. Only `builds` deviates from `id`.
    pub const fn primary_key(self) -> &'static str {
        match self {
            Table::Builds => "build_id",
            _ => "id",
        }
    }

    pub const fn is_part(self) -> bool {
        !matches!(self, Table::Builds)
    }

    /// Parse a part table name; `builds` is rejected.
    pub fn parse_part(name: &str) -> Result<Table, UnknownTable> {
        let table = name.parse::<Table>()?;
        if table.is_part() {
            Ok(table)
        } else {
            Err(UnknownTable(name.to_string()))
        }
    }

    /// Parse a compatibility component name. Both the singular
    /// (`cpu`, `case`) and table (`cpus`, `cases`) spellings are accepted.
    pub fn parse_component(name: &str) -> Result<Table, UnknownTable> {
        Table::PARTS
            .into_iter()
            .find(|t| t.component() == name || t.as_str() == name)
            .ok_or_else(|| UnknownTable(name.to_string()))
    }
}

impl FromStr for Table {
    type Err = UnknownTable;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Table::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| UnknownTable(s.to_string()))
    }
}

impl fmt::Display for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// True when `name` is safe to splice into SQL as a bare column identifier:
/// non-empty, ASCII letters/digits/underscore, not starting with a digit,
/// and within MySQL's 64 character identifier limit.
pub fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    name.len() <= 64 && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}
