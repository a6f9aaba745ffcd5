//! Rendering of untyped result rows as JSON objects.
//!
//! The routines behind the gateway return whatever columns they like, so
//! rows are decoded column by column from the reported SQL type.

use crate::models::Record;
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde_json::{Number, Value};
use sqlx::mysql::MySqlRow;
use sqlx::{Column, Row, TypeInfo, ValueRef};

/// Decode every column of `row` into a JSON object.
pub fn to_record(row: &MySqlRow) -> Result<Record, sqlx::Error> {
    let mut record = Record::new();
    for (index, column) in row.columns().iter().enumerate() {
        let value = decode_column(row, index, column.type_info().name())?;
        record.insert(column.name().to_string(), value);
    }
    Ok(record)
}

fn decode_column(row: &MySqlRow, index: usize, type_name: &str) -> Result<Value, sqlx::Error> {
    if row.try_get_raw(index)?.is_null() {
        return Ok(Value::Null);
    }

    let value = match type_name {
        "BOOLEAN" | "TINYINT" | "SMALLINT" | "MEDIUMINT" | "INT" | "BIGINT" | "YEAR" => {
            Value::from(row.try_get_unchecked::<i64, _>(index)?)
        }
        "TINYINT UNSIGNED" | "SMALLINT UNSIGNED" | "MEDIUMINT UNSIGNED" | "INT UNSIGNED"
        | "BIGINT UNSIGNED" => Value::from(row.try_get_unchecked::<u64, _>(index)?),
        "FLOAT" => float(f64::from(row.try_get::<f32, _>(index)?)),
        "DOUBLE" => float(row.try_get::<f64, _>(index)?),
        // DECIMAL travels as text in both protocols.
        "DECIMAL" => decimal(row.try_get_unchecked::<String, _>(index)?),
        "DATETIME" | "TIMESTAMP" => Value::String(
            row.try_get::<NaiveDateTime, _>(index)?
                .format("%Y-%m-%dT%H:%M:%S")
                .to_string(),
        ),
        "DATE" => Value::String(row.try_get::<NaiveDate, _>(index)?.to_string()),
        "TIME" => Value::String(row.try_get::<NaiveTime, _>(index)?.to_string()),
        "BIT" | "BINARY" | "VARBINARY" | "TINYBLOB" | "BLOB" | "MEDIUMBLOB" | "LONGBLOB"
        | "GEOMETRY" => {
            let bytes = row.try_get_unchecked::<Vec<u8>, _>(index)?;
            Value::String(String::from_utf8_lossy(&bytes).into_owned())
        }
        // CHAR, VARCHAR, TEXT variants, ENUM, SET, JSON
        _ => Value::String(row.try_get_unchecked::<String, _>(index)?),
    };
    Ok(value)
}

fn float(v: f64) -> Value {
    Number::from_f64(v).map_or(Value::Null, Value::Number)
}

/// Prices and averages arrive as DECIMAL; clients expect numbers.
fn decimal(text: String) -> Value {
    match text.parse::<f64>() {
        Ok(v) if v.is_finite() => float(v),
        _ => Value::String(text),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn decimals_become_numbers() {
        assert_eq!(decimal("199.99".into()), json!(199.99));
        assert_eq!(decimal("0.00".into()), json!(0.0));
        assert_eq!(decimal("-12".into()), json!(-12.0));
    }

    #[test]
    fn unparsable_decimal_is_kept_as_text() {
        assert_eq!(decimal("n/a".into()), json!("n/a"));
    }

    #[test]
    fn non_finite_floats_are_null() {
        assert_eq!(float(f64::NAN), Value::Null);
        assert_eq!(float(f64::INFINITY), Value::Null);
        assert_eq!(float(65.0), json!(65.0));
    }
}
