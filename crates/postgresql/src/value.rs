//! PostgreSQL to [`Value`] conversion.

mod array;
mod interval;
mod numeric;
mod timetz;

use array::array_literal;
use interval::Interval;
use numeric::NumericText;
use timetz::TimeTz;

use crate::error::PostgresError;
use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use reconcile_core::{Row, Value};
use rust_decimal::Decimal;
use std::error::Error;
use std::fmt::Write;
use tokio_postgres::types::{FromSql, Kind, Type};

/// Convert a driver row into a [`Row`], keeping the column order of the result set.
pub fn convert_row(row: &tokio_postgres::Row) -> Result<Row, PostgresError> {
    let mut converted = Row::with_capacity(row.columns().len());
    for (i, column) in row.columns().iter().enumerate() {
        converted.push(column.name(), convert_value(row, i)?);
    }
    Ok(converted)
}

/// Convert a single column of a driver row.
///
/// Numbers and booleans keep their type. Dates, times, intervals, UUIDs,
/// JSON, enums, arrays and binary data become text in a form PostgreSQL
/// accepts back as a literal.
///
/// Columns of any other type that the driver cannot read as a string fail
/// with [`PostgresError::UnsupportedType`]; the row fetcher then selects
/// them again cast to `text`.
pub fn convert_value(row: &tokio_postgres::Row, index: usize) -> Result<Value, PostgresError> {
    let pg_type = row.columns()[index].type_();

    let value: Value = match *pg_type {
        Type::BOOL => row.try_get::<_, Option<bool>>(index)?.into(),
        Type::INT2 => row
            .try_get::<_, Option<i16>>(index)?
            .map_or(Value::Null, |i| Value::Int(i as i64)),
        Type::INT4 => row.try_get::<_, Option<i32>>(index)?.into(),
        Type::INT8 => row.try_get::<_, Option<i64>>(index)?.into(),
        Type::OID => row
            .try_get::<_, Option<u32>>(index)?
            .map_or(Value::Null, |i| Value::Int(i as i64)),
        Type::FLOAT4 => row
            .try_get::<_, Option<f32>>(index)?
            .map_or(Value::Null, |f| Value::Float(widen_f32(f))),
        Type::FLOAT8 => row.try_get::<_, Option<f64>>(index)?.into(),
        Type::NUMERIC => match row.try_get::<_, Option<Decimal>>(index) {
            Ok(d) => d.into(),
            Err(_) => row
                .try_get::<_, Option<NumericText>>(index)?
                .map_or(Value::Null, |n| Value::Numeric(n.0)),
        },
        Type::TEXT | Type::VARCHAR | Type::BPCHAR | Type::NAME => {
            row.try_get::<_, Option<String>>(index)?.into()
        }
        Type::DATE => row
            .try_get::<_, Option<NaiveDate>>(index)?
            .map_or(Value::Null, |d| Value::Text(d.to_string())),
        Type::TIME => row
            .try_get::<_, Option<NaiveTime>>(index)?
            .map_or(Value::Null, |t| Value::Text(t.to_string())),
        Type::TIMETZ => row
            .try_get::<_, Option<TimeTz>>(index)?
            .map_or(Value::Null, |t| Value::Text(t.to_string())),
        Type::INTERVAL => row
            .try_get::<_, Option<Interval>>(index)?
            .map_or(Value::Null, |i| Value::Text(i.to_string())),
        Type::TIMESTAMP => row
            .try_get::<_, Option<NaiveDateTime>>(index)?
            .map_or(Value::Null, |ts| Value::Text(ts.to_string())),
        Type::TIMESTAMPTZ => row
            .try_get::<_, Option<DateTime<Utc>>>(index)?
            .map_or(Value::Null, |dt| Value::Text(dt.to_rfc3339())),
        Type::JSON | Type::JSONB => row
            .try_get::<_, Option<serde_json::Value>>(index)?
            .map_or(Value::Null, |json| Value::Text(json.to_string())),
        Type::UUID => row
            .try_get::<_, Option<uuid::Uuid>>(index)?
            .map_or(Value::Null, |u| Value::Text(u.to_string())),
        Type::BYTEA => row
            .try_get::<_, Option<Vec<u8>>>(index)?
            .map_or(Value::Null, |bytes| Value::Text(bytea_literal(&bytes))),
        Type::TEXT_ARRAY | Type::VARCHAR_ARRAY | Type::BPCHAR_ARRAY | Type::NAME_ARRAY => {
            array_value::<String>(row, index, |s| s)?
        }
        Type::INT2_ARRAY => array_value::<i16>(row, index, |i| i.to_string())?,
        Type::INT4_ARRAY => array_value::<i32>(row, index, |i| i.to_string())?,
        Type::INT8_ARRAY => array_value::<i64>(row, index, |i| i.to_string())?,
        Type::BOOL_ARRAY => {
            array_value::<bool>(row, index, |b| String::from(if b { "t" } else { "f" }))?
        }
        _ if matches!(pg_type.kind(), Kind::Enum(_)) => row
            .try_get::<_, Option<EnumLabel>>(index)?
            .map_or(Value::Null, |label| Value::Text(label.0)),
        _ => match row.try_get::<_, Option<String>>(index) {
            Ok(s) => s.into(),
            Err(_) => return Err(unsupported(row, index)),
        },
    };

    Ok(value)
}

/// Label of a user-defined enum type, sent as its UTF-8 name.
struct EnumLabel(String);

impl<'a> FromSql<'a> for EnumLabel {
    fn from_sql(_: &Type, raw: &'a [u8]) -> Result<Self, Box<dyn Error + Sync + Send>> {
        Ok(Self(std::str::from_utf8(raw)?.to_string()))
    }

    fn accepts(ty: &Type) -> bool {
        matches!(ty.kind(), Kind::Enum(_))
    }
}

/// One-dimensional array as its PostgreSQL text form.
///
/// Multi-dimensional arrays are reported as unsupported so they go through
/// the `text` cast instead.
fn array_value<'r, T>(
    row: &'r tokio_postgres::Row,
    index: usize,
    element: fn(T) -> String,
) -> Result<Value, PostgresError>
where
    T: FromSql<'r>,
{
    match row.try_get::<_, Option<Vec<Option<T>>>>(index) {
        Ok(items) => Ok(items.map_or(Value::Null, |items| {
            Value::Text(array_literal(
                items.into_iter().map(|item| item.map(element)),
            ))
        })),
        Err(_) => Err(unsupported(row, index)),
    }
}

fn unsupported(row: &tokio_postgres::Row, index: usize) -> PostgresError {
    let column = &row.columns()[index];
    PostgresError::UnsupportedType {
        column: column.name().to_string(),
        type_name: column.type_().name().to_string(),
    }
}

/// Widen through the shortest decimal form so `0.1::float4` stays `0.1`.
fn widen_f32(f: f32) -> f64 {
    f.to_string().parse().unwrap_or(f as f64)
}

/// PostgreSQL hex format: `\x` followed by two lowercase hex digits per byte.
fn bytea_literal(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(2 + bytes.len() * 2);
    out.push_str("\\x");
    for b in bytes {
        let _ = write!(out, "{b:02x}");
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bytea_literal() {
        assert_eq!(bytea_literal(&[0xde, 0xad, 0x01]), "\\xdead01");
        assert_eq!(bytea_literal(&[]), "\\x");
    }

    #[test]
    fn test_widen_f32_keeps_short_form() {
        assert_eq!(widen_f32(0.1), 0.1);
        assert_eq!(widen_f32(2.5), 2.5);
        assert!(widen_f32(f32::NAN).is_nan());
        assert_eq!(widen_f32(f32::INFINITY), f64::INFINITY);
    }
}
