//! Column values as read from a database row.

use rust_decimal::Decimal;
use std::hash::{Hash, Hasher};

/// A single column value.
///
/// Equality is strict: variants never compare equal across types, so
/// `Int(1)`, `Float(1.0)` and `Text("1")` are three different values.
/// Floats follow IEEE comparison (`NaN` never equals itself).
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// SQL NULL
    Null,

    /// Boolean value
    Bool(bool),

    /// Any integer column (int2, int4, int8, oid)
    Int(i64),

    /// float4 / float8
    Float(f64),

    /// NUMERIC that fits in a [`Decimal`]
    Decimal(Decimal),

    /// NUMERIC in its exact textual form, for values too wide for
    /// [`Decimal`] and for the special values `NaN`, `Infinity` and
    /// `-Infinity`. Compared as text, so `1.0` and `1.00` differ here.
    Numeric(String),

    /// Text and every type rendered through its textual form
    Text(String),
}

impl Value {
    /// Convenience constructor for text values.
    pub fn text(s: impl Into<String>) -> Self {
        Self::Text(s.into())
    }

    /// Render this value as a SQL literal.
    ///
    /// Numbers and booleans are written raw, NULL as `NULL`, and everything
    /// else is wrapped in single quotes. Embedded quotes are not escaped.
    pub fn to_sql_literal(&self) -> String {
        match self {
            Self::Null => "NULL".to_string(),
            Self::Bool(b) => b.to_string(),
            Self::Int(i) => i.to_string(),
            Self::Float(f) if f.is_finite() => f.to_string(),
            Self::Float(f) if f.is_nan() => "'NaN'".to_string(),
            Self::Float(f) if *f > 0.0 => "'Infinity'".to_string(),
            Self::Float(_) => "'-Infinity'".to_string(),
            Self::Decimal(d) => d.to_string(),
            Self::Numeric(n) => match n.as_str() {
                "NaN" | "Infinity" | "-Infinity" => format!("'{n}'"),
                _ => n.clone(),
            },
            Self::Text(s) => format!("'{s}'"),
        }
    }

    /// Feed this value into a hasher.
    ///
    /// Values that compare equal always hash equally, which lets the
    /// reconciler bucket rows by key before running the strict comparison.
    pub(crate) fn hash_into<H: Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            Self::Null => {}
            Self::Bool(b) => b.hash(state),
            Self::Int(i) => i.hash(state),
            // 0.0 == -0.0, so both must land in the same bucket
            Self::Float(f) if *f == 0.0 => 0u64.hash(state),
            Self::Float(f) => f.to_bits().hash(state),
            Self::Decimal(d) => d.hash(state),
            Self::Numeric(n) | Self::Text(n) => n.hash(state),
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Self::Int(i)
    }
}

impl From<i32> for Value {
    fn from(i: i32) -> Self {
        Self::Int(i as i64)
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Self::Float(f)
    }
}

impl From<Decimal> for Value {
    fn from(d: Decimal) -> Self {
        Self::Decimal(d)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Self::Null, Into::into)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::hash_map::DefaultHasher;
    use std::str::FromStr;

    fn hash_of(v: &Value) -> u64 {
        let mut h = DefaultHasher::new();
        v.hash_into(&mut h);
        h.finish()
    }

    #[test]
    fn test_literal_rendering() {
        assert_eq!(Value::Null.to_sql_literal(), "NULL");
        assert_eq!(Value::Bool(true).to_sql_literal(), "true");
        assert_eq!(Value::Bool(false).to_sql_literal(), "false");
        assert_eq!(Value::Int(42).to_sql_literal(), "42");
        assert_eq!(Value::Int(-7).to_sql_literal(), "-7");
        assert_eq!(Value::Float(1.5).to_sql_literal(), "1.5");
        assert_eq!(
            Value::Decimal(Decimal::from_str("10.50").unwrap()).to_sql_literal(),
            "10.50"
        );
        assert_eq!(Value::text("abc").to_sql_literal(), "'abc'");
    }

    #[test]
    fn test_embedded_quotes_are_not_escaped() {
        assert_eq!(Value::text("O'Brien").to_sql_literal(), "'O'Brien'");
    }

    #[test]
    fn test_non_finite_floats_are_quoted() {
        assert_eq!(Value::Float(f64::NAN).to_sql_literal(), "'NaN'");
        assert_eq!(Value::Float(f64::INFINITY).to_sql_literal(), "'Infinity'");
        assert_eq!(
            Value::Float(f64::NEG_INFINITY).to_sql_literal(),
            "'-Infinity'"
        );
    }

    #[test]
    fn test_wide_numeric_renders_raw() {
        let wide = "123456789012345678901234567890123456789012345678.25";
        assert_eq!(Value::Numeric(wide.to_string()).to_sql_literal(), wide);
        assert_eq!(Value::Numeric("-1e-40".to_string()).to_sql_literal(), "-1e-40");
        assert_eq!(Value::Numeric("NaN".to_string()).to_sql_literal(), "'NaN'");
        assert_eq!(
            Value::Numeric("-Infinity".to_string()).to_sql_literal(),
            "'-Infinity'"
        );
        assert_ne!(Value::Numeric("1".to_string()), Value::text("1"));
    }

    #[test]
    fn test_strict_equality_across_types() {
        assert_ne!(Value::Int(1), Value::text("1"));
        assert_ne!(Value::Int(1), Value::Float(1.0));
        assert_ne!(Value::Null, Value::text(""));
        assert_ne!(Value::Bool(false), Value::Int(0));
        assert_eq!(Value::Null, Value::Null);
        assert_ne!(Value::Float(f64::NAN), Value::Float(f64::NAN));
    }

    #[test]
    fn test_equal_values_hash_equally() {
        assert_eq!(hash_of(&Value::Float(0.0)), hash_of(&Value::Float(-0.0)));
        assert_eq!(
            hash_of(&Value::Decimal(Decimal::from_str("1.0").unwrap())),
            hash_of(&Value::Decimal(Decimal::from_str("1.00").unwrap()))
        );
        assert_eq!(hash_of(&Value::text("x")), hash_of(&Value::text("x")));
    }

    #[test]
    fn test_from_option() {
        assert_eq!(Value::from(None::<i64>), Value::Null);
        assert_eq!(Value::from(Some("a")), Value::text("a"));
    }
}
