//! Column-ordered row snapshots and their key / non-key projections.

use crate::value::Value;
use indexmap::IndexMap;
use std::hash::Hasher;

/// One row of a table, keeping columns in the order the database returned them.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Row {
    columns: IndexMap<String, Value>,
}

impl Row {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            columns: IndexMap::with_capacity(capacity),
        }
    }

    /// Build a row from `(column, value)` pairs, in order.
    pub fn from_pairs<K, V, I>(pairs: I) -> Self
    where
        K: Into<String>,
        V: Into<Value>,
        I: IntoIterator<Item = (K, V)>,
    {
        Self {
            columns: pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    /// Append a column. A repeated column name replaces the earlier value in place.
    pub fn push(&mut self, column: impl Into<String>, value: impl Into<Value>) {
        self.columns.insert(column.into(), value.into());
    }

    pub fn get(&self, column: &str) -> Option<&Value> {
        self.columns.get(column)
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Columns and values in natural order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.columns.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.keys().map(String::as_str)
    }

    /// The row restricted to `key_columns`, in key order.
    ///
    /// A key column the row does not carry is kept as an absent entry, so two
    /// rows both missing it still agree on it.
    pub fn key_projection<'a>(&'a self, key_columns: &'a [String]) -> Projection<'a> {
        Projection {
            entries: key_columns
                .iter()
                .map(|k| (k.as_str(), self.columns.get(k)))
                .collect(),
        }
    }

    /// The row without `key_columns`, in natural order.
    pub fn non_key_projection<'a>(&'a self, key_columns: &[String]) -> Projection<'a> {
        Projection {
            entries: self
                .columns
                .iter()
                .filter(|(name, _)| !key_columns.iter().any(|k| k == *name))
                .map(|(name, value)| (name.as_str(), Some(value)))
                .collect(),
        }
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Row {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self::from_pairs(iter)
    }
}

/// A borrowed view of some of a row's columns.
#[derive(Debug, Clone)]
pub struct Projection<'a> {
    entries: IndexMap<&'a str, Option<&'a Value>>,
}

impl<'a> Projection<'a> {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'a str, Option<&'a Value>)> + '_ {
        self.entries.iter().map(|(k, v)| (*k, *v))
    }

    /// Same column set and strictly equal values for every column.
    ///
    /// Column order does not matter; only names and values do.
    pub fn equivalent(&self, other: &Projection<'_>) -> bool {
        if self.entries.len() != other.entries.len() {
            return false;
        }

        self.entries
            .iter()
            .all(|(name, value)| matches!(other.entries.get(*name), Some(v) if v == value))
    }

    /// Hash the projection in its own column order.
    ///
    /// Only meaningful between projections built from the same column list,
    /// which is how the reconciler uses it for key projections.
    pub(crate) fn hash_into<H: Hasher>(&self, state: &mut H) {
        for (name, value) in &self.entries {
            state.write(name.as_bytes());
            match value {
                Some(v) => v.hash_into(state),
                None => state.write_u8(0xff),
            }
        }
    }
}

impl PartialEq for Projection<'_> {
    fn eq(&self, other: &Self) -> bool {
        self.equivalent(other)
    }
}
