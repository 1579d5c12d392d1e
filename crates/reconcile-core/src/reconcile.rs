//! Row reconciliation.
//!
//! Candidate rows are matched against source rows by primary key. A
//! candidate without a key match must be inserted; a candidate whose key
//! matches but whose remaining columns differ must be updated; anything
//! else is already in place.

use crate::row::{Projection, Row};
use std::collections::hash_map::DefaultHasher;
use std::collections::HashMap;
use std::hash::Hasher;

/// Classification of one table's candidate rows.
///
/// Both lists keep the relative order of the candidate rows.
#[derive(Debug, Default, PartialEq)]
pub struct Reconciliation<'a> {
    pub to_insert: Vec<&'a Row>,
    pub to_update: Vec<&'a Row>,
}

impl Reconciliation<'_> {
    pub fn is_empty(&self) -> bool {
        self.to_insert.is_empty() && self.to_update.is_empty()
    }
}

/// Classify `candidate` rows against `source` rows keyed by `key_columns`.
///
/// Key and non-key comparisons use strict value equality with no type
/// coercion. The result does not depend on the order of `source`.
pub fn reconcile<'a>(
    source: &[Row],
    candidate: &'a [Row],
    key_columns: &[String],
) -> Reconciliation<'a> {
    if candidate.is_empty() {
        return Reconciliation::default();
    }

    if source.is_empty() {
        return Reconciliation {
            to_insert: candidate.iter().collect(),
            to_update: Vec::new(),
        };
    }

    let index = SourceIndex::build(source, key_columns);
    let mut outcome = Reconciliation::default();

    for row in candidate {
        let key = row.key_projection(key_columns);
        let mut matches = index.matching(&key).peekable();

        if matches.peek().is_none() {
            outcome.to_insert.push(row);
            continue;
        }

        let values = row.non_key_projection(key_columns);
        let unchanged = matches.any(|s| s.non_key_projection(key_columns).equivalent(&values));
        if !unchanged {
            outcome.to_update.push(row);
        }
    }

    outcome
}

/// Source rows bucketed by a hash of their key projection.
///
/// Buckets only narrow the search; every hit is confirmed with
/// [`Projection::equivalent`].
struct SourceIndex<'s> {
    rows: &'s [Row],
    key_columns: &'s [String],
    buckets: HashMap<u64, Vec<usize>>,
}

impl<'s> SourceIndex<'s> {
    fn build(rows: &'s [Row], key_columns: &'s [String]) -> Self {
        let mut buckets: HashMap<u64, Vec<usize>> = HashMap::with_capacity(rows.len());
        for (i, row) in rows.iter().enumerate() {
            buckets
                .entry(key_hash(&row.key_projection(key_columns)))
                .or_default()
                .push(i);
        }

        Self {
            rows,
            key_columns,
            buckets,
        }
    }

    /// Source rows whose key projection equals `key`.
    fn matching<'k>(&'k self, key: &'k Projection<'k>) -> impl Iterator<Item = &'s Row> + 'k {
        let rows = self.rows;
        let key_columns = self.key_columns;
        self.buckets
            .get(&key_hash(key))
            .into_iter()
            .flatten()
            .map(move |&i| &rows[i])
            .filter(move |s| s.key_projection(key_columns).equivalent(key))
    }
}

fn key_hash(key: &Projection<'_>) -> u64 {
    let mut hasher = DefaultHasher::new();
    key.hash_into(&mut hasher);
    hasher.finish()
}
