//! Query and aggregate results.

use cinder_core::{Decimal, EntryKey, Value};
use core::fmt;

/// Aggregate function kinds.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AggregateFunction {
    Sum,
    Count,
    Average,
    Min,
    Max,
}

impl fmt::Display for AggregateFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            AggregateFunction::Sum => "SUM",
            AggregateFunction::Count => "COUNT",
            AggregateFunction::Average => "AVG",
            AggregateFunction::Min => "MIN",
            AggregateFunction::Max => "MAX",
        };
        f.write_str(name)
    }
}

/// Running sum and count of an average.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AverageResult {
    pub sum: Decimal,
    pub count: u64,
}

impl AverageResult {
    /// Returns `sum / count`, or `None` when nothing was averaged.
    pub fn value(&self) -> Option<Decimal> {
        if self.count == 0 {
            return None;
        }
        self.sum.checked_div(Decimal::from(self.count))
    }
}

/// Typed value of an aggregate.
#[derive(Clone, Debug, PartialEq)]
pub enum AggregateValue {
    Count(i64),
    Sum(Decimal),
    Average(AverageResult),
    /// MIN / MAX keep the original value type. Text comes from entry
    /// metadata and is lower-cased when metadata folds case.
    Value(Value),
}

/// The aggregate written onto the context by an aggregate predicate.
#[derive(Clone, Debug, PartialEq)]
pub struct AggregateResult {
    pub function: AggregateFunction,
    /// `None` when there was nothing to aggregate (except for COUNT).
    pub value: Option<AggregateValue>,
}

impl AggregateResult {
    /// Returns the COUNT value.
    pub fn as_count(&self) -> Option<i64> {
        match self.value {
            Some(AggregateValue::Count(count)) => Some(count),
            _ => None,
        }
    }

    /// Returns the SUM value, or the AVG quotient.
    pub fn as_decimal(&self) -> Option<Decimal> {
        match &self.value {
            Some(AggregateValue::Sum(sum)) => Some(*sum),
            Some(AggregateValue::Average(avg)) => avg.value(),
            _ => None,
        }
    }

    /// Returns the MIN / MAX value.
    pub fn as_value(&self) -> Option<&Value> {
        match &self.value {
            Some(AggregateValue::Value(value)) => Some(value),
            _ => None,
        }
    }
}

/// Outcome of one evaluation.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct QueryResult {
    /// Accepted entry keys, sorted.
    pub keys: Vec<EntryKey>,
    /// Set when the tree's root is an aggregate.
    pub aggregate: Option<AggregateResult>,
}

impl QueryResult {
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Returns true if `key` was accepted.
    pub fn contains(&self, key: &str) -> bool {
        self.keys.binary_search_by(|k| k.as_ref().cmp(key)).is_ok()
    }
}
