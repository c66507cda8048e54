//! Aggregate functions over the keys a child predicate accepts.

use super::Predicate;
use crate::ast::Parameters;
use crate::context::QueryContext;
use crate::result::{AggregateFunction, AggregateResult, AggregateValue, AverageResult};
use cinder_core::{AttributeSource, DataType, Decimal, EntryKey, Error, Result, Value};
use core::cmp::Ordering;

/// Executes its child, then folds an attribute of every accepted entry.
///
/// Values are read from entry metadata; nulls are skipped.
#[derive(Debug)]
pub struct AggregatePredicate {
    function: AggregateFunction,
    attribute: Option<String>,
    child: Box<dyn Predicate>,
}

impl AggregatePredicate {
    fn new(function: AggregateFunction, attribute: Option<String>, child: Box<dyn Predicate>) -> Self {
        Self {
            function,
            attribute,
            child,
        }
    }

    pub fn sum(attribute: impl Into<String>, child: impl Predicate + 'static) -> Self {
        Self::new(AggregateFunction::Sum, Some(attribute.into()), Box::new(child))
    }

    pub fn count(child: impl Predicate + 'static) -> Self {
        Self::new(AggregateFunction::Count, None, Box::new(child))
    }

    pub fn average(attribute: impl Into<String>, child: impl Predicate + 'static) -> Self {
        Self::new(AggregateFunction::Average, Some(attribute.into()), Box::new(child))
    }

    pub fn min(attribute: impl Into<String>, child: impl Predicate + 'static) -> Self {
        Self::new(AggregateFunction::Min, Some(attribute.into()), Box::new(child))
    }

    pub fn max(attribute: impl Into<String>, child: impl Predicate + 'static) -> Self {
        Self::new(AggregateFunction::Max, Some(attribute.into()), Box::new(child))
    }

    #[inline]
    pub fn function(&self) -> AggregateFunction {
        self.function
    }

    #[inline]
    pub fn attribute(&self) -> Option<&str> {
        self.attribute.as_deref()
    }

    /// Reads the non-null values of `attribute` for `keys`.
    fn collect(&self, ctx: &QueryContext<'_>, attribute: &str, keys: &[EntryKey]) -> Result<Vec<Value>> {
        let mut values = Vec::with_capacity(keys.len());
        for key in keys {
            let value = ctx
                .metadata(key)
                .and_then(|meta| meta.attribute(attribute).or_else(|| meta.named_tag(attribute)))
                .ok_or_else(|| Error::index_not_defined(ctx.type_name(), attribute))?;
            values.extend(value);
        }
        Ok(values)
    }

    fn mismatch(&self, attribute: &str, data_type: DataType) -> Error {
        Error::aggregate_type_mismatch(self.function.to_string(), attribute, data_type)
    }

    fn total(&self, attribute: &str, values: &[Value]) -> Result<Decimal> {
        let mut sum = Decimal::ZERO;
        for value in values {
            let data_type = value.data_type();
            if matches!(
                data_type,
                DataType::Boolean | DataType::DateTime | DataType::String | DataType::Char
            ) {
                return Err(self.mismatch(attribute, data_type));
            }
            let decimal = value
                .to_decimal()
                .ok_or_else(|| self.mismatch(attribute, data_type))?;
            sum = sum
                .checked_add(decimal)
                .ok_or_else(|| Error::unsupported(format!("{} over `{}` overflows", self.function, attribute)))?;
        }
        Ok(sum)
    }

    fn extreme(&self, attribute: &str, values: Vec<Value>, keep: Ordering) -> Result<Option<Value>> {
        let mut best: Option<Value> = None;
        for value in values {
            let data_type = value.data_type();
            if data_type == DataType::Boolean {
                return Err(self.mismatch(attribute, data_type));
            }
            best = match best {
                None => Some(value),
                Some(current) => {
                    if !(value.is_numeric() && current.is_numeric()) && data_type != current.data_type() {
                        return Err(self.mismatch(attribute, data_type));
                    }
                    if value.cmp(&current) == keep {
                        Some(value)
                    } else {
                        Some(current)
                    }
                }
            };
        }
        Ok(best)
    }

    fn fold(&self, attribute: &str, values: Vec<Value>) -> Result<Option<AggregateValue>> {
        let value = match self.function {
            AggregateFunction::Count => Some(AggregateValue::Count(values.len() as i64)),
            AggregateFunction::Sum => {
                let sum = self.total(attribute, &values)?;
                (!values.is_empty()).then_some(AggregateValue::Sum(sum))
            }
            AggregateFunction::Average => {
                let sum = self.total(attribute, &values)?;
                (!values.is_empty()).then_some(AggregateValue::Average(AverageResult {
                    sum,
                    count: values.len() as u64,
                }))
            }
            AggregateFunction::Min => self.extreme(attribute, values, Ordering::Less)?.map(AggregateValue::Value),
            AggregateFunction::Max => self.extreme(attribute, values, Ordering::Greater)?.map(AggregateValue::Value),
        };
        Ok(value)
    }
}

impl Predicate for AggregatePredicate {
    fn apply(&self, source: &dyn AttributeSource, params: &Parameters) -> Result<bool> {
        self.child.apply(source, params)
    }

    fn execute(&self, ctx: &mut QueryContext<'_>) -> Result<()> {
        if ctx.is_nested() {
            return Err(Error::unsupported("an aggregate must be the root of a query"));
        }
        self.child.execute(ctx)?;
        if ctx.aggregate().is_some() {
            return Err(Error::unsupported("aggregates cannot be nested"));
        }
        ctx.algebra_mut().reduce();

        let mut keys: Vec<EntryKey> = ctx.algebra().left().iter().cloned().collect();
        keys.sort();
        let value = match self.attribute.as_deref() {
            Some(attribute) => {
                let values = self.collect(ctx, attribute, &keys)?;
                self.fold(attribute, values)?
            }
            None => Some(AggregateValue::Count(keys.len() as i64)),
        };
        ctx.set_aggregate(AggregateResult {
            function: self.function,
            value,
        });
        Ok(())
    }

    fn invert(&mut self) {
        self.child.invert();
    }

    fn is_inverse(&self) -> bool {
        self.child.is_inverse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{Functor, Generator};
    use crate::predicate::CompareFunctorValuePredicate;

    fn any() -> CompareFunctorValuePredicate {
        CompareFunctorValuePredicate::ne(Functor::member("x"), Generator::null())
    }

    #[test]
    fn test_sum_and_average_fold() {
        let sum = AggregatePredicate::sum("x", any());
        let values = vec![Value::Int32(30), Value::Float64(40.5)];
        assert_eq!(
            sum.fold("x", values.clone()).unwrap(),
            Some(AggregateValue::Sum(Decimal::new(705, 1)))
        );
        assert_eq!(sum.fold("x", Vec::new()).unwrap(), None);

        let avg = AggregatePredicate::average("x", any());
        let result = avg.fold("x", values).unwrap();
        assert_eq!(
            result,
            Some(AggregateValue::Average(AverageResult {
                sum: Decimal::new(705, 1),
                count: 2
            }))
        );
    }

    #[test]
    fn test_sum_rejects_text() {
        let sum = AggregatePredicate::sum("x", any());
        let err = sum.fold("x", vec![Value::Int32(1), Value::from("a")]).unwrap_err();
        assert_eq!(err, Error::aggregate_type_mismatch("SUM", "x", DataType::String));
    }

    #[test]
    fn test_min_max() {
        let min = AggregatePredicate::min("x", any());
        let max = AggregatePredicate::max("x", any());
        let values = vec![Value::Int32(5), Value::Int64(2), Value::Float64(7.5)];
        assert_eq!(
            min.fold("x", values.clone()).unwrap(),
            Some(AggregateValue::Value(Value::Int64(2)))
        );
        assert_eq!(
            max.fold("x", values).unwrap(),
            Some(AggregateValue::Value(Value::Float64(7.5)))
        );

        let words = vec![Value::from("pear"), Value::from("apple")];
        assert_eq!(
            min.fold("x", words).unwrap(),
            Some(AggregateValue::Value(Value::from("apple")))
        );
    }

    #[test]
    fn test_min_rejects_mixed_and_boolean() {
        let min = AggregatePredicate::min("x", any());
        let err = min.fold("x", vec![Value::from("a"), Value::Int32(1)]).unwrap_err();
        assert_eq!(err, Error::aggregate_type_mismatch("MIN", "x", DataType::Int32));
        let err = min.fold("x", vec![Value::Boolean(true)]).unwrap_err();
        assert_eq!(err, Error::aggregate_type_mismatch("MIN", "x", DataType::Boolean));
    }
}
