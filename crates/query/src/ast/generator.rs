//! Generators and query parameters.

use cinder_core::{Error, IndexKey, Result, Value};
use hashbrown::HashMap;

/// Named query parameters.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Parameters {
    values: HashMap<String, Option<Value>>,
}

impl Parameters {
    /// Creates an empty parameter map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a parameter.
    pub fn with(mut self, name: impl Into<String>, value: impl Into<Option<Value>>) -> Self {
        self.insert(name, value);
        self
    }

    /// Inserts or replaces a parameter.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<Option<Value>>) {
        self.values.insert(name.into(), value.into());
    }

    /// Gets a parameter. `Some(None)` is a supplied null.
    pub fn get(&self, name: &str) -> Option<&Option<Value>> {
        self.values.get(name)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Returns the name of the only supplied parameter.
    pub fn single_name(&self) -> Option<&str> {
        match self.values.len() {
            1 => self.values.keys().next().map(String::as_str),
            _ => None,
        }
    }
}

impl<K: Into<String>> FromIterator<(K, Option<Value>)> for Parameters {
    fn from_iter<I: IntoIterator<Item = (K, Option<Value>)>>(iter: I) -> Self {
        Self {
            values: iter.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }
}

/// Produces the right-hand value of a comparison.
#[derive(Clone, Debug, PartialEq)]
pub enum Generator {
    /// A literal, possibly null.
    Constant(Option<Value>),
    /// A named query parameter.
    Parameter(String),
}

impl Generator {
    /// Creates a constant generator.
    pub fn constant(value: impl Into<Value>) -> Self {
        Generator::Constant(Some(value.into()))
    }

    /// Creates a null constant.
    pub fn null() -> Self {
        Generator::Constant(None)
    }

    /// Creates a parameter reference.
    pub fn parameter(name: impl Into<String>) -> Self {
        Generator::Parameter(name.into())
    }

    /// Resolves the generator to an index key.
    pub fn resolve(&self, params: &Parameters) -> Result<IndexKey> {
        match self {
            Generator::Constant(value) => Ok(IndexKey::from(value.clone())),
            Generator::Parameter(name) => params
                .get(name)
                .map(|value| IndexKey::from(value.clone()))
                .ok_or_else(|| Error::missing_parameter(name.as_str())),
        }
    }
}
