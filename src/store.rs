use crate::error::EvalError;
use crate::evaluator::{EvalOptions, Evaluator};
use crate::value::Value;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

#[derive(Debug, Clone, PartialEq)]
pub struct Variable {
    pub name: String,
    pub value: Value,
}

/// Ordered name → value mapping. Writing an existing name replaces its value
/// in place, so a name appears at most once.
#[derive(Debug, Clone, Default)]
pub struct VariableStore {
    variables: Vec<Variable>,
}

impl VariableStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, name: &str, value: Value) {
        match self.variables.iter_mut().find(|v| v.name == name) {
            Some(existing) => existing.value = value,
            None => self.variables.push(Variable {
                name: name.to_string(),
                value,
            }),
        }
    }

    pub fn lookup(&self, name: &str) -> Option<&Value> {
        self.variables
            .iter()
            .rev()
            .find(|v| v.name == name)
            .map(|v| &v.value)
    }

    pub fn len(&self) -> usize {
        self.variables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.variables.is_empty()
    }
}

/// A store shared between threads. Each evaluation holds one read lock for
/// its whole top-level call; nested sub-evaluations reuse that borrow.
#[derive(Debug, Clone, Default)]
pub struct SharedStore {
    inner: Arc<RwLock<VariableStore>>,
}

impl SharedStore {
    pub fn new(store: VariableStore) -> Self {
        Self {
            inner: Arc::new(RwLock::new(store)),
        }
    }

    pub fn read(&self) -> RwLockReadGuard<'_, VariableStore> {
        self.inner.read().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn write(&self) -> RwLockWriteGuard<'_, VariableStore> {
        self.inner.write().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn set(&self, name: &str, value: Value) {
        self.write().set(name, value);
    }

    pub fn evaluate_expression(&self, input: &str, options: EvalOptions) -> Result<f64, EvalError> {
        let store = self.read();
        Evaluator::with_options(&store, options).evaluate_expression(input)
    }

    pub fn evaluate_condition(&self, input: &str, options: EvalOptions) -> Result<f64, EvalError> {
        let store = self.read();
        Evaluator::with_options(&store, options).evaluate_condition(input)
    }
}
