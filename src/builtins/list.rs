// List built-in class
// Growable list of values; covers the block-taking bindings

use crate::error::RuntimeError;
use crate::vm::{Block, Env, Value};
use std::cell::RefCell;

#[derive(Debug, Default)]
pub struct ListBox {
    items: RefCell<Vec<Value>>,
}

impl ListBox {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_values(items: Vec<Value>) -> Self {
        Self {
            items: RefCell::new(items),
        }
    }

    pub fn len(&self) -> usize {
        self.items.borrow().len()
    }

    /// Snapshot so blocks can re-enter the list while we iterate
    fn snapshot(&self) -> Vec<Value> {
        self.items.borrow().clone()
    }

    fn index_arg(&self, index: &Value) -> Result<i64, RuntimeError> {
        index.as_integer().ok_or_else(|| {
            RuntimeError::type_error(format!(
                "no implicit conversion of {} into Integer",
                index.class_name()
            ))
        })
    }

    /// `push` / `<<`: append, returning the new size
    pub fn push(&self, item: &Value) -> Result<Value, RuntimeError> {
        let mut items = self.items.borrow_mut();
        items.push(item.clone());
        Ok(Value::Integer(items.len() as i64))
    }

    pub fn size(&self) -> Result<Value, RuntimeError> {
        Ok(Value::Integer(self.len() as i64))
    }

    /// `insert(index, item)`, index in `0..=size`
    pub fn insert(&self, index: &Value, item: &Value) -> Result<Value, RuntimeError> {
        let index = self.index_arg(index)?;
        let mut items = self.items.borrow_mut();
        if index < 0 || index as usize > items.len() {
            return Err(RuntimeError::index_error(format!(
                "index {} out of list bounds 0..{}",
                index,
                items.len()
            )));
        }
        items.insert(index as usize, item.clone());
        Ok(Value::Nil)
    }

    /// `each { |item| ... }`, returning the number of items visited
    pub fn each(&self, _env: &mut Env, block: Option<&Block>) -> Result<Value, RuntimeError> {
        let block = block.ok_or(RuntimeError::NoBlock)?;
        let items = self.snapshot();
        for item in &items {
            block.call(std::slice::from_ref(item))?;
        }
        Ok(Value::Integer(items.len() as i64))
    }

    /// `fetch(index) { |index| default }`; negative indices count from the end
    pub fn fetch(
        &self,
        _env: &mut Env,
        index: &Value,
        block: Option<&Block>,
    ) -> Result<Value, RuntimeError> {
        let raw = self.index_arg(index)?;
        let len = self.len() as i64;
        let resolved = if raw < 0 { raw + len } else { raw };
        if (0..len).contains(&resolved) {
            return Ok(self.items.borrow()[resolved as usize].clone());
        }
        match block {
            Some(block) => block.call(std::slice::from_ref(index)),
            None => Err(RuntimeError::index_error(format!(
                "index {} outside of list bounds: {}...{}",
                raw, -len, len
            ))),
        }
    }

    /// `count` without a block is the size; with a block, the truthy results
    pub fn count(&self, block: Option<&Block>) -> Result<Value, RuntimeError> {
        let Some(block) = block else {
            return self.size();
        };
        let mut count = 0;
        for item in &self.snapshot() {
            if block.call(std::slice::from_ref(item))?.is_truthy() {
                count += 1;
            }
        }
        Ok(Value::Integer(count))
    }

    /// `include?`: compares with each element's own `==`.
    ///
    /// Elements without `==` compare structurally; any other error from an
    /// element's `==` stops the search.
    pub fn include(&self, env: &mut Env, needle: &Value) -> Result<Value, RuntimeError> {
        for item in &self.snapshot() {
            let found = match env.send(item, "==", std::slice::from_ref(needle), None) {
                Ok(result) => result.is_truthy(),
                Err(RuntimeError::NoMethod { .. }) => item == needle,
                Err(err) => return Err(err),
            };
            if found {
                return Ok(Value::TRUE);
            }
        }
        Ok(Value::FALSE)
    }

    pub fn is_empty(&self) -> bool {
        self.items.borrow().is_empty()
    }
}
