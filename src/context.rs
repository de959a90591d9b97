//! Stack-based named variable store
//!
//! Each name maps to a stack of values. Setting a name pushes, unsetting pops,
//! and reading peeks at the top. Nested extraction passes push their own
//! "current document" and pop it when they finish, so the caller's view is
//! restored.

use std::collections::HashMap;

#[derive(Debug, Clone)]
pub struct ContextStore<V> {
    entries: HashMap<String, Vec<V>>,
}

impl<V> ContextStore<V> {
    pub fn new() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }

    /// Push `value` on top of the stack for `name`.
    pub fn set(&mut self, name: &str, value: V) {
        self.entries.entry(name.to_string()).or_default().push(value);
    }

    /// Top of the stack for `name`, or `None` when nothing is set.
    pub fn get(&self, name: &str) -> Option<&V> {
        self.entries.get(name).and_then(|stack| stack.last())
    }

    /// Pop the top of the stack for `name`. No-op when empty or unknown.
    pub fn unset(&mut self, name: &str) -> Option<V> {
        let stack = self.entries.get_mut(name)?;
        let value = stack.pop();
        if stack.is_empty() {
            self.entries.remove(name);
        }
        value
    }

    pub fn is_set(&self, name: &str) -> bool {
        self.entries.get(name).is_some_and(|stack| !stack.is_empty())
    }

    /// Number of values stacked under `name`.
    pub fn depth(&self, name: &str) -> usize {
        self.entries.get(name).map_or(0, Vec::len)
    }
}

impl<V> Default for ContextStore<V> {
    fn default() -> Self {
        Self::new()
    }
}
