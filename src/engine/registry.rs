//! Handler and filter tables
//!
//! Handlers are registered under an `(action, Type)` pair whose display name
//! follows the `action + Type` convention (`parse` + `FieldSet` is
//! `parseFieldSet`). Filters are registered under tagged slots instead of
//! synthesized method names.

use std::collections::HashMap;
use std::fmt;

use super::classify::Category;
use super::descriptor::FieldDescriptor;
use super::processor::FieldProcessor;
use super::value::Value;

/// Produces the raw value for one field.
pub type Handler = fn(&mut FieldProcessor, &str, &FieldDescriptor) -> Value;

/// Filter or converter step. `None` means the step does not apply to the value.
pub type FilterStep = fn(&Value) -> Option<Value>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StepKind {
    Filter,
    Convert,
}

impl StepKind {
    pub fn as_str(self) -> &'static str {
        match self {
            StepKind::Filter => "filter",
            StepKind::Convert => "convert",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct HandlerKey {
    action: String,
    kind: String,
}

impl HandlerKey {
    /// The type is capitalized, so `field` and `Field` name the same handler.
    pub fn new(action: &str, kind: &str) -> Self {
        Self {
            action: action.to_string(),
            kind: capitalize(kind),
        }
    }

    pub fn action(&self) -> &str {
        &self.action
    }

    pub fn kind(&self) -> &str {
        &self.kind
    }
}

impl fmt::Display for HandlerKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.action, self.kind)
    }
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[derive(Clone, Default)]
pub struct HandlerRegistry {
    handlers: HashMap<HandlerKey, Handler>,
}

impl HandlerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, action: &str, kind: &str, handler: Handler) {
        self.handlers.insert(HandlerKey::new(action, kind), handler);
    }

    pub fn resolve(&self, kind: &str, action: &str) -> Option<(HandlerKey, Handler)> {
        let key = HandlerKey::new(action, kind);
        let handler = *self.handlers.get(&key)?;
        Some((key, handler))
    }
}

impl fmt::Debug for HandlerRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<_> = self.handlers.keys().map(ToString::to_string).collect();
        names.sort();
        f.debug_set().entries(names).finish()
    }
}

/// Address of a filter in the table.
///
/// | slot                         | convention name          |
/// |------------------------------|--------------------------|
/// | `hook(h)`                    | `<h>Filter`              |
/// | `plain(T)`                   | `<t>Filter`              |
/// | `scoped(h, T, Filter)`       | `<h><T>Filter`           |
/// | `scoped(h, T, Convert)`      | `<h><T>Convert`          |
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FilterSlot {
    handler: Option<HandlerKey>,
    category: Option<Category>,
    kind: StepKind,
}

impl FilterSlot {
    pub fn hook(handler: &HandlerKey) -> Self {
        Self {
            handler: Some(handler.clone()),
            category: None,
            kind: StepKind::Filter,
        }
    }

    pub fn plain(category: Category) -> Self {
        Self {
            handler: None,
            category: Some(category),
            kind: StepKind::Filter,
        }
    }

    pub fn scoped(handler: &HandlerKey, category: Category, kind: StepKind) -> Self {
        Self {
            handler: Some(handler.clone()),
            category: Some(category),
            kind,
        }
    }
}

#[derive(Clone, Default)]
pub struct FilterTable {
    steps: HashMap<FilterSlot, FilterStep>,
}

impl FilterTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, slot: FilterSlot, step: FilterStep) {
        self.steps.insert(slot, step);
    }

    pub fn get(&self, slot: &FilterSlot) -> Option<FilterStep> {
        self.steps.get(slot).copied()
    }
}

impl fmt::Debug for FilterTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FilterTable")
            .field("steps", &self.steps.len())
            .finish()
    }
}
