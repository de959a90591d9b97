//! Value categories and the type-degradation chain

use std::fmt;

use super::value::Value;

/// Categories in cascade order, richest representation first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    DomList,
    DomArray,
    Array,
    Dom,
    Text,
}

pub const TYPE_CHAIN: [Category; 5] = [
    Category::DomList,
    Category::DomArray,
    Category::Array,
    Category::Dom,
    Category::Text,
];

impl Category {
    /// Snake-case name used in descriptor closure keys (`dom_array_filter`).
    pub fn as_str(self) -> &'static str {
        match self {
            Category::DomList => "dom_list",
            Category::DomArray => "dom_array",
            Category::Array => "array",
            Category::Dom => "dom",
            Category::Text => "text",
        }
    }

    /// The chain suffix starting at this category.
    pub fn chain(self) -> &'static [Category] {
        let start = TYPE_CHAIN
            .iter()
            .position(|c| *c == self)
            .unwrap_or(TYPE_CHAIN.len());
        &TYPE_CHAIN[start..]
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Assign a category to `value`, or `None` when the chain does not apply.
pub fn classify(value: &Value) -> Option<Category> {
    match value {
        Value::NodeList(_) => Some(Category::DomList),
        Value::List(items) if !items.is_empty() && items.iter().all(|v| v.as_node().is_some()) => {
            Some(Category::DomArray)
        }
        Value::List(_) => Some(Category::Array),
        Value::Node(_) => Some(Category::Dom),
        Value::Text(_) => Some(Category::Text),
        Value::Failed | Value::Map(_) => None,
    }
}
