//! Field descriptors and field maps

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;
use serde::Deserialize;

use super::classify::Category;
use super::value::Value;
use crate::error::{FilterError, Result};

pub const DEFAULT_TYPE: &str = "Field";
pub const DEFAULT_ACTION: &str = "parse";

/// Caller-supplied transform attached to a descriptor.
pub type FilterFn = Arc<dyn Fn(&Value) -> std::result::Result<Value, FilterError> + Send + Sync>;

/// Named map of descriptors, iterated in authoring order.
pub type FieldMap = IndexMap<String, FieldDescriptor>;

/// One locator expression or a sequence of them.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum Locator {
    Single(String),
    Many(Vec<String>),
}

/// Descriptor closures keyed by `<category>_filter`, `<category>_convert` or `filter`.
#[derive(Clone, Default)]
pub struct Filters {
    closures: HashMap<String, FilterFn>,
}

impl Filters {
    pub fn get(&self, key: &str) -> Option<&FilterFn> {
        self.closures.get(key)
    }

    pub fn insert(&mut self, key: impl Into<String>, filter: FilterFn) {
        self.closures.insert(key.into(), filter);
    }

    pub fn is_empty(&self) -> bool {
        self.closures.is_empty()
    }
}

impl fmt::Debug for Filters {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut keys: Vec<_> = self.closures.keys().collect();
        keys.sort();
        f.debug_set().entries(keys).finish()
    }
}

/// Closure key for a category-scoped filter: `dom_filter`, `text_convert`, ...
pub fn filter_key(category: Category, kind: super::registry::StepKind) -> String {
    format!("{}_{}", category.as_str(), kind.as_str())
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct FieldDescriptor {
    #[serde(default)]
    pub name: String,
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
    #[serde(default)]
    pub action: Option<String>,
    #[serde(default)]
    pub xpath: Option<Locator>,
    #[serde(default)]
    pub attr: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub fields: Option<FieldMap>,
    #[serde(skip)]
    pub filters: Filters,
    #[serde(default)]
    pub no_filter: bool,
}

impl FieldDescriptor {
    /// Single-node lookup.
    pub fn field(xpath: impl Into<String>) -> Self {
        Self {
            xpath: Some(Locator::Single(xpath.into())),
            ..Self::default()
        }
    }

    /// Several single-node lookups collected into one sequence.
    pub fn field_set<I, S>(xpaths: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            kind: Some("FieldSet".to_string()),
            xpath: Some(Locator::Many(xpaths.into_iter().map(Into::into).collect())),
            ..Self::default()
        }
    }

    /// Every node matched by `xpath` as a node list.
    pub fn field_list(xpath: impl Into<String>) -> Self {
        Self {
            kind: Some("FieldList".to_string()),
            ..Self::field(xpath)
        }
    }

    /// One attribute per matched node.
    pub fn collection(xpath: impl Into<String>, attr: impl Into<String>) -> Self {
        Self {
            kind: Some("FieldCollection".to_string()),
            attr: Some(attr.into()),
            ..Self::field(xpath)
        }
    }

    /// Sub-page whose `fields` run against the fetched document.
    pub fn page(fields: FieldMap) -> Self {
        Self {
            kind: Some("Page".to_string()),
            fields: Some(fields),
            ..Self::default()
        }
    }

    pub fn with_type(mut self, kind: impl Into<String>) -> Self {
        self.kind = Some(kind.into());
        self
    }

    pub fn with_action(mut self, action: impl Into<String>) -> Self {
        self.action = Some(action.into());
        self
    }

    pub fn with_xpath(mut self, xpath: impl Into<String>) -> Self {
        self.xpath = Some(Locator::Single(xpath.into()));
        self
    }

    pub fn with_attr(mut self, attr: impl Into<String>) -> Self {
        self.attr = Some(attr.into());
        self
    }

    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    pub fn without_filters(mut self) -> Self {
        self.no_filter = true;
        self
    }

    pub fn with_filter<F>(mut self, key: impl Into<String>, filter: F) -> Self
    where
        F: Fn(&Value) -> std::result::Result<Value, FilterError> + Send + Sync + 'static,
    {
        self.filters.insert(key, Arc::new(filter));
        self
    }

    pub fn type_name(&self) -> &str {
        self.kind.as_deref().unwrap_or(DEFAULT_TYPE)
    }

    pub fn action_or<'a>(&'a self, default: &'a str) -> &'a str {
        self.action.as_deref().unwrap_or(default)
    }
}

/// Build a field map from `(name, descriptor)` pairs, naming each descriptor after its key.
pub fn field_map<I, S>(entries: I) -> FieldMap
where
    I: IntoIterator<Item = (S, FieldDescriptor)>,
    S: Into<String>,
{
    entries
        .into_iter()
        .map(|(name, mut descriptor)| {
            let name = name.into();
            descriptor.name = name.clone();
            (name, descriptor)
        })
        .collect()
}

/// Parse a field map from JSON. Unknown keys are ignored.
pub fn field_map_from_json(json: &str) -> Result<FieldMap> {
    let mut map: FieldMap = serde_json::from_str(json)?;
    assign_names(&mut map);
    Ok(map)
}

/// Name every descriptor (nested ones included) after its key.
pub fn assign_names(map: &mut FieldMap) {
    for (name, descriptor) in map.iter_mut() {
        descriptor.name = name.clone();
        if let Some(nested) = descriptor.fields.as_mut() {
            assign_names(nested);
        }
    }
}
