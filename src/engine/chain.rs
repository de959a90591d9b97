//! Cascading filter chain
//!
//! After a handler returns, its value is classified and walked down the type
//! chain. The starting category gets every normalizing filter. Each later
//! category is offered to the converters and scoped filters in turn, and the
//! first one that produces a truthy value claims that level.

use tracing::debug;

use super::classify::{classify, Category};
use super::descriptor::{filter_key, FieldDescriptor, FilterFn};
use super::registry::{FilterSlot, FilterTable, HandlerKey, StepKind};
use super::value::Value;
use crate::error::{ExtractError, Result};

/// Key of the final closure applied to every value.
pub const GENERIC_FILTER_KEY: &str = "filter";

/// One attempt in the cascade.
enum Step {
    Table(FilterSlot),
    Closure(String),
}

impl Step {
    fn cascade(handler: &HandlerKey, category: Category) -> [Step; 4] {
        [
            Step::Table(FilterSlot::scoped(handler, category, StepKind::Convert)),
            Step::Closure(filter_key(category, StepKind::Convert)),
            Step::Table(FilterSlot::scoped(handler, category, StepKind::Filter)),
            Step::Closure(filter_key(category, StepKind::Filter)),
        ]
    }
}

/// Run `step` against `value`. Returns whether it succeeded, with the value it
/// produced on success and the untouched input otherwise.
pub fn best_effort<F>(value: Value, step: F) -> (bool, Value)
where
    F: FnOnce(&Value) -> Option<Value>,
{
    match step(&value) {
        Some(out) if out.is_truthy() => (true, out),
        _ => (false, value),
    }
}

/// Apply a normalizing filter: any output it returns replaces the value.
fn normalize(value: Value, filter: Option<impl FnOnce(&Value) -> Option<Value>>) -> Value {
    match filter {
        Some(filter) => filter(&value).unwrap_or(value),
        None => value,
    }
}

fn call_closure(key: &str, closure: &FilterFn, value: &Value) -> Option<Value> {
    match closure(value) {
        Ok(out) => Some(out),
        Err(err) => {
            debug!("Filter closure `{}` failed: {}", key, err);
            None
        }
    }
}

fn attempt(
    filters: &FilterTable,
    descriptor: &FieldDescriptor,
    step: &Step,
    value: Value,
) -> (bool, Value) {
    match step {
        Step::Table(slot) => match filters.get(slot) {
            Some(filter) => best_effort(value, filter),
            None => (false, value),
        },
        Step::Closure(key) => match descriptor.filters.get(key) {
            Some(closure) => best_effort(value, |v| call_closure(key, closure, v)),
            None => (false, value),
        },
    }
}

/// Normalize a handler result. Returns `value` untouched when the descriptor
/// opts out with `no_filter`.
pub fn apply_chain(
    filters: &FilterTable,
    handler: &HandlerKey,
    descriptor: &FieldDescriptor,
    value: Value,
) -> Result<Value> {
    if descriptor.no_filter {
        return Ok(value);
    }

    let mut value = normalize(value, filters.get(&FilterSlot::hook(handler)));

    if let Some(start) = classify(&value) {
        let (head, rest) = match start.chain().split_first() {
            Some((head, rest)) => (*head, rest),
            None => (start, &[][..]),
        };

        value = normalize(value, filters.get(&FilterSlot::plain(head)));
        value = normalize(
            value,
            filters.get(&FilterSlot::scoped(handler, head, StepKind::Filter)),
        );

        let head_key = filter_key(head, StepKind::Filter);
        if let Some(closure) = descriptor.filters.get(&head_key) {
            value = normalize(value, Some(|v: &Value| call_closure(&head_key, closure, v)));
        }

        for category in rest {
            let mut claimed = false;
            for step in Step::cascade(handler, *category) {
                let (succeeded, out) = attempt(filters, descriptor, &step, value);
                value = out;
                if succeeded {
                    claimed = true;
                    break;
                }
            }

            if claimed {
                value = normalize(value, filters.get(&FilterSlot::plain(*category)));
            }
        }
    }

    if let Some(closure) = descriptor.filters.get(GENERIC_FILTER_KEY) {
        value = closure(&value).map_err(|err| ExtractError::Filter {
            field: descriptor.name.clone(),
            message: err.to_string(),
        })?;
    }

    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::Node;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::{Arc, Mutex};

    fn key() -> HandlerKey {
        HandlerKey::new("parse", "Field")
    }

    fn node_text(value: &Value) -> Option<Value> {
        value.as_node().map(|n| Value::from(n.text()))
    }

    fn trim(value: &Value) -> Option<Value> {
        value.as_text().map(|t| Value::from(t.trim()))
    }

    fn heading() -> Value {
        Value::Node(Node::new("h1", vec![], "  Hello  ", "  Hello  "))
    }

    #[test]
    fn test_no_filter_is_identity() {
        let mut filters = FilterTable::new();
        filters.register(
            FilterSlot::scoped(&key(), Category::Text, StepKind::Convert),
            node_text,
        );
        let descriptor = FieldDescriptor::field("//h1").without_filters();

        let out = apply_chain(&filters, &key(), &descriptor, heading()).unwrap();
        assert_eq!(out, heading());
    }

    #[test]
    fn test_dom_degrades_to_text() {
        let mut filters = FilterTable::new();
        filters.register(
            FilterSlot::scoped(&key(), Category::Text, StepKind::Convert),
            node_text,
        );
        filters.register(FilterSlot::plain(Category::Text), trim);
        let descriptor = FieldDescriptor::field("//h1");

        let out = apply_chain(&filters, &key(), &descriptor, heading()).unwrap();
        assert_eq!(out, Value::from("Hello"));
    }

    #[test]
    fn test_unclassified_value_passes_through() {
        let descriptor = FieldDescriptor::field("//h1")
            .with_filter("text_convert", |_| Ok(Value::from("never")));

        let out = apply_chain(&FilterTable::new(), &key(), &descriptor, Value::Failed).unwrap();
        assert_eq!(out, Value::Failed);
    }

    #[test]
    fn test_closure_convert_claims_level() {
        let descriptor = FieldDescriptor::field("//h1")
            .with_filter("text_convert", |v| {
                Ok(Value::from(format!("[{}]", v.as_node().map_or("", |n| n.text().trim()))))
            })
            .with_filter("text_filter", |_| Ok(Value::from("not reached")));

        let out = apply_chain(&FilterTable::new(), &key(), &descriptor, heading()).unwrap();
        assert_eq!(out, Value::from("[Hello]"));
    }

    fn mark(value: &Value, tag: &str) -> Option<Value> {
        value.as_node().map(|n| {
            Value::Node(Node::new(
                n.name(),
                n.attributes().to_vec(),
                format!("{}|{}", n.text().trim(), tag),
                n.inner_html(),
            ))
        })
    }

    #[test]
    fn test_head_category_normalization_order() {
        fn plain(value: &Value) -> Option<Value> {
            mark(value, "plain")
        }
        fn scoped(value: &Value) -> Option<Value> {
            mark(value, "scoped")
        }

        let mut filters = FilterTable::new();
        filters.register(FilterSlot::plain(Category::Dom), plain);
        filters.register(FilterSlot::scoped(&key(), Category::Dom, StepKind::Filter), scoped);
        filters.register(
            FilterSlot::scoped(&key(), Category::Text, StepKind::Convert),
            node_text,
        );
        let descriptor = FieldDescriptor::field("//h1")
            .with_filter("dom_filter", |v| mark(v, "closure").ok_or_else(|| "not a node".into()));

        let out = apply_chain(&filters, &key(), &descriptor, heading()).unwrap();
        assert_eq!(out, Value::from("Hello|plain|scoped|closure"));
    }

    #[test]
    fn test_failing_closure_is_swallowed() {
        let mut filters = FilterTable::new();
        filters.register(
            FilterSlot::scoped(&key(), Category::Text, StepKind::Filter),
            node_text,
        );
        let descriptor = FieldDescriptor::field("//h1")
            .with_filter("dom_filter", |_| Err("broken".into()))
            .with_filter("text_convert", |_| Err("also broken".into()));

        let out = apply_chain(&filters, &key(), &descriptor, heading()).unwrap();
        assert_eq!(out, Value::from("  Hello  "));
    }

    #[test]
    fn test_falsy_convert_leaves_value_unchanged() {
        let descriptor =
            FieldDescriptor::field("//h1").with_filter("text_convert", |_| Ok(Value::from("")));

        let out = apply_chain(&FilterTable::new(), &key(), &descriptor, heading()).unwrap();
        assert_eq!(out, heading());
    }

    #[test]
    fn test_cascade_order_is_monotonic() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let mut descriptor = FieldDescriptor::field_set(["//a"]);
        for category in ["dom_array", "array", "dom", "text"] {
            let seen = Arc::clone(&seen);
            descriptor = descriptor.with_filter(format!("{}_convert", category), move |v| {
                seen.lock().unwrap().push(category);
                Ok(v.clone())
            });
        }

        let nodes = Value::NodeList(vec![Node::new("a", vec![], "x", "x")]);
        apply_chain(&FilterTable::new(), &key(), &descriptor, nodes).unwrap();

        assert_eq!(*seen.lock().unwrap(), vec!["dom_array", "array", "dom", "text"]);
    }

    #[test]
    fn test_hook_and_generic_filter_run_unconditionally() {
        static HOOKED: AtomicBool = AtomicBool::new(false);
        fn hook(value: &Value) -> Option<Value> {
            HOOKED.store(true, Ordering::SeqCst);
            Some(value.clone())
        }

        let mut filters = FilterTable::new();
        filters.register(FilterSlot::hook(&key()), hook);
        let descriptor =
            FieldDescriptor::field("//h1").with_filter("filter", |_| Ok(Value::from("final")));

        let out = apply_chain(&filters, &key(), &descriptor, Value::Failed).unwrap();
        assert_eq!(out, Value::from("final"));
        assert!(HOOKED.load(Ordering::SeqCst));
    }

    #[test]
    fn test_generic_filter_error_is_reported() {
        let descriptor = FieldDescriptor::field("//h1").with_filter("filter", |_| Err("nope".into()));
        let result = apply_chain(&FilterTable::new(), &key(), &descriptor, heading());
        assert!(matches!(result, Err(ExtractError::Filter { .. })));
    }
}
