//! Multi-xpath field sets

use tracing::debug;

use crate::engine::{FieldDescriptor, FieldProcessor, Locator, Value};

/// `parseFieldSet`: the first node of each xpath that matches, in order.
/// Queries that miss are dropped, so the result may be shorter than `xpath`.
/// A single xpath is not a field set and fails without a diagnostic.
pub fn parse_field_set(
    proc: &mut FieldProcessor,
    name: &str,
    descriptor: &FieldDescriptor,
) -> Value {
    let Some(Locator::Many(xpaths)) = &descriptor.xpath else {
        debug!("Field set \"{}\" needs a list of xpaths", name);
        return Value::Failed;
    };

    let nodes = xpaths
        .iter()
        .filter_map(|xpath| proc.find(xpath))
        .map(Value::Node)
        .collect();

    Value::List(nodes)
}
