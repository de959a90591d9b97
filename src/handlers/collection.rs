//! Attribute collections

use crate::engine::{FieldDescriptor, FieldProcessor, Value, DOMAIN_PREFIX_KEY};

use super::field::single_xpath;

/// `parseFieldCollection`: the `attr` attribute of every matched node, in
/// document order, prefixed with the configured domain prefix. Nodes without
/// the attribute are skipped.
pub fn parse_field_collection(
    proc: &mut FieldProcessor,
    name: &str,
    descriptor: &FieldDescriptor,
) -> Value {
    let Some(attr) = descriptor.attr.as_deref() else {
        proc.log(format!("Field collection \"{}\" has no attr", name));
        return Value::List(Vec::new());
    };
    let Some(xpath) = single_xpath(proc, name, descriptor) else {
        return Value::List(Vec::new());
    };

    let prefix = proc
        .context_text(DOMAIN_PREFIX_KEY)
        .unwrap_or_default()
        .to_string();

    let collection = proc
        .find_all(xpath)
        .iter()
        .filter_map(|node| node.attr(attr))
        .filter(|value| !value.is_empty())
        .map(|value| Value::Text(format!("{}{}", prefix, value)))
        .collect();

    Value::List(collection)
}
