//! Single-node and node-list lookups

use crate::engine::{FieldDescriptor, FieldProcessor, Locator, Value};

/// `parseField`: first node matching the descriptor's `xpath`.
pub fn parse_field(proc: &mut FieldProcessor, name: &str, descriptor: &FieldDescriptor) -> Value {
    let Some(xpath) = single_xpath(proc, name, descriptor) else {
        return Value::Failed;
    };

    match proc.find(xpath) {
        Some(node) => Value::Node(node),
        None => {
            proc.log(format!("Field \"{}\" not found!", name));
            Value::Failed
        }
    }
}

/// `parseFieldList`: every node matching the descriptor's `xpath`.
pub fn parse_field_list(
    proc: &mut FieldProcessor,
    name: &str,
    descriptor: &FieldDescriptor,
) -> Value {
    match single_xpath(proc, name, descriptor) {
        Some(xpath) => Value::NodeList(proc.find_all(xpath)),
        None => Value::Failed,
    }
}

pub(crate) fn single_xpath<'d>(
    proc: &mut FieldProcessor,
    name: &str,
    descriptor: &'d FieldDescriptor,
) -> Option<&'d str> {
    match &descriptor.xpath {
        Some(Locator::Single(xpath)) => Some(xpath),
        Some(Locator::Many(_)) => {
            proc.log(format!("Field \"{}\" expects a single xpath", name));
            None
        }
        None => {
            proc.log(format!("Field \"{}\" has no xpath", name));
            None
        }
    }
}
