//! Plain per-category filters and the converters shared between handlers

use once_cell::sync::Lazy;
use regex::Regex;

use crate::engine::Value;

static LINE_BREAKS: Lazy<Regex> = Lazy::new(|| Regex::new(r"\n+\s*\n*").expect("valid regex"));

/// Collapse runs of line breaks (and the whitespace between them) and trim.
pub fn normalize_text(text: &str) -> String {
    LINE_BREAKS.replace_all(text, "\n").trim().to_string()
}

/// `dom` filter: one line per text run of the node's inner markup.
pub fn dom_filter(value: &Value) -> Option<Value> {
    value.as_node().map(|node| Value::Node(node.with_line_breaks()))
}

/// `dom_array` filter: the `dom` filter applied to every node.
pub fn dom_array_filter(value: &Value) -> Option<Value> {
    let items = value.as_list()?;
    items
        .iter()
        .map(|item| item.as_node().map(|node| Value::Node(node.with_line_breaks())))
        .collect::<Option<Vec<_>>>()
        .map(Value::List)
}

/// `array` filter: normalizes every text item, leaves other items alone.
pub fn array_filter(value: &Value) -> Option<Value> {
    let items = value.as_list()?;
    Some(Value::List(
        items
            .iter()
            .map(|item| match item {
                Value::Text(text) => Value::Text(normalize_text(text)),
                other => other.clone(),
            })
            .collect(),
    ))
}

/// `text` filter.
pub fn text_filter(value: &Value) -> Option<Value> {
    value.as_text().map(|text| Value::Text(normalize_text(text)))
}

/// Node -> its text content.
pub fn node_text_convert(value: &Value) -> Option<Value> {
    value.as_node().map(|node| Value::from(node.text()))
}

/// Node list -> sequence of nodes.
pub fn node_list_convert(value: &Value) -> Option<Value> {
    match value {
        Value::NodeList(nodes) => Some(Value::List(
            nodes.iter().cloned().map(Value::Node).collect(),
        )),
        _ => None,
    }
}

/// Sequence of nodes -> sequence of their texts.
pub fn texts_convert(value: &Value) -> Option<Value> {
    let items = value.as_list()?;
    items
        .iter()
        .map(|item| item.as_node().map(|node| Value::from(node.text())))
        .collect::<Option<Vec<_>>>()
        .map(Value::List)
}

/// Sequence of texts (or nodes) -> one text, one item per line.
pub fn joined_text_convert(value: &Value) -> Option<Value> {
    let items = value.as_list()?;
    items
        .iter()
        .map(|item| match item {
            Value::Text(text) => Some(text.as_str()),
            Value::Node(node) => Some(node.text()),
            _ => None,
        })
        .collect::<Option<Vec<_>>>()
        .map(|parts| Value::Text(parts.join("\n")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::Node;

    fn node(inner: &str) -> Node {
        Node::new("div", vec![], inner, inner)
    }

    #[test]
    fn test_normalize_text() {
        assert_eq!(normalize_text("  A\n\n   \n  B \n"), "A\nB");
        assert_eq!(normalize_text("A\r\n\r\nB"), "A\r\nB");
        assert_eq!(normalize_text("single"), "single");
    }

    #[test]
    fn test_texts_convert_requires_nodes() {
        let nodes = Value::List(vec![Value::Node(node("a")), Value::Node(node("b"))]);
        assert_eq!(
            texts_convert(&nodes),
            Some(Value::List(vec![Value::from("a"), Value::from("b")]))
        );

        let mixed = Value::List(vec![Value::Node(node("a")), Value::from("b")]);
        assert_eq!(texts_convert(&mixed), None);
    }

    #[test]
    fn test_joined_text_convert() {
        let texts = Value::List(vec![Value::from("Color"), Value::from("Red")]);
        assert_eq!(joined_text_convert(&texts), Some(Value::from("Color\nRed")));
        assert_eq!(joined_text_convert(&Value::from("x")), None);
    }

    #[test]
    fn test_dom_array_filter() {
        let nodes = Value::List(vec![Value::Node(node("<b>A</b><i>B</i>"))]);
        let filtered = dom_array_filter(&nodes).unwrap();
        assert_eq!(filtered.as_list().unwrap()[0].as_node().unwrap().text(), "A\nB");
        assert_eq!(dom_array_filter(&Value::from("x")), None);
    }
}
