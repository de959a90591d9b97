//! Values produced by handlers and transformed by the filter chain

use indexmap::IndexMap;
use serde_json::{Map, Value as Json};

use crate::document::Node;

#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// The field could not be produced (lookup miss, failed fetch, ...).
    Failed,
    Text(String),
    Node(Node),
    /// Node list as returned by a document query.
    NodeList(Vec<Node>),
    List(Vec<Value>),
    /// Nested results of a sub-page.
    Map(IndexMap<String, Value>),
}

impl Value {
    /// Whether a filter step that produced this value counts as having succeeded.
    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Failed => false,
            Value::Text(text) => !text.is_empty(),
            Value::Node(_) => true,
            Value::NodeList(nodes) => !nodes.is_empty(),
            Value::List(items) => !items.is_empty(),
            Value::Map(map) => !map.is_empty(),
        }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, Value::Failed)
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Text(text) => Some(text),
            _ => None,
        }
    }

    pub fn as_node(&self) -> Option<&Node> {
        match self {
            Value::Node(node) => Some(node),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&IndexMap<String, Value>> {
        match self {
            Value::Map(map) => Some(map),
            _ => None,
        }
    }

    /// Render for the JSON surface. Nodes collapse to their text and the
    /// failure marker becomes `null`.
    pub fn to_json(&self) -> Json {
        match self {
            Value::Failed => Json::Null,
            Value::Text(text) => Json::String(text.clone()),
            Value::Node(node) => Json::String(node.text().to_string()),
            Value::NodeList(nodes) => Json::Array(
                nodes
                    .iter()
                    .map(|n| Json::String(n.text().to_string()))
                    .collect(),
            ),
            Value::List(items) => Json::Array(items.iter().map(Value::to_json).collect()),
            Value::Map(map) => Json::Object(map_to_json(map)),
        }
    }
}

pub(crate) fn map_to_json(map: &IndexMap<String, Value>) -> Map<String, Json> {
    map.iter().map(|(k, v)| (k.clone(), v.to_json())).collect()
}

impl From<&str> for Value {
    fn from(text: &str) -> Self {
        Value::Text(text.to_string())
    }
}

impl From<String> for Value {
    fn from(text: String) -> Self {
        Value::Text(text)
    }
}

impl From<Node> for Value {
    fn from(node: Node) -> Self {
        Value::Node(node)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_truthiness() {
        assert!(!Value::Failed.is_truthy());
        assert!(!Value::from("").is_truthy());
        assert!(Value::from("0").is_truthy());
        assert!(!Value::List(vec![]).is_truthy());
        assert!(!Value::NodeList(vec![]).is_truthy());
        assert!(Value::Node(Node::new("p", vec![], "", "")).is_truthy());
    }

    #[test]
    fn test_to_json() {
        let mut nested = IndexMap::new();
        nested.insert("price".to_string(), Value::from("$5"));
        nested.insert("stock".to_string(), Value::Failed);

        let value = Value::List(vec![
            Value::from("a"),
            Value::Node(Node::new("b", vec![], "bold", "bold")),
            Value::Map(nested),
        ]);

        assert_eq!(
            value.to_json(),
            json!(["a", "bold", {"price": "$5", "stock": null}])
        );
    }
}
