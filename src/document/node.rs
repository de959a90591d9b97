//! Owned element snapshots
//!
//! Values flowing through the filter chain outlive the parsed document they
//! came from, so query results are copied out of the tree.

use scraper::{ElementRef, Html};

/// Snapshot of a single element: tag name, attributes, text content and inner markup.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    name: String,
    attributes: Vec<(String, String)>,
    text: String,
    inner_html: String,
}

impl Node {
    pub fn new(
        name: impl Into<String>,
        attributes: Vec<(String, String)>,
        text: impl Into<String>,
        inner_html: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            attributes,
            text: text.into(),
            inner_html: inner_html.into(),
        }
    }

    pub fn from_element(element: ElementRef<'_>) -> Self {
        let value = element.value();
        Self {
            name: value.name().to_string(),
            attributes: value
                .attrs()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
            text: element.text().collect(),
            inner_html: element.inner_html(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    pub fn attributes(&self) -> &[(String, String)] {
        &self.attributes
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn inner_html(&self) -> &str {
        &self.inner_html
    }

    /// Re-render the text content with every text run of the inner markup on
    /// its own line, so block boundaries survive flattening to text. Runs are
    /// trimmed and whitespace-only runs dropped.
    pub fn with_line_breaks(&self) -> Node {
        let fragment = Html::parse_fragment(&self.inner_html);
        let text = fragment
            .root_element()
            .text()
            .map(str::trim)
            .filter(|run| !run.is_empty())
            .collect::<Vec<_>>()
            .join("\n");

        Node {
            text,
            ..self.clone()
        }
    }
}
