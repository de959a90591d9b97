//! Document query collaborator
//!
//! Handlers only see documents through the [`Document`] trait. The bundled
//! implementation parses HTML with the scraper crate and accepts either CSS
//! selectors or a small XPath subset as locator expressions.

mod node;
pub mod xpath;

pub use node::Node;

use std::rc::Rc;

use scraper::{Html, Selector};

use crate::error::{ExtractError, Result};

/// A parsed document that can be queried with locator expressions.
pub trait Document {
    /// All nodes matching `expr`, in document order.
    fn query(&self, expr: &str) -> Result<Vec<Node>>;

    /// First node matching `expr`.
    fn query_first(&self, expr: &str) -> Result<Option<Node>> {
        Ok(self.query(expr)?.into_iter().next())
    }
}

/// Turns fetched markup into a queryable document.
pub trait DocumentParser {
    fn parse(&self, markup: &str) -> Rc<dyn Document>;
}

/// HTML document backed by `scraper::Html`.
pub struct HtmlDocument {
    html: Html,
}

impl HtmlDocument {
    /// Parse leniently; parser errors are collected by html5ever and ignored here.
    pub fn parse(markup: &str) -> Self {
        Self {
            html: Html::parse_document(markup),
        }
    }
}

impl Document for HtmlDocument {
    fn query(&self, expr: &str) -> Result<Vec<Node>> {
        let selector = compile_locator(expr)?;
        Ok(self.html.select(&selector).map(Node::from_element).collect())
    }

    fn query_first(&self, expr: &str) -> Result<Option<Node>> {
        let selector = compile_locator(expr)?;
        Ok(self.html.select(&selector).next().map(Node::from_element))
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct HtmlParser;

impl DocumentParser for HtmlParser {
    fn parse(&self, markup: &str) -> Rc<dyn Document> {
        Rc::new(HtmlDocument::parse(markup))
    }
}

/// Compile a locator (XPath subset or CSS) into a scraper selector.
pub fn compile_locator(expr: &str) -> Result<Selector> {
    let css = if xpath::is_xpath(expr) {
        xpath::to_css(expr)?
    } else {
        expr.trim().to_string()
    };

    Selector::parse(&css).map_err(|e| ExtractError::InvalidLocator {
        expr: expr.to_string(),
        reason: format!("{:?}", e),
    })
}
