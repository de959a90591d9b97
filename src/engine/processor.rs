//! Field processor
//!
//! Walks a field map, dispatches each descriptor to its registered handler,
//! runs the result through the filter chain and records it. Nested pages
//! push their document onto the context store for the duration of their own
//! field map.

use std::fmt;
use std::rc::Rc;

use indexmap::IndexMap;
use tracing::{debug, warn};
use url::Url;

use super::chain::apply_chain;
use super::descriptor::{FieldDescriptor, FieldMap, DEFAULT_ACTION};
use super::registry::{FilterSlot, FilterStep, FilterTable, Handler, HandlerRegistry};
use super::value::{map_to_json, Value};
use crate::config::ExtractorConfig;
use crate::context::ContextStore;
use crate::document::{Document, DocumentParser, HtmlParser, Node};
use crate::error::{ExtractError, Result};
use crate::handlers;
use crate::transport::{Page, Transport, UreqTransport};

/// Context entry holding the document handlers query.
pub const DOCUMENT_KEY: &str = "dom";
/// Context entry holding the URL relative links resolve against.
pub const BASE_URL_KEY: &str = "base_url";
/// Context entry holding the prefix for collected attribute values.
pub const DOMAIN_PREFIX_KEY: &str = "domain_prefix";

#[derive(Clone)]
pub enum ContextValue {
    Document(Rc<dyn Document>),
    Text(String),
}

impl fmt::Debug for ContextValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ContextValue::Document(_) => f.write_str("Document(..)"),
            ContextValue::Text(text) => f.debug_tuple("Text").field(text).finish(),
        }
    }
}

pub struct FieldProcessor {
    start_url: String,
    handlers: HandlerRegistry,
    filters: FilterTable,
    context: ContextStore<ContextValue>,
    transport: Box<dyn Transport>,
    parser: Box<dyn DocumentParser>,
    /// Results as nested as the field map that produced them.
    fields: IndexMap<String, Value>,
    /// Every processed field by name, nested ones included.
    field: IndexMap<String, Value>,
    diagnostics: Vec<String>,
}

impl FieldProcessor {
    pub fn new(start_url: impl Into<String>) -> Self {
        Self::from_config(start_url, &ExtractorConfig::default())
    }

    pub fn from_config(start_url: impl Into<String>, config: &ExtractorConfig) -> Self {
        let start_url = start_url.into();

        let mut handlers = HandlerRegistry::new();
        let mut filters = FilterTable::new();
        handlers::register_builtins(&mut handlers, &mut filters);

        let mut context = ContextStore::new();
        context.set(BASE_URL_KEY, ContextValue::Text(start_url.clone()));
        if let Some(prefix) = &config.domain_prefix {
            context.set(DOMAIN_PREFIX_KEY, ContextValue::Text(prefix.clone()));
        }

        Self {
            start_url,
            handlers,
            filters,
            context,
            transport: Box::new(UreqTransport::from_config(config)),
            parser: Box::new(HtmlParser),
            fields: IndexMap::new(),
            field: IndexMap::new(),
            diagnostics: Vec::new(),
        }
    }

    pub fn with_transport(mut self, transport: impl Transport + 'static) -> Self {
        self.transport = Box::new(transport);
        self
    }

    pub fn with_parser(mut self, parser: impl DocumentParser + 'static) -> Self {
        self.parser = Box::new(parser);
        self
    }

    /// Use `document` as the current document for top-level fields.
    pub fn with_document(mut self, document: Rc<dyn Document>) -> Self {
        self.push_document(document);
        self
    }

    pub fn with_html(self, html: &str) -> Self {
        let document = self.parser.parse(html);
        self.with_document(document)
    }

    pub fn register_handler(&mut self, action: &str, kind: &str, handler: Handler) {
        self.handlers.register(action, kind, handler);
    }

    pub fn register_filter(&mut self, slot: FilterSlot, step: FilterStep) {
        self.filters.register(slot, step);
    }

    pub fn start_url(&self) -> &str {
        &self.start_url
    }

    pub fn context(&self) -> &ContextStore<ContextValue> {
        &self.context
    }

    pub fn context_mut(&mut self) -> &mut ContextStore<ContextValue> {
        &mut self.context
    }

    pub fn context_text(&self, name: &str) -> Option<&str> {
        match self.context.get(name)? {
            ContextValue::Text(text) => Some(text.as_str()),
            ContextValue::Document(_) => None,
        }
    }

    pub fn document(&self) -> Option<Rc<dyn Document>> {
        match self.context.get(DOCUMENT_KEY)? {
            ContextValue::Document(document) => Some(Rc::clone(document)),
            ContextValue::Text(_) => None,
        }
    }

    pub fn push_document(&mut self, document: Rc<dyn Document>) {
        self.context
            .set(DOCUMENT_KEY, ContextValue::Document(document));
    }

    pub fn pop_document(&mut self) {
        self.context.unset(DOCUMENT_KEY);
    }

    /// Run `f` with `document` as the current document and `url` as the base
    /// URL, restoring the previous ones afterwards.
    pub fn with_page<T>(
        &mut self,
        document: Rc<dyn Document>,
        url: &str,
        f: impl FnOnce(&mut Self) -> T,
    ) -> T {
        self.push_document(document);
        self.context
            .set(BASE_URL_KEY, ContextValue::Text(url.to_string()));

        let out = f(self);

        self.context.unset(BASE_URL_KEY);
        self.pop_document();
        out
    }

    /// Report a diagnostic. Extraction carries on regardless.
    pub fn log(&mut self, message: impl Into<String>) {
        let message = message.into();
        warn!("{}", message);
        self.diagnostics.push(message);
    }

    pub fn diagnostics(&self) -> &[String] {
        &self.diagnostics
    }

    /// First node matching `expr` in the current document.
    pub fn find(&mut self, expr: &str) -> Option<Node> {
        let document = self.current_document(expr)?;
        match document.query_first(expr) {
            Ok(node) => node,
            Err(err) => {
                self.log(err.to_string());
                None
            }
        }
    }

    /// All nodes matching `expr` in the current document.
    pub fn find_all(&mut self, expr: &str) -> Vec<Node> {
        let Some(document) = self.current_document(expr) else {
            return Vec::new();
        };
        match document.query(expr) {
            Ok(nodes) => nodes,
            Err(err) => {
                self.log(err.to_string());
                Vec::new()
            }
        }
    }

    fn current_document(&mut self, expr: &str) -> Option<Rc<dyn Document>> {
        let document = self.document();
        if document.is_none() {
            self.log(format!("No document loaded to evaluate `{}`", expr));
        }
        document
    }

    /// Resolve `url` against the current base URL.
    pub fn resolve_url(&self, url: &str) -> Result<String> {
        if url.trim().is_empty() {
            return Err(ExtractError::EmptyUrl);
        }
        match Url::parse(url) {
            Ok(absolute) => Ok(absolute.to_string()),
            Err(url::ParseError::RelativeUrlWithoutBase) => {
                let base = self.context_text(BASE_URL_KEY).unwrap_or(&self.start_url);
                Ok(Url::parse(base)?.join(url)?.to_string())
            }
            Err(err) => Err(err.into()),
        }
    }

    pub fn fetch(&self, url: &str) -> Result<Page> {
        debug!("Fetching {}", url);
        self.transport.fetch(url)
    }

    pub fn parse_markup(&self, markup: &str) -> Rc<dyn Document> {
        self.parser.parse(markup)
    }

    /// Process every descriptor of `map` in order. Fields without a matching
    /// handler are left out of the result.
    pub fn process_fields(&mut self, map: &FieldMap) -> &IndexMap<String, Value> {
        for (name, descriptor) in map {
            if let Some(value) = self.process_field(name, descriptor, DEFAULT_ACTION) {
                self.fields.insert(name.clone(), value);
            }
        }
        &self.fields
    }

    pub fn process_field(
        &mut self,
        name: &str,
        descriptor: &FieldDescriptor,
        default_action: &str,
    ) -> Option<Value> {
        let (key, handler) = self
            .handlers
            .resolve(descriptor.type_name(), descriptor.action_or(default_action))?;

        debug!("Processing field \"{}\" with {}", name, key);
        let raw = handler(self, name, descriptor);

        let value = match apply_chain(&self.filters, &key, descriptor, raw) {
            Ok(value) => value,
            Err(err) => {
                self.log(err.to_string());
                Value::Failed
            }
        };

        self.field.insert(name.to_string(), value.clone());
        Some(value)
    }

    /// Fetch the start URL and run `map` against it.
    pub fn process_start_page(&mut self, map: &FieldMap) -> &IndexMap<String, Value> {
        let descriptor = FieldDescriptor::page(map.clone()).with_url(self.start_url.clone());

        if let Value::Map(results) = handlers::parse_page(self, "start page", &descriptor) {
            self.fields.extend(results);
        }
        &self.fields
    }

    /// Results keyed as in the field map, nested pages as nested maps.
    pub fn fields(&self) -> &IndexMap<String, Value> {
        &self.fields
    }

    /// Every processed field by name.
    pub fn flat_fields(&self) -> &IndexMap<String, Value> {
        &self.field
    }

    pub fn field(&self, name: &str) -> Option<&Value> {
        self.field.get(name)
    }

    pub fn to_json(&self, hierarchical: bool) -> serde_json::Value {
        let map = if hierarchical { &self.fields } else { &self.field };
        serde_json::Value::Object(map_to_json(map))
    }
}

impl fmt::Debug for FieldProcessor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldProcessor")
            .field("start_url", &self.start_url)
            .field("handlers", &self.handlers)
            .field("context", &self.context)
            .field("fields", &self.fields)
            .finish_non_exhaustive()
    }
}
