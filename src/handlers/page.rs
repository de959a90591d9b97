//! Sub-page extraction

use indexmap::IndexMap;
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

use crate::engine::{FieldDescriptor, FieldMap, FieldProcessor, Value, DEFAULT_ACTION};

use super::field::parse_field;

static LINE_BREAK_TAGS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)<br\s*/?>").expect("valid regex"));

/// Replace `<br>` markup with line breaks so they survive text extraction.
pub fn normalize_line_breaks(markup: &str) -> String {
    LINE_BREAK_TAGS.replace_all(markup, "\r\n").into_owned()
}

/// `parsePage`: fetch the page named by `url` (or found through `xpath`) and
/// run the nested `fields` against it. The page's document is only current
/// while its own fields are processed.
pub fn parse_page(proc: &mut FieldProcessor, name: &str, descriptor: &FieldDescriptor) -> Value {
    let Some(url) = page_url(proc, name, descriptor) else {
        return Value::Failed;
    };

    let url = match proc.resolve_url(&url) {
        Ok(url) => url,
        Err(err) => {
            proc.log(format!("Page \"{}\" has an invalid url `{}`: {}", name, url, err));
            return Value::Failed;
        }
    };

    let page = match proc.fetch(&url) {
        Ok(page) => page,
        Err(err) => {
            proc.log(err.to_string());
            return Value::Failed;
        }
    };

    if !page.is_success() {
        proc.log(format!("Page \"{}\" returned HTTP {} for {}", name, page.status, url));
        return Value::Failed;
    }

    let document = proc.parse_markup(&normalize_line_breaks(&page.body));
    let empty = FieldMap::new();
    let fields = descriptor.fields.as_ref().unwrap_or(&empty);

    debug!("Processing {} fields of page \"{}\"", fields.len(), name);
    let results = proc.with_page(document, &url, |proc| {
        let mut results = IndexMap::new();
        for (field_name, field) in fields {
            if let Some(value) = proc.process_field(field_name, field, DEFAULT_ACTION) {
                results.insert(field_name.clone(), value);
            }
        }
        results
    });

    Value::Map(results)
}

fn page_url(proc: &mut FieldProcessor, name: &str, descriptor: &FieldDescriptor) -> Option<String> {
    if let Some(url) = descriptor.url.as_deref().filter(|url| !url.is_empty()) {
        return Some(url.to_string());
    }

    match parse_field(proc, name, descriptor) {
        Value::Node(node) => {
            let attr = descriptor.attr.as_deref().unwrap_or("href");
            let url = node
                .attr(attr)
                .map(str::trim)
                .filter(|url| !url.is_empty())
                .unwrap_or_else(|| node.text().trim());
            if url.is_empty() {
                proc.log(format!("Page \"{}\" has no url", name));
                return None;
            }
            Some(url.to_string())
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::{Document, DocumentParser, HtmlDocument, HtmlParser};
    use crate::engine::{field_map, DOCUMENT_KEY};
    use crate::error::Result;
    use crate::transport::{Page, Transport};
    use std::cell::{Cell, RefCell};
    use std::collections::HashMap;
    use std::rc::Rc;

    const LISTING: &str = r#"
        <html><body>
            <h1>Catalog</h1>
            <a class="next" href="/items/2">Next</a>
        </body></html>
    "#;

    #[derive(Default)]
    struct MockTransport {
        pages: HashMap<String, Page>,
        requests: RefCell<Vec<String>>,
    }

    impl MockTransport {
        fn with_page(mut self, url: &str, status: u16, body: &str) -> Self {
            self.pages.insert(
                url.to_string(),
                Page {
                    status,
                    body: body.to_string(),
                },
            );
            self
        }
    }

    impl Transport for Rc<MockTransport> {
        fn fetch(&self, url: &str) -> Result<Page> {
            self.requests.borrow_mut().push(url.to_string());
            Ok(self.pages.get(url).cloned().unwrap_or(Page {
                status: 404,
                body: String::new(),
            }))
        }
    }

    #[derive(Clone, Default)]
    struct CountingParser {
        parsed: Rc<Cell<usize>>,
    }

    impl DocumentParser for CountingParser {
        fn parse(&self, markup: &str) -> Rc<dyn Document> {
            self.parsed.set(self.parsed.get() + 1);
            HtmlParser.parse(markup)
        }
    }

    fn processor(transport: &Rc<MockTransport>) -> FieldProcessor {
        FieldProcessor::new("https://shop.example/items/1")
            .with_transport(Rc::clone(transport))
            .with_document(Rc::new(HtmlDocument::parse(LISTING)))
    }

    #[test]
    fn test_normalize_line_breaks() {
        assert_eq!(normalize_line_breaks("a<br>b<BR />c<br/>d"), "a\r\nb\r\nc\r\nd");
    }

    #[test]
    fn test_page_runs_nested_fields_against_sub_document() {
        let transport = Rc::new(MockTransport::default().with_page(
            "https://shop.example/items/2",
            200,
            "<html><body><h1>Lamp</h1><p class='desc'>Bright<br>and warm</p></body></html>",
        ));
        let mut proc = processor(&transport);

        let detail = field_map([
            ("name", FieldDescriptor::field("//h1")),
            ("description", FieldDescriptor::field("//p[@class='desc']")),
        ]);
        let map = field_map([
            ("heading", FieldDescriptor::field("//h1")),
            ("next", FieldDescriptor::page(detail).with_xpath("//a[@class='next']")),
            ("after", FieldDescriptor::field("//h1")),
        ]);

        proc.process_fields(&map);

        let next = proc.fields()["next"].as_map().unwrap();
        assert_eq!(next["name"], Value::from("Lamp"));
        assert_eq!(next["description"], Value::from("Bright\nand warm"));

        assert_eq!(proc.field("heading"), Some(&Value::from("Catalog")));
        assert_eq!(proc.field("after"), Some(&Value::from("Catalog")));
        assert_eq!(proc.field("name"), Some(&Value::from("Lamp")));
        assert_eq!(
            *transport.requests.borrow(),
            vec!["https://shop.example/items/2"]
        );
        assert_eq!(proc.context().depth(DOCUMENT_KEY), 1);
    }

    #[test]
    fn test_page_not_found_skips_nested_fields() {
        let transport = Rc::new(MockTransport::default());
        let parser = CountingParser::default();
        let mut proc = processor(&transport).with_parser(parser.clone());

        let detail = field_map([("name", FieldDescriptor::field("//h1"))]);
        let map = field_map([(
            "detail",
            FieldDescriptor::page(detail).with_url("https://shop.example/missing"),
        )]);

        proc.process_fields(&map);

        assert_eq!(proc.field("detail"), Some(&Value::Failed));
        assert!(proc.field("name").is_none());
        assert_eq!(parser.parsed.get(), 0);
        assert_eq!(proc.context().depth(DOCUMENT_KEY), 1);
    }

    #[test]
    fn test_nested_pages_restore_context() {
        let transport = Rc::new(
            MockTransport::default()
                .with_page(
                    "https://shop.example/a",
                    200,
                    "<h1>A</h1><a id='deeper' href='b'>deeper</a>",
                )
                .with_page("https://shop.example/b", 200, "<h1>B</h1>"),
        );
        let mut proc = processor(&transport);

        let inner = field_map([("b_title", FieldDescriptor::field("//h1"))]);
        let outer = field_map([
            ("deeper", FieldDescriptor::page(inner).with_xpath("//a[@id='deeper']")),
            ("a_title", FieldDescriptor::field("//h1")),
        ]);
        let map = field_map([
            ("a", FieldDescriptor::page(outer).with_url("/a")),
            ("title", FieldDescriptor::field("//h1")),
        ]);

        proc.process_fields(&map);

        assert_eq!(proc.field("b_title"), Some(&Value::from("B")));
        assert_eq!(proc.field("a_title"), Some(&Value::from("A")));
        assert_eq!(proc.field("title"), Some(&Value::from("Catalog")));
        assert_eq!(
            *transport.requests.borrow(),
            vec!["https://shop.example/a", "https://shop.example/b"]
        );
        assert_eq!(proc.context().depth(DOCUMENT_KEY), 1);
        assert_eq!(
            proc.to_json(true)["a"]["deeper"]["b_title"],
            serde_json::json!("B")
        );
    }

    #[test]
    fn test_page_url_not_found() {
        let transport = Rc::new(MockTransport::default());
        let mut proc = processor(&transport);

        let value = parse_page(
            &mut proc,
            "detail",
            &FieldDescriptor::page(FieldMap::new()).with_xpath("//a[@class='prev']"),
        );

        assert_eq!(value, Value::Failed);
        assert!(transport.requests.borrow().is_empty());
        assert_eq!(proc.diagnostics(), ["Field \"detail\" not found!"]);
    }

    #[test]
    fn test_empty_link_is_not_fetched() {
        let transport = Rc::new(MockTransport::default().with_page(
            "https://shop.example/items/1",
            200,
            "<h1>Self</h1>",
        ));
        let mut proc = FieldProcessor::new("https://shop.example/items/1")
            .with_transport(Rc::clone(&transport))
            .with_document(Rc::new(HtmlDocument::parse("<a class='next'>  </a>")));

        let detail = field_map([("name", FieldDescriptor::field("//h1"))]);
        let map = field_map([(
            "next",
            FieldDescriptor::page(detail).with_xpath("//a[@class='next']"),
        )]);

        proc.process_fields(&map);

        assert_eq!(proc.field("next"), Some(&Value::Failed));
        assert!(proc.field("name").is_none());
        assert!(transport.requests.borrow().is_empty());
        assert_eq!(proc.diagnostics(), ["Page \"next\" has no url"]);
    }

    #[test]
    fn test_start_page() {
        let transport = Rc::new(MockTransport::default().with_page(
            "https://shop.example/items/1",
            200,
            "<h1>Item one</h1>",
        ));
        let mut proc = FieldProcessor::new("https://shop.example/items/1")
            .with_transport(Rc::clone(&transport));

        let map = field_map([("title", FieldDescriptor::field("//h1"))]);
        let results = proc.process_start_page(&map);

        assert_eq!(results["title"], Value::from("Item one"));
        assert!(!proc.context().is_set(DOCUMENT_KEY));
    }
}
