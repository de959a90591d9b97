//! Declarative field extraction from HTML pages
//!
//! A field map names the values to pull out of a page. Each descriptor is
//! dispatched on its `(action, type)` pair to a handler, and the handler's
//! raw result is reduced by a chain of filters toward plain text:
//! - `Field` / `FieldList` / `FieldSet` (node lookups)
//! - `FieldCollection` (attribute per node, optionally domain-prefixed)
//! - `Page` (fetch a sub-page and run nested fields against it)
//!
//! Locators are CSS selectors or a path subset of XPath.

pub mod config;
pub mod context;
pub mod document;
pub mod engine;
pub mod error;
pub mod ffi;
pub mod handlers;
pub mod naming;
pub mod transport;

pub use config::ExtractorConfig;
pub use engine::*;
pub use error::{ExtractError, Result};
pub use ffi::*;
