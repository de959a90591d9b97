//! Built-in field handlers
//!
//! Each module provides one handler and the converters scoped to it.

mod collection;
mod field;
mod field_set;
mod filters;
mod page;

pub use collection::*;
pub use field::*;
pub use field_set::*;
pub use filters::*;
pub use page::*;

use crate::engine::{Category, FilterSlot, FilterTable, HandlerKey, HandlerRegistry, StepKind};
use crate::engine::DEFAULT_ACTION;

/// Register the built-in handlers and filters.
pub fn register_builtins(handlers: &mut HandlerRegistry, filters: &mut FilterTable) {
    handlers.register(DEFAULT_ACTION, "Field", parse_field);
    handlers.register(DEFAULT_ACTION, "FieldList", parse_field_list);
    handlers.register(DEFAULT_ACTION, "FieldSet", parse_field_set);
    handlers.register(DEFAULT_ACTION, "FieldCollection", parse_field_collection);
    handlers.register(DEFAULT_ACTION, "Page", parse_page);

    filters.register(FilterSlot::plain(Category::DomArray), dom_array_filter);
    filters.register(FilterSlot::plain(Category::Array), array_filter);
    filters.register(FilterSlot::plain(Category::Dom), dom_filter);
    filters.register(FilterSlot::plain(Category::Text), text_filter);

    let field = HandlerKey::new(DEFAULT_ACTION, "Field");
    filters.register(
        FilterSlot::scoped(&field, Category::Text, StepKind::Convert),
        node_text_convert,
    );

    let list = HandlerKey::new(DEFAULT_ACTION, "FieldList");
    filters.register(
        FilterSlot::scoped(&list, Category::DomArray, StepKind::Convert),
        node_list_convert,
    );
    filters.register(
        FilterSlot::scoped(&list, Category::Array, StepKind::Convert),
        texts_convert,
    );

    let set = HandlerKey::new(DEFAULT_ACTION, "FieldSet");
    filters.register(
        FilterSlot::scoped(&set, Category::Array, StepKind::Convert),
        texts_convert,
    );
    filters.register(
        FilterSlot::scoped(&set, Category::Text, StepKind::Convert),
        joined_text_convert,
    );
}
