//! Dispatch-and-filter engine
//!
//! A field map is processed descriptor by descriptor: the `(action, type)`
//! pair picks a handler, the handler produces a raw value, and the filter
//! chain degrades that value toward plain text.

mod chain;
mod classify;
mod descriptor;
mod processor;
mod registry;
mod value;

pub use chain::*;
pub use classify::*;
pub use descriptor::*;
pub use processor::*;
pub use registry::*;
pub use value::*;
