//! Model schema IR and its document format.
//!
//! The graph is an explicit, statically constructed IR: build it in Rust with
//! the builder methods on [`ModelGraph`] and [`ModelDef`], or deserialize a
//! [`SchemaDocument`] from JSON or YAML.

mod document;
mod types;

pub use document::{SchemaDocument, SchemaFormat};
pub use types::*;
