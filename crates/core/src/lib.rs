//! tswire-core: TypeScript types and wire codecs from a server-side model graph.
//!
//! The pipeline is a small compiler backend:
//! 1. `classify`: type expression -> [`TypeDescriptor`]
//! 2. `render`: descriptor -> TypeScript type
//! 3. `type_index`: transitive model closure, object types and enums
//! 4. `wire`: `get<Name>FromWire` / `convert<Name>ToWire` per model
//! 5. `routes`: one typed `fetch` wrapper per route
//!
//! Everything is emitted through the TypeScript AST in [`typescript`].
//!
//! ```
//! use tswire_core::model::{ModelDef, ModelGraph, ModelPath, TypeExpr};
//!
//! let graph = ModelGraph::new().with_model(
//!     "app.Org",
//!     ModelDef::new()
//!         .field("org_id", TypeExpr::str())
//!         .field("created_at", TypeExpr::datetime()),
//! );
//! let code = tswire_core::generate(&graph, &[ModelPath::new("app.Org")], &[]).unwrap();
//! assert!(code.contains("created_at: new Date(root.created_at * 1000)"));
//! ```

pub mod classify;
pub mod emitter;
pub mod error;
pub mod model;
pub mod render;
pub mod routes;
pub mod type_index;
pub mod typescript;
pub mod wire;

pub use classify::{TypeDescriptor, classify};
pub use emitter::{Output, build_module, generate, generate_document};
pub use error::{CodegenError, Result};
pub use model::{ModelGraph, ModelPath, RouteDef, SchemaDocument};
pub use type_index::TypeIndex;
