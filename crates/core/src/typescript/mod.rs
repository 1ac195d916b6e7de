//! TypeScript AST, emission and naming helpers.

pub mod emit;
pub mod types;
pub mod utils;

pub use emit::Emit;
pub use types::*;
