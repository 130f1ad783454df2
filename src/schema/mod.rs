//! Dialect-independent schema model.
//!
//! The type system lives in [`types`]; the entity graph (database, table, field,
//! key) in [`definitions`].

pub mod definitions;
pub mod types;

pub use definitions::{CustomQuery, Database, Field, Key, Parameter, Table};
pub use types::{FieldType, KeyType, QueryType, TransformType};
