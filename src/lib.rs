//! Relational schema model with per-dialect SQL generation and schema import.
//!
//! A [`Database`] of [`Table`]s is built by hand, loaded from a definition file,
//! or imported from a live source through an [`Adaptor`]. The same model then
//! renders to SQLite, MySQL or PostgreSQL statements.

pub mod adaptors;
pub mod config;
pub mod connection;
pub mod database;
pub mod definition;
pub mod error;
pub mod factory;
pub mod generator;
mod logging;
pub mod naming;
pub mod resolver;
pub mod schema;


pub use adaptors::{Adaptor, MySqlAdaptor, PgSqlAdaptor, SqliteAdaptor, SqliteParser};
pub use config::AdaptorConfig;
pub use definition::{definition_to_string, load_definition, save_definition};
pub use error::{Error, Result};
pub use factory::{AdaptorFactory, Dialect};
pub use generator::{SchemaGenerator, TableScripts};
pub use logging::init_logging;
pub use naming::{DefaultNaming, Name, Naming};
pub use resolver::{get_ordered_table_list, process_foreign_keys};
pub use schema::{
    CustomQuery, Database, Field, FieldType, Key, KeyType, Parameter, QueryType, Table,
    TransformType,
};
