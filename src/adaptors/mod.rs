//! Dialect adaptors: schema import and SQL generation per database flavour.

pub(crate) mod catalog;
pub mod mysql_adaptor;
pub mod pgsql_adaptor;
pub mod sqlite_adaptor;
pub mod sqlite_parser;
#[cfg(test)]
pub(crate) mod testing;
mod trait_def;

pub use mysql_adaptor::MySqlAdaptor;
pub use pgsql_adaptor::PgSqlAdaptor;
pub use sqlite_adaptor::SqliteAdaptor;
pub use sqlite_parser::SqliteParser;
pub use trait_def::{Adaptor, quote_literal, render_default};
