//! Adaptor selection by connection string or dialect name.

use crate::adaptors::{Adaptor, MySqlAdaptor, PgSqlAdaptor, SqliteAdaptor};
use crate::connection::split_scheme;
use crate::database::DatabaseType;
use crate::error::{Error, Result};
use crate::naming::Naming;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

/// Supported SQL dialects
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Dialect {
    Sqlite,
    MySql,
    PgSql,
}

impl Dialect {
    pub const ALL: [Dialect; 3] = [Dialect::Sqlite, Dialect::MySql, Dialect::PgSql];

    /// Connection-string scheme and dialect name
    pub const fn scheme(&self) -> &'static str {
        match self {
            Dialect::Sqlite => "sqlite",
            Dialect::MySql => "mysql",
            Dialect::PgSql => "pgsql",
        }
    }

    /// Case-insensitive lookup; `postgres` and `postgresql` are accepted for `pgsql`.
    pub fn from_scheme(scheme: &str) -> Option<Dialect> {
        match scheme.to_lowercase().as_str() {
            "sqlite" => Some(Dialect::Sqlite),
            "mysql" => Some(Dialect::MySql),
            "pgsql" | "postgres" | "postgresql" => Some(Dialect::PgSql),
            _ => None,
        }
    }

    /// Live-database backend that serves this dialect
    pub const fn database_type(&self) -> DatabaseType {
        match self {
            Dialect::Sqlite => DatabaseType::Sqlite,
            Dialect::MySql => DatabaseType::MySql,
            Dialect::PgSql => DatabaseType::Postgres,
        }
    }

    /// Connection string that satisfies the dialect's validation without naming a real source
    pub const fn blank_connection(&self) -> &'static str {
        match self {
            Dialect::Sqlite => SqliteAdaptor::BLANK_CONNECTION,
            Dialect::MySql => MySqlAdaptor::BLANK_CONNECTION,
            Dialect::PgSql => PgSqlAdaptor::BLANK_CONNECTION,
        }
    }

    fn constructor(&self) -> Constructor {
        match self {
            Dialect::Sqlite => new_sqlite,
            Dialect::MySql => new_mysql,
            Dialect::PgSql => new_pgsql,
        }
    }
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.scheme())
    }
}

impl FromStr for Dialect {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Dialect::from_scheme(s).ok_or_else(|| Error::UnsupportedDialect(s.to_string()))
    }
}

type Constructor = fn(&str, Arc<dyn Naming>) -> Result<Box<dyn Adaptor>>;

fn new_sqlite(connection_string: &str, naming: Arc<dyn Naming>) -> Result<Box<dyn Adaptor>> {
    Ok(Box::new(SqliteAdaptor::new(connection_string, naming)?))
}

fn new_mysql(connection_string: &str, naming: Arc<dyn Naming>) -> Result<Box<dyn Adaptor>> {
    Ok(Box::new(MySqlAdaptor::new(connection_string, naming)?))
}

fn new_pgsql(connection_string: &str, naming: Arc<dyn Naming>) -> Result<Box<dyn Adaptor>> {
    Ok(Box::new(PgSqlAdaptor::new(connection_string, naming)?))
}

/// Builds adaptors for the supported dialects
pub struct AdaptorFactory;

impl AdaptorFactory {
    /// Select the adaptor by the scheme of `<scheme>://<rest>` and let it validate the rest
    pub fn from_connection_string(
        connection_string: &str,
        naming: Arc<dyn Naming>,
    ) -> Result<Box<dyn Adaptor>> {
        let (scheme, _) = split_scheme(connection_string)?;
        let dialect: Dialect = scheme.parse()?;
        (dialect.constructor())(connection_string, naming)
    }

    /// Select the adaptor by dialect name. The adaptor has no data source, so it is
    /// only useful for generation.
    pub fn from_dialect(name: &str, naming: Arc<dyn Naming>) -> Result<Box<dyn Adaptor>> {
        let dialect: Dialect = name.parse()?;
        (dialect.constructor())(dialect.blank_connection(), naming)
    }
}
